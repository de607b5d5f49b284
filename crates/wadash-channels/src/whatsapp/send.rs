//! Recipient addressing and message chunking.

/// WhatsApp rejects text messages longer than this.
pub const MAX_MESSAGE_CHARS: usize = 4096;

const USER_SERVER: &str = "s.whatsapp.net";

/// Turn a phone number into a WhatsApp address.
///
/// Surrounding whitespace and a leading `+` are dropped. Values that already
/// carry a server part (`user@server`) are kept as they are.
pub fn recipient_address(phone_number: &str) -> String {
    let trimmed = phone_number.trim();
    if trimmed.contains('@') {
        return trimmed.to_string();
    }
    let user = trimmed.strip_prefix('+').unwrap_or(trimmed);
    format!("{user}@{USER_SERVER}")
}

/// Split `text` into chunks of at most `max_chars` characters, breaking
/// after the last newline inside a chunk when there is one.
pub fn split_message(text: &str, max_chars: usize) -> Vec<&str> {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let end = rest
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let break_at = if end < rest.len() {
            rest[..end].rfind('\n').map(|i| i + 1).unwrap_or(end)
        } else {
            end
        };
        chunks.push(&rest[..break_at]);
        rest = &rest[break_at..];
    }

    chunks
}
