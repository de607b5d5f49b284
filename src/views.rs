//! HTML pages served from the views directory.
//!
//! Pages are read from disk on every request so they can be edited without a
//! restart. A built-in page is served when a file is missing.

use axum::response::Html;
use std::path::Path;
use tracing::debug;

/// Pages the dashboard renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Dashboard,
    NotFound,
}

impl Page {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Login => "index.html",
            Self::Dashboard => "dashboard.html",
            Self::NotFound => "404.html",
        }
    }

    fn builtin(self) -> &'static str {
        match self {
            Self::Login => LOGIN_HTML,
            Self::Dashboard => DASHBOARD_HTML,
            Self::NotFound => NOT_FOUND_HTML,
        }
    }
}

/// Read `page` from `views_dir`, falling back to the built-in version.
pub async fn render(views_dir: &Path, page: Page) -> Html<String> {
    let path = views_dir.join(page.file_name());
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html),
        Err(e) => {
            debug!("using built-in {} ({}: {e})", page.file_name(), path.display());
            Html(page.builtin().to_string())
        }
    }
}

const LOGIN_HTML: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Login</title></head>
<body>
<h1>WhatsApp Admin</h1>
<form id="login">
  <input name="username" placeholder="Username" autocomplete="username">
  <input name="password" type="password" placeholder="Password" autocomplete="current-password">
  <button type="submit">Login</button>
</form>
<p id="error"></p>
<script>
document.getElementById("login").addEventListener("submit", async (e) => {
  e.preventDefault();
  const form = new FormData(e.target);
  const res = await fetch("/login", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify({ username: form.get("username"), password: form.get("password") }),
  });
  const body = await res.json();
  if (res.ok) { window.location.href = "/login/process"; }
  else { document.getElementById("error").textContent = body.message; }
});
</script>
</body>
</html>
"#;

const DASHBOARD_HTML: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Dashboard</title></head>
<body>
<h1>WhatsApp Admin</h1>
<p id="status">Waiting for WhatsApp...</p>
<img id="qr" alt="" hidden>
<form id="send">
  <input name="phone_number" placeholder="Phone number">
  <textarea name="message" placeholder="Message"></textarea>
  <button type="submit">Send</button>
</form>
<button id="wa-logout">Logout WhatsApp</button>
<a href="/logout">Logout</a>
<p id="result"></p>
<script>
const status = document.getElementById("status");
const qr = document.getElementById("qr");
const result = document.getElementById("result");
const proto = location.protocol === "https:" ? "wss://" : "ws://";
const socket = new WebSocket(proto + location.host + "/socket");
socket.onmessage = (msg) => {
  const { event, data } = JSON.parse(msg.data);
  if (event === "qr") { qr.src = data; qr.hidden = false; status.textContent = "Scan the QR code"; }
  if (event === "login") { qr.hidden = true; status.textContent = "Logged in as " + data.clientNumber; }
  if (event === "logout") { status.textContent = data.message; }
};
async function post(path, body) {
  const res = await fetch(path, {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify(body || {}),
  });
  result.textContent = (await res.json()).message;
}
document.getElementById("send").addEventListener("submit", (e) => {
  e.preventDefault();
  const form = new FormData(e.target);
  post("/admin/whatsapp/send-message", { phone_number: form.get("phone_number"), message: form.get("message") });
});
document.getElementById("wa-logout").addEventListener("click", () => post("/admin/whatsapp/logout"));
</script>
</body>
</html>
"#;

const NOT_FOUND_HTML: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Not Found</title></head>
<body>
<h1>404</h1>
<p>Page not found. <a href="/">Back to the dashboard</a></p>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_render_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dashboard.html"), "<p>custom</p>").unwrap();
        let Html(body) = render(dir.path(), Page::Dashboard).await;
        assert_eq!(body, "<p>custom</p>");
    }

    #[tokio::test]
    async fn test_render_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let Html(body) = render(dir.path(), Page::NotFound).await;
        assert!(body.contains("404"));
    }
}
