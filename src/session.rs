//! Process-wide administrator login flag.

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether an administrator is logged in to the dashboard.
///
/// A single flag for the whole process: there are no per-browser sessions,
/// and it is reset on restart.
#[derive(Debug, Default)]
pub struct SessionGate {
    logged_in: AtomicBool,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }

    pub fn login(&self) {
        self.logged_in.store(true, Ordering::SeqCst);
    }

    pub fn logout(&self) {
        self.logged_in.store(false, Ordering::SeqCst);
    }
}
