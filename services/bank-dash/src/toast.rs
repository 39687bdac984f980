// services/bank-dash/src/toast.rs
//
// Transient notifications with auto-dismiss
//

use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastKind::Success => "✓",
            ToastKind::Error => "✗",
            ToastKind::Info => "ℹ",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Debug)]
pub struct Toasts {
    items: VecDeque<Toast>,
    ttl: Duration,
}

const MAX_TOASTS: usize = 5;

impl Toasts {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            ttl,
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Success, message, self.ttl);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Error, message, self.ttl);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Info, message, self.ttl);
    }

    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>, ttl: Duration) {
        self.items.push_back(Toast {
            kind,
            message: message.into(),
            expires_at: Instant::now() + ttl,
        });
        while self.items.len() > MAX_TOASTS {
            self.items.pop_front();
        }
    }

    /// Drops every toast whose deadline has passed.
    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|t| t.expires_at > now);
    }

    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.items.back()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire() {
        let mut toasts = Toasts::new(Duration::from_millis(50));
        toasts.success("Donor registered successfully!");
        toasts.push(ToastKind::Info, "kept", Duration::from_secs(60));
        assert_eq!(toasts.len(), 2);

        toasts.prune(Instant::now() + Duration::from_millis(100));
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts.latest().unwrap().message, "kept");
    }

    #[test]
    fn test_oldest_toasts_are_evicted() {
        let mut toasts = Toasts::default();
        for i in 0..8 {
            toasts.error(format!("failure {}", i));
        }
        assert_eq!(toasts.len(), MAX_TOASTS);
        assert_eq!(toasts.visible().next().unwrap().message, "failure 3");
    }
}
