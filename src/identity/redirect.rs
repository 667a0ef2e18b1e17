use parking_lot::Mutex;

use crate::tprintln;

/// Single-slot channel recording where an unauthenticated visitor was
/// trying to go. `take_once` hands the value out at most once, which is
/// what makes the consumed-exactly-once contract enforceable in code.
#[derive(Default)]
pub struct PendingRedirect {
    slot: Mutex<Option<String>>,
}

impl PendingRedirect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the attempted path, replacing any previous value.
    pub fn set<S: Into<String>>(&self, path: S) {
        let path = path.into();
        tprintln!("redirect.set path={}", path);
        *self.slot.lock() = Some(path);
    }

    /// Consume the slot. A second call returns None until `set` runs again.
    pub fn take_once(&self) -> Option<String> {
        self.slot.lock().take()
    }

    pub fn is_set(&self) -> bool {
        self.slot.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumed_exactly_once() {
        let pending = PendingRedirect::new();
        pending.set("/libro/42");
        assert_eq!(pending.take_once().as_deref(), Some("/libro/42"));
        assert_eq!(pending.take_once(), None);
    }

    #[test]
    fn set_replaces_previous_value() {
        let pending = PendingRedirect::new();
        pending.set("/admin");
        pending.set("/libro/1");
        assert_eq!(pending.take_once().as_deref(), Some("/libro/1"));
        assert!(!pending.is_set());
    }
}
