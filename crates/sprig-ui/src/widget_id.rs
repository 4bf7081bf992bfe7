//! Widget id generation.

use std::cell::Cell;

/// Hands out document-unique widget ids: `widget1`, `widget2`, ...
///
/// The generator is owned by whoever attaches widgets, so separate documents
/// (or tests) never share a counter.
///
/// # Example
/// ```
/// use sprig_ui::IdGenerator;
///
/// let ids = IdGenerator::default();
/// assert_eq!(ids.next_id(), "widget1");
/// assert_eq!(ids.next_id(), "widget2");
/// ```
#[derive(Debug)]
pub struct IdGenerator {
    prefix: String,
    last: Cell<u64>,
}

impl IdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            last: Cell::new(0),
        }
    }

    pub fn next_id(&self) -> String {
        let id = self.last.get() + 1;
        self.last.set(id);
        format!("{}{}", self.prefix, id)
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.last.get()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new("widget")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_prefix() {
        let ids = IdGenerator::new("counter-");
        assert_eq!(ids.next_id(), "counter-1");
        assert_eq!(ids.next_id(), "counter-2");
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn test_generators_are_independent() {
        let a = IdGenerator::default();
        let b = IdGenerator::default();
        a.next_id();
        assert_eq!(b.next_id(), "widget1");
    }
}
