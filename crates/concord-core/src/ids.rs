// ids.rs — Per-run identifier sequences.
//
// Issue and finding IDs ("issue_1", "finding_1", ...) are drawn from an
// explicit counter owned by the run, never from a global. Two runs in the
// same process get independent sequences.

/// A monotonically increasing ID sequence with a fixed prefix.
#[derive(Debug, Clone)]
pub struct IdSequence {
    prefix: String,
    next: u64,
}

impl IdSequence {
    /// Create a sequence starting at `<prefix>_1`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }

    /// Return the next ID and advance the counter.
    pub fn next_id(&mut self) -> String {
        let id = format!("{}_{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_and_prefixed() {
        let mut seq = IdSequence::new("issue");
        assert_eq!(seq.next_id(), "issue_1");
        assert_eq!(seq.next_id(), "issue_2");
        assert_eq!(seq.next_id(), "issue_3");
    }

    #[test]
    fn sequences_are_independent() {
        let mut issues = IdSequence::new("issue");
        let mut findings = IdSequence::new("finding");
        issues.next_id();
        issues.next_id();
        assert_eq!(findings.next_id(), "finding_1");
        assert_eq!(issues.next_id(), "issue_3");
    }
}
