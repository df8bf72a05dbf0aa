//! Run-scoped lead budget.

/// Counts accepted leads against a fixed maximum.
///
/// The budget is owned by whoever drives the loop and passed down by value
/// (as the remaining count); callers report back how many leads they produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlBudget {
    max: usize,
    used: usize,
}

impl CrawlBudget {
    /// A fresh budget of `max` leads.
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self { max, used: 0 }
    }

    /// Configured maximum.
    #[must_use]
    pub fn max(&self) -> usize {
        self.max
    }

    /// Leads accepted so far.
    #[must_use]
    pub fn used(&self) -> usize {
        self.used
    }

    /// Leads that may still be accepted.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.max - self.used
    }

    /// Whether no more leads may be accepted.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Record `n` accepted leads, clamped to what remains. Returns how many
    /// were actually admitted.
    pub fn consume(&mut self, n: usize) -> usize {
        let admitted = n.min(self.remaining());
        self.used += admitted;
        admitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_clamps() {
        let mut budget = CrawlBudget::new(50);
        assert_eq!(budget.consume(30), 30);
        assert_eq!(budget.remaining(), 20);
        assert_eq!(budget.consume(30), 20);
        assert!(budget.is_exhausted());
        assert_eq!(budget.used(), 50);
        assert_eq!(budget.consume(1), 0);
    }

    #[test]
    fn test_zero_budget_is_exhausted() {
        assert!(CrawlBudget::new(0).is_exhausted());
    }
}
