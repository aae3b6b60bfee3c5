use std::sync::atomic::{AtomicU64, Ordering};

/// Issues monotonically increasing tickets.
///
/// Every operation that replaces the editor state takes a ticket before it
/// starts. Only the holder of the most recently issued ticket may apply its
/// result.
#[derive(Debug, Default)]
pub struct Sequencer {
    latest: AtomicU64,
}

/// Position of an operation in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Sequencer {
    /// Create a sequencer that has issued no tickets.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
        }
    }

    /// Issue the next ticket, superseding all earlier ones.
    #[must_use = "a ticket is needed to check the result later"]
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is still the latest one issued.
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// Result of an operation guarded by a [`Ticket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    /// The result was applied to the editor state.
    Applied(T),
    /// A newer operation started first; the result was discarded.
    Stale,
}

impl<T> Outcome<T> {
    /// Whether the result was applied.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Whether the result was discarded.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }

    /// The applied value, if any.
    #[must_use]
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Stale => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let sequencer = Sequencer::new();
        let first = sequencer.issue();
        assert!(sequencer.is_current(first));

        let second = sequencer.issue();
        assert!(first < second);
        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
    }

    #[test]
    fn outcome_accessors() {
        assert_eq!(Outcome::Applied(3).applied(), Some(3));
        assert!(Outcome::<()>::Stale.is_stale());
        assert!(!Outcome::<()>::Stale.is_applied());
    }
}
