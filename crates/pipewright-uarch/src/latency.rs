//! Latency values and joint scheduling relations.

use std::fmt;

/// Relation between the issue cycles of two instructions, `first` and `second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `second` issues exactly `n` cycles after `first`.
    Exactly(u32),
    /// `second` issues at least `n` cycles after `first`.
    AtLeast(u32),
    /// The two issue at least `n` cycles apart, in either order.
    Apart(u32),
    /// The two never issue in consecutive cycles.
    NotAdjacent,
}

impl Relation {
    /// Whether the relation holds for the given issue cycles.
    pub fn holds(self, first: i64, second: i64) -> bool {
        let gap = second - first;
        match self {
            Relation::Exactly(n) => gap == i64::from(n),
            Relation::AtLeast(n) => gap >= i64::from(n),
            Relation::Apart(n) => gap.abs() >= i64::from(n),
            Relation::NotAdjacent => gap.abs() != 1,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Exactly(n) => write!(f, "t2 == t1 + {n}"),
            Relation::AtLeast(n) => write!(f, "t2 >= t1 + {n}"),
            Relation::Apart(n) => write!(f, "|t2 - t1| >= {n}"),
            Relation::NotAdjacent => write!(f, "|t2 - t1| != 1"),
        }
    }
}

/// Latency from a producing instruction to a consumer.
///
/// A `Paired` latency carries a relation the scheduler must enforce between the
/// two instructions whenever both are placed, on top of the plain delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Latency {
    Cycles(u32),
    Paired { cycles: u32, relation: Relation },
}

impl Latency {
    pub fn cycles(self) -> u32 {
        match self {
            Latency::Cycles(cycles) | Latency::Paired { cycles, .. } => cycles,
        }
    }

    pub fn relation(self) -> Option<Relation> {
        match self {
            Latency::Cycles(_) => None,
            Latency::Paired { relation, .. } => Some(relation),
        }
    }
}

impl From<u32> for Latency {
    fn from(cycles: u32) -> Self {
        Latency::Cycles(cycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_gap() {
        assert!(Relation::Exactly(2).holds(3, 5));
        assert!(!Relation::Exactly(2).holds(3, 4));
        assert!(!Relation::Exactly(2).holds(5, 3));
    }

    #[test]
    fn symmetric_relations() {
        assert!(Relation::Apart(2).holds(5, 3));
        assert!(!Relation::Apart(2).holds(4, 3));
        assert!(Relation::NotAdjacent.holds(4, 4));
        assert!(!Relation::NotAdjacent.holds(4, 3));
        assert!(Relation::AtLeast(1).holds(0, 1));
        assert!(!Relation::AtLeast(1).holds(1, 0));
    }

    #[test]
    fn latency_accessors() {
        let plain = Latency::from(3);
        assert_eq!(plain.cycles(), 3);
        assert_eq!(plain.relation(), None);
        let paired = Latency::Paired {
            cycles: 2,
            relation: Relation::Exactly(2),
        };
        assert_eq!(paired.cycles(), 2);
        assert_eq!(paired.relation(), Some(Relation::Exactly(2)));
        assert_eq!(Relation::Exactly(2).to_string(), "t2 == t1 + 2");
    }
}
