//! Execution units and unit requirements.
//!
//! Each target declares its own closed unit enum with [`execution_units!`]; the
//! unit name spaces of different targets are unrelated. Requirements are stored
//! as bit sets over a target's unit indices so that cost models stay object safe.

use std::fmt;

/// A target-specific execution unit.
pub trait ExecutionUnit: Copy + fmt::Debug + 'static {
    /// Unit names, indexed by [`ExecutionUnit::index`].
    const NAMES: &'static [&'static str];

    fn index(self) -> u8;

    fn name(self) -> &'static str {
        Self::NAMES[usize::from(self.index())]
    }
}

/// Declare a target's execution-unit enum.
///
/// ```ignore
/// execution_units! {
///     pub enum Unit {
///         Scalar => "SCALAR",
///         Load => "LOAD",
///     }
/// }
/// ```
macro_rules! execution_units {
    ($vis:vis enum $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::units::ExecutionUnit for $name {
            const NAMES: &'static [&'static str] = &[$($label),+];

            fn index(self) -> u8 {
                self as u8
            }
        }

        const _: () = assert!(
            <$name as $crate::units::ExecutionUnit>::NAMES.len()
                <= $crate::units::UnitSet::CAPACITY,
            concat!(stringify!($name), " declares more units than a UnitSet holds"),
        );
    };
}
pub(crate) use execution_units;

/// A set of interchangeable units of one target.
///
/// Holds at most [`UnitSet::CAPACITY`] units; [`execution_units!`] rejects
/// larger enums at compile time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UnitSet(u32);

impl UnitSet {
    pub const EMPTY: UnitSet = UnitSet(0);

    /// Largest number of units a target may declare.
    pub const CAPACITY: usize = u32::BITS as usize;

    /// Set containing exactly `units`.
    pub fn of<U: ExecutionUnit>(units: &[U]) -> Self {
        units
            .iter()
            .fold(Self::EMPTY, |set, u| set.with_index(u.index()))
    }

    fn with_index(self, index: u8) -> Self {
        UnitSet(self.0 | (1 << index))
    }

    pub fn contains<U: ExecutionUnit>(self, unit: U) -> bool {
        self.contains_index(unit.index())
    }

    pub fn contains_index(self, index: u8) -> bool {
        usize::from(index) < Self::CAPACITY && self.0 & (1 << index) != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Unit indices in ascending order.
    pub fn indices(self) -> impl Iterator<Item = u8> {
        (0..u32::BITS as u8).filter(move |&i| self.contains_index(i))
    }

    /// Whether every unit of `self` is also in `other`.
    pub fn is_subset(self, other: UnitSet) -> bool {
        self.0 & !other.0 == 0
    }

    /// Render with a target's unit names.
    pub fn display(self, names: &'static [&'static str]) -> String {
        let names: Vec<&str> = self
            .indices()
            .filter_map(|i| names.get(usize::from(i)).copied())
            .collect();
        format!("{{{}}}", names.join(", "))
    }
}

impl fmt::Debug for UnitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.indices()).finish()
    }
}

/// Execution resources an instruction needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitRequirement {
    /// Any one unit of the set.
    AnyOf(UnitSet),
    /// One unit from each set, all in the same cycle.
    AllOf(Vec<UnitSet>),
}

impl UnitRequirement {
    pub fn any<U: ExecutionUnit>(units: &[U]) -> Self {
        UnitRequirement::AnyOf(UnitSet::of(units))
    }

    pub fn all<U: ExecutionUnit>(groups: &[&[U]]) -> Self {
        UnitRequirement::AllOf(groups.iter().map(|g| UnitSet::of(g)).collect())
    }

    /// Whether the instruction occupies several units at once.
    pub fn is_conjunction(&self) -> bool {
        matches!(self, UnitRequirement::AllOf(sets) if sets.len() >= 2)
    }

    /// The alternative sets, one per simultaneously occupied unit.
    pub fn sets(&self) -> &[UnitSet] {
        match self {
            UnitRequirement::AnyOf(set) => std::slice::from_ref(set),
            UnitRequirement::AllOf(sets) => sets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    execution_units! {
        enum TestUnit {
            A => "A",
            B => "B",
            C => "C",
        }
    }

    #[test]
    fn names_follow_declaration_order() {
        assert_eq!(TestUnit::B.index(), 1);
        assert_eq!(TestUnit::C.name(), "C");
        assert_eq!(TestUnit::NAMES, &["A", "B", "C"]);
    }

    #[test]
    fn set_membership() {
        let set = UnitSet::of(&[TestUnit::A, TestUnit::C]);
        assert!(set.contains(TestUnit::A));
        assert!(!set.contains(TestUnit::B));
        assert_eq!(set.len(), 2);
        assert_eq!(set.indices().collect::<Vec<_>>(), vec![0, 2]);
        assert!(UnitSet::of(&[TestUnit::C]).is_subset(set));
        assert_eq!(set.display(TestUnit::NAMES), "{A, C}");
    }

    #[test]
    fn conjunction_shape() {
        let flat = UnitRequirement::any(&[TestUnit::A, TestUnit::B]);
        let groups: &[&[TestUnit]] = &[&[TestUnit::A], &[TestUnit::B, TestUnit::C]];
        let wide = UnitRequirement::all(groups);
        assert!(!flat.is_conjunction());
        assert_eq!(flat.sets().len(), 1);
        assert!(wide.is_conjunction());
        assert_eq!(wide.sets().len(), 2);
    }

    execution_units! {
        enum FullUnit {
            U0 => "U0", U1 => "U1", U2 => "U2", U3 => "U3",
            U4 => "U4", U5 => "U5", U6 => "U6", U7 => "U7",
            U8 => "U8", U9 => "U9", U10 => "U10", U11 => "U11",
            U12 => "U12", U13 => "U13", U14 => "U14", U15 => "U15",
            U16 => "U16", U17 => "U17", U18 => "U18", U19 => "U19",
            U20 => "U20", U21 => "U21", U22 => "U22", U23 => "U23",
            U24 => "U24", U25 => "U25", U26 => "U26", U27 => "U27",
            U28 => "U28", U29 => "U29", U30 => "U30", U31 => "U31",
        }
    }

    #[test]
    fn full_width_enum_fits() {
        assert_eq!(FullUnit::NAMES.len(), UnitSet::CAPACITY);
        let set = UnitSet::of(&[FullUnit::U0, FullUnit::U31]);
        assert!(set.contains(FullUnit::U31));
        assert!(!set.contains(FullUnit::U30));
        assert_eq!(set.indices().collect::<Vec<_>>(), vec![0, 31]);
        assert_eq!(set.display(FullUnit::NAMES), "{U0, U31}");
        assert!(!set.contains_index(32));
        assert!(!UnitSet::of(&[FullUnit::U31]).contains_index(u8::MAX));
    }

    #[test]
    fn builtin_targets_fit_a_unit_set() {
        for name in crate::registry::list_targets() {
            let model = crate::registry::get_target(name).unwrap();
            assert!(model.unit_names().len() <= UnitSet::CAPACITY, "{name}");
        }
    }
}
