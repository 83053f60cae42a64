use core::fmt;

use crate::Real;

/// Geometric channel category tracked separately for pressure extrema.
///
/// The discriminant doubles as the slot index used by two-element
/// per-channel arrays: large channel first, small channel second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ChannelClass {
    Large = 0,
    Small = 1,
}

impl ChannelClass {
    pub const ALL: [ChannelClass; 2] = [ChannelClass::Large, ChannelClass::Small];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Large => "large",
            Self::Small => "small",
        }
    }
}

impl fmt::Display for ChannelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One scalar per channel class.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelPair {
    pub large: Real,
    pub small: Real,
}

impl ChannelPair {
    pub fn new(large: Real, small: Real) -> Self {
        Self { large, small }
    }

    pub fn get(&self, class: ChannelClass) -> Real {
        match class {
            ChannelClass::Large => self.large,
            ChannelClass::Small => self.small,
        }
    }

    /// `[large, small]`
    pub fn to_array(self) -> [Real; 2] {
        [self.large, self.small]
    }

    /// Element-wise `self - rhs`.
    pub fn minus(self, rhs: ChannelPair) -> ChannelPair {
        ChannelPair {
            large: self.large - rhs.large,
            small: self.small - rhs.small,
        }
    }
}

impl From<[Real; 2]> for ChannelPair {
    fn from(v: [Real; 2]) -> Self {
        Self {
            large: v[0],
            small: v[1],
        }
    }
}

impl fmt::Display for ChannelPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "large={} small={}", self.large, self.small)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_index_matches_slot_order() {
        for (slot, class) in ChannelClass::ALL.into_iter().enumerate() {
            assert_eq!(class.index(), slot);
        }
        assert_eq!(ChannelClass::Large.index(), 0);
        assert_eq!(ChannelClass::Small.index(), 1);
    }

    #[test]
    fn pair_difference_and_array_order() {
        let max = ChannelPair::new(10.0, 6.0);
        let min = ChannelPair::new(2.0, 1.0);
        let drop = max.minus(min);
        assert_eq!(drop.to_array(), [8.0, 5.0]);
        assert_eq!(drop.get(ChannelClass::Small), 5.0);
        assert_eq!(ChannelPair::from([8.0, 5.0]), drop);
    }
}
