// SPDX-License-Identifier: MIT OR Apache-2.0

//! Match levels and flavors
//!
//! A level is the confidence a locator has in one syntax node. Flavors are
//! additive metadata that ride along with a level and never change its order.

use bitflags::bitflags;
use serde::Serialize;
use std::fmt;

/// Ordered confidence of a single node match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchLevel {
    Impossible,
    Inaccurate,
    Possible,
    Accurate,
}

bitflags! {
    /// Metadata attached to a level.
    ///
    /// The low bits record how a name matched; the high bits record how a
    /// method reference relates to the searched declaration through dispatch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MatchFlavor: u16 {
        const EXACT = 1 << 0;
        const PREFIX = 1 << 1;
        const PATTERN = 1 << 2;
        const REGEXP = 1 << 3;
        const CAMEL_CASE = 1 << 4;

        /// Call made through `super.`.
        const SUPER_INVOCATION = 1 << 8;
        /// Receiver is not typed by the declaring type itself; the call can reach it by dispatch.
        const SUB_INVOCATION = 1 << 9;
        /// The searched method overrides, or is overridden on, the receiver's path.
        const OVERRIDDEN_METHOD = 1 << 10;
        /// Receiver typed by an interface; target cannot be pinned down.
        const POLYMORPHIC = 1 << 11;
    }
}

/// A level plus its flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Level {
    pub level: MatchLevel,
    pub flavor: MatchFlavor,
}

impl Level {
    pub const IMPOSSIBLE: Level = Level::new(MatchLevel::Impossible);
    pub const INACCURATE: Level = Level::new(MatchLevel::Inaccurate);
    pub const POSSIBLE: Level = Level::new(MatchLevel::Possible);
    pub const ACCURATE: Level = Level::new(MatchLevel::Accurate);

    pub const fn new(level: MatchLevel) -> Self {
        Self {
            level,
            flavor: MatchFlavor::empty(),
        }
    }

    pub fn with_flavor(mut self, flavor: MatchFlavor) -> Self {
        self.flavor |= flavor;
        self
    }

    pub fn is_impossible(self) -> bool {
        self.level == MatchLevel::Impossible
    }

    pub fn is_accurate(self) -> bool {
        self.level == MatchLevel::Accurate
    }

    /// Combine two independent constraints on the same node: the weaker level wins.
    pub fn weaker(self, other: Level) -> Level {
        if self.is_impossible() || other.is_impossible() {
            return Level::IMPOSSIBLE;
        }
        Level {
            level: self.level.min(other.level),
            flavor: self.flavor | other.flavor,
        }
    }

    /// Pick between alternatives for the same node: the stronger level wins.
    pub fn stronger(self, other: Level) -> Level {
        match self.level.cmp(&other.level) {
            std::cmp::Ordering::Greater => self,
            std::cmp::Ordering::Less => other,
            std::cmp::Ordering::Equal => Level {
                level: self.level,
                flavor: self.flavor | other.flavor,
            },
        }
    }

    /// Demote an accurate answer to possible, used when generics make syntax unreliable.
    pub fn capped_at_possible(self) -> Level {
        if self.level == MatchLevel::Accurate {
            Level {
                level: MatchLevel::Possible,
                flavor: self.flavor,
            }
        } else {
            self
        }
    }
}

impl From<MatchLevel> for Level {
    fn from(level: MatchLevel) -> Self {
        Level::new(level)
    }
}

impl fmt::Display for MatchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchLevel::Impossible => "impossible",
            MatchLevel::Inaccurate => "inaccurate",
            MatchLevel::Possible => "possible",
            MatchLevel::Accurate => "accurate",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(MatchLevel::Impossible < MatchLevel::Inaccurate);
        assert!(MatchLevel::Inaccurate < MatchLevel::Possible);
        assert!(MatchLevel::Possible < MatchLevel::Accurate);
    }

    #[test]
    fn weaker_takes_min_and_keeps_flavors() {
        let declaring = Level::ACCURATE.with_flavor(MatchFlavor::SUB_INVOCATION);
        let params = Level::INACCURATE;
        let combined = declaring.weaker(params);
        assert_eq!(combined.level, MatchLevel::Inaccurate);
        assert!(combined.flavor.contains(MatchFlavor::SUB_INVOCATION));
        assert_eq!(params.weaker(declaring).level, MatchLevel::Inaccurate);
    }

    #[test]
    fn weaker_never_raises() {
        let all = [
            Level::IMPOSSIBLE,
            Level::INACCURATE,
            Level::POSSIBLE,
            Level::ACCURATE,
        ];
        for a in all {
            for b in all {
                let combined = a.weaker(b);
                assert!(combined.level <= a.level);
                assert!(combined.level <= b.level);
            }
        }
    }

    #[test]
    fn impossible_drops_flavors() {
        let flavored = Level::ACCURATE.with_flavor(MatchFlavor::OVERRIDDEN_METHOD);
        assert_eq!(flavored.weaker(Level::IMPOSSIBLE), Level::IMPOSSIBLE);
    }

    #[test]
    fn stronger_takes_max() {
        assert_eq!(Level::POSSIBLE.stronger(Level::ACCURATE), Level::ACCURATE);
        assert_eq!(Level::IMPOSSIBLE.stronger(Level::INACCURATE), Level::INACCURATE);
    }

    #[test]
    fn capped_at_possible_only_touches_accurate() {
        assert_eq!(Level::ACCURATE.capped_at_possible().level, MatchLevel::Possible);
        assert_eq!(Level::INACCURATE.capped_at_possible().level, MatchLevel::Inaccurate);
    }
}
