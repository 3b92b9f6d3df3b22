// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-unit bookkeeping of matched nodes.

use crate::ast::NodeId;
use crate::level::{Level, MatchLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Empty,
    /// Confirmed by syntax (accurate) or by a failed resolution (inaccurate).
    Matching(Level),
    /// Needs bindings before it can be reported.
    Possible(Level),
    /// Removed after being looked at; never reused within the unit.
    Tombstone,
}

/// Matched nodes of one unit, split into confirmed and possible buckets.
///
/// Slots are indexed by `NodeId`, so iteration follows arena order and a
/// removed node leaves a tombstone instead of shifting the others.
#[derive(Debug, Clone)]
pub struct NodeSet {
    slots: Vec<Slot>,
    must_resolve: bool,
}

impl NodeSet {
    pub fn new(len: usize, must_resolve: bool) -> Self {
        Self {
            slots: vec![Slot::Empty; len],
            must_resolve,
        }
    }

    /// Whether bindings are needed before the unit can be reported.
    pub fn must_resolve(&self) -> bool {
        self.must_resolve
    }

    pub fn set_must_resolve(&mut self, must_resolve: bool) {
        self.must_resolve = must_resolve;
    }

    /// Record a locator's verdict on `id` and return it.
    ///
    /// `possible` lands in the possible bucket, `accurate` and `inaccurate`
    /// in the matching bucket, `impossible` is dropped. A second verdict on
    /// the same node keeps the stronger one.
    pub fn add_match(&mut self, id: NodeId, level: Level) -> Level {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            return Level::IMPOSSIBLE;
        };
        let previous = match *slot {
            Slot::Matching(l) | Slot::Possible(l) => Some(l),
            Slot::Tombstone => return Level::IMPOSSIBLE,
            Slot::Empty => None,
        };
        let level = previous.map_or(level, |p| p.stronger(level));
        *slot = match level.level {
            MatchLevel::Impossible => return level,
            MatchLevel::Possible => Slot::Possible(level),
            MatchLevel::Accurate | MatchLevel::Inaccurate => Slot::Matching(level),
        };
        level
    }

    /// Move a resolved node into the matching bucket, or drop it when impossible.
    pub fn settle(&mut self, id: NodeId, level: Level) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            *slot = if level.is_impossible() {
                Slot::Tombstone
            } else {
                Slot::Matching(level)
            };
        }
    }

    pub fn remove(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            *slot = Slot::Tombstone;
        }
    }

    pub fn level(&self, id: NodeId) -> Option<Level> {
        match self.slots.get(id.index())? {
            Slot::Matching(l) | Slot::Possible(l) => Some(*l),
            _ => None,
        }
    }

    /// Confirmed nodes in arena order.
    pub fn matching_nodes(&self) -> Vec<(NodeId, Level)> {
        self.collect(|slot| match slot {
            Slot::Matching(l) => Some(*l),
            _ => None,
        })
    }

    /// Nodes waiting on bindings, in arena order.
    pub fn possible_nodes(&self) -> Vec<(NodeId, Level)> {
        self.collect(|slot| match slot {
            Slot::Possible(l) => Some(*l),
            _ => None,
        })
    }

    pub fn has_possible_nodes(&self) -> bool {
        self.slots.iter().any(|s| matches!(s, Slot::Possible(_)))
    }

    pub fn is_empty(&self) -> bool {
        !self
            .slots
            .iter()
            .any(|s| matches!(s, Slot::Matching(_) | Slot::Possible(_)))
    }

    fn collect(&self, pick: impl Fn(&Slot) -> Option<Level>) -> Vec<(NodeId, Level)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| pick(slot).map(|l| (NodeId(i as u32), l)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_land_in_their_buckets() {
        let mut set = NodeSet::new(4, false);
        set.add_match(NodeId(0), Level::ACCURATE);
        set.add_match(NodeId(1), Level::POSSIBLE);
        set.add_match(NodeId(2), Level::INACCURATE);
        set.add_match(NodeId(3), Level::IMPOSSIBLE);
        assert_eq!(
            set.matching_nodes().iter().map(|(id, _)| id.0).collect::<Vec<_>>(),
            vec![0, 2]
        );
        assert_eq!(set.possible_nodes().len(), 1);
        assert!(set.level(NodeId(3)).is_none());
    }

    #[test]
    fn settled_and_removed_nodes_are_tombstoned() {
        let mut set = NodeSet::new(3, true);
        set.add_match(NodeId(0), Level::POSSIBLE);
        set.add_match(NodeId(1), Level::POSSIBLE);
        set.settle(NodeId(0), Level::IMPOSSIBLE);
        set.settle(NodeId(1), Level::ACCURATE);
        assert!(!set.has_possible_nodes());
        assert_eq!(set.matching_nodes(), vec![(NodeId(1), Level::ACCURATE)]);
        set.remove(NodeId(1));
        assert!(set.is_empty());
        assert!(set.add_match(NodeId(1), Level::ACCURATE).is_impossible());
    }

    #[test]
    fn repeated_verdicts_keep_the_stronger() {
        let mut set = NodeSet::new(1, false);
        set.add_match(NodeId(0), Level::INACCURATE);
        set.add_match(NodeId(0), Level::ACCURATE);
        assert_eq!(set.level(NodeId(0)), Some(Level::ACCURATE));
    }
}
