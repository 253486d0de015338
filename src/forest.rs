//! Step normalizer: rebuilds the parent/child tree from flat step records.
//!
//! Records arrive in arbitrary order and only point at their parent, so the
//! forest is built in two passes over an index-addressed arena: first every
//! id is indexed, then every record is linked to its parent (or promoted to a
//! root). Sibling lists are then sorted by sequence.

use crate::error::ProcessError;
use crate::process::StepRecord;
use ahash::AHashMap;
use tracing::{debug, warn};

/// Position of a step in the input slice.
pub type StepIndex = usize;

/// The reconstructed execution tree, borrowing the flat records it was built from.
#[derive(Debug, Clone)]
pub struct StepForest<'a> {
    steps: &'a [StepRecord],
    roots: Vec<StepIndex>,
    children: Vec<Vec<StepIndex>>,
}

impl<'a> StepForest<'a> {
    pub fn roots(&self) -> &[StepIndex] {
        &self.roots
    }

    pub fn children(&self, index: StepIndex) -> &[StepIndex] {
        &self.children[index]
    }

    pub fn step(&self, index: StepIndex) -> &'a StepRecord {
        &self.steps[index]
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Every step in depth-first, sequence-ordered traversal, paired with its depth.
    pub fn depth_first(&self) -> Vec<(StepIndex, usize)> {
        let mut order = Vec::with_capacity(self.steps.len());
        let mut stack: Vec<(StepIndex, usize)> =
            self.roots.iter().rev().map(|&root| (root, 0)).collect();
        while let Some((index, depth)) = stack.pop() {
            order.push((index, depth));
            stack.extend(
                self.children[index]
                    .iter()
                    .rev()
                    .map(|&child| (child, depth + 1)),
            );
        }
        order
    }
}

/// Builds the forest. Unresolvable parents are promoted to roots; parent
/// cycles are reported as [`ProcessError::ParentCycle`].
pub fn build_forest(steps: &[StepRecord]) -> Result<StepForest<'_>, ProcessError> {
    // Pass 1: index every id. The first record to claim an id owns it.
    let mut index: AHashMap<&str, StepIndex> = AHashMap::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        let id = step.id.trim();
        if index.contains_key(id) {
            warn!(step_id = id, "duplicate step id; parent links resolve to the first record");
        } else {
            index.insert(id, i);
        }
    }

    // Pass 2: link each record to its parent.
    let mut roots = Vec::new();
    let mut children: Vec<Vec<StepIndex>> = vec![Vec::new(); steps.len()];
    for (i, step) in steps.iter().enumerate() {
        match step.parent_key() {
            None => roots.push(i),
            Some(parent) => match index.get(parent) {
                Some(&p) => children[p].push(i),
                None => {
                    warn!(
                        step_id = step.id.as_str(),
                        parent_id = parent,
                        "parent not found; promoting step to root"
                    );
                    roots.push(i);
                }
            },
        }
    }

    let by_sequence = |a: &StepIndex, b: &StepIndex| {
        steps[*a]
            .sequence_key()
            .total_cmp(&steps[*b].sequence_key())
    };
    roots.sort_by(by_sequence);
    for siblings in &mut children {
        siblings.sort_by(by_sequence);
    }

    let forest = StepForest {
        steps,
        roots,
        children,
    };
    check_reachability(&forest)?;

    debug!(
        steps = forest.len(),
        roots = forest.roots.len(),
        "step forest built"
    );
    Ok(forest)
}

/// Every step must be reachable from a root; anything left over sits on a parent cycle.
fn check_reachability(forest: &StepForest<'_>) -> Result<(), ProcessError> {
    let mut visited = vec![false; forest.len()];
    for (index, _) in forest.depth_first() {
        visited[index] = true;
    }

    let step_ids: Vec<String> = visited
        .iter()
        .enumerate()
        .filter(|(_, seen)| !**seen)
        .map(|(i, _)| forest.steps[i].id.clone())
        .collect();

    if step_ids.is_empty() {
        Ok(())
    } else {
        warn!(count = step_ids.len(), "parent cycle detected");
        Err(ProcessError::ParentCycle { step_ids })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str, parent: &str, seq: &str) -> StepRecord {
        StepRecord::new(id, "Group")
            .with_parent(parent)
            .with_sequence(seq)
    }

    #[test]
    fn test_children_before_parents() {
        let steps = vec![step("20", "10", "1"), step("10", "0", "1")];
        let forest = build_forest(&steps).unwrap();
        assert_eq!(forest.roots(), &[1]);
        assert_eq!(forest.children(1), &[0]);
    }

    #[test]
    fn test_missing_sequence_sorts_last_and_ties_are_stable() {
        let steps = vec![
            step("a", "0", ""),
            step("b", "0", "2"),
            step("c", "0", "1"),
            step("d", "0", "2"),
        ];
        let forest = build_forest(&steps).unwrap();
        let ids: Vec<&str> = forest
            .roots()
            .iter()
            .map(|&i| forest.step(i).id.as_str())
            .collect();
        assert_eq!(ids, vec!["c", "b", "d", "a"]);
    }

    #[test]
    fn test_orphan_is_promoted() {
        let steps = vec![step("1", "0", "1"), step("2", "99", "2")];
        let forest = build_forest(&steps).unwrap();
        assert_eq!(forest.roots(), &[0, 1]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let steps = vec![step("1", "0", "1"), step("2", "3", "1"), step("3", "2", "1")];
        let err = build_forest(&steps).unwrap_err();
        assert_eq!(
            err,
            ProcessError::ParentCycle {
                step_ids: vec!["2".to_string(), "3".to_string()]
            }
        );
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let steps = vec![step("5", "5", "1")];
        assert!(matches!(
            build_forest(&steps),
            Err(ProcessError::ParentCycle { .. })
        ));
    }

    #[test]
    fn test_depth_first_order_and_depths() {
        let steps = vec![
            step("1", "0", "1"),
            step("2", "1", "2"),
            step("3", "1", "1"),
            step("4", "3", "1"),
            step("5", "0", "2"),
        ];
        let forest = build_forest(&steps).unwrap();
        let walk: Vec<(&str, usize)> = forest
            .depth_first()
            .into_iter()
            .map(|(i, d)| (forest.step(i).id.as_str(), d))
            .collect();
        assert_eq!(
            walk,
            vec![("1", 0), ("3", 1), ("4", 2), ("2", 1), ("5", 0)]
        );
    }
}
