//! Allowed-action gate
//!
//! `use_recursive` is only legal on a field whose whole subtree can be kept
//! without review: every descendant is compatible, or already solved.

use crate::model::{
    ActionKind, AllowedActionMap, Classification, EvaluationMap, FieldFacts, MappingStatus,
};
use crate::tree::{FieldId, FieldTree};

/// `true` if every descendant is compatible or evaluated as solved.
///
/// A descendant missing from `evaluations` is never considered solved.
/// Vacuously `true` for leaves.
pub fn all_descendants_compatible_or_solved<F: FieldFacts>(
    tree: &FieldTree<F>,
    id: FieldId,
    evaluations: &EvaluationMap,
) -> bool {
    tree.descendants(id).into_iter().all(|descendant| {
        tree.field(descendant).classification() == Classification::Compatible
            || evaluations
                .get(tree.path(descendant))
                .is_some_and(|result| result.mapping_status == MappingStatus::Solved)
    })
}

/// Baseline allowed actions per field; unrestricted fields get every kind
/// except `use_recursive`, which only [`adjust`] grants.
pub fn baseline<F: FieldFacts>(tree: &FieldTree<F>) -> AllowedActionMap {
    tree.iter()
        .map(|(_, field)| {
            let mut allowed = match field.actions_allowed() {
                Some(allowed) => allowed.clone(),
                None => ActionKind::ALL.into_iter().collect(),
            };
            allowed.remove(&ActionKind::UseRecursive);
            (field.path().to_string(), allowed)
        })
        .collect()
}

/// Grant or revoke `use_recursive` on every field present in `allowed`.
///
/// Leaves never get it: the bulk action is meaningless without descendants.
pub fn adjust<F: FieldFacts>(
    tree: &FieldTree<F>,
    evaluations: &EvaluationMap,
    allowed: &mut AllowedActionMap,
) {
    for (path, actions) in allowed.iter_mut() {
        let Some(id) = tree.id(path) else {
            continue;
        };
        if tree.has_descendants(id) && all_descendants_compatible_or_solved(tree, id, evaluations)
        {
            actions.insert(ActionKind::UseRecursive);
        } else {
            actions.remove(&ActionKind::UseRecursive);
        }
    }
}
