//! Action resolution
//!
//! Produces exactly one [`ActionInfo`] per field by layering, in order:
//!
//! 1. manual entries (authoritative), otherwise fixed-value detection on the
//!    target profile, otherwise "undecided"
//! 2. partner links for manual copy actions
//! 3. the full-depth `use_recursive` cascade
//! 4. the single-level `not_use` cascade
//!
//! Fields holding a manual action are never touched by steps 2-4.

use crate::manual::ManualEntries;
use crate::model::{ActionInfo, ActionKind, ActionMap, FieldFacts};
use crate::path;
use crate::tree::{FieldId, FieldTree};
use indexmap::IndexMap;
use serde_json::Value;

pub const FIXED_VALUE_REMARK: &str = "Auto-detected fixed value from target profile";
pub const PATTERN_SYSTEM_REMARK: &str = "Auto-detected coding system from parent pattern";

/// Compute the effective action of every field
pub fn resolve<F: FieldFacts>(tree: &FieldTree<F>, manual: &ManualEntries) -> ActionMap {
    let mut actions: ActionMap = IndexMap::with_capacity(tree.len());

    for (id, field) in tree.iter() {
        let info = match manual.get(field.path()) {
            Some(entry) => ActionInfo::manual(entry.action)
                .with_user_remark(entry.remark.clone())
                .with_optional_other(entry.other.clone())
                .with_optional_fixed(entry.fixed.clone()),
            None => detect_fixed_value(tree, id).unwrap_or_else(ActionInfo::undecided),
        };
        actions.insert(field.path().to_string(), info);
    }

    for path in manual.iter().map(|(path, _)| path) {
        if !tree.contains(path) {
            tracing::debug!("Manual entry for unknown field '{}' ignored", path);
        }
    }

    link_copy_partners(tree, manual, &mut actions);
    cascade_use_recursive(tree, &mut actions);
    cascade_not_use(tree, &mut actions);

    actions
}

/// Fixed value declared on the target profile, or the coding system a parent
/// Coding pins via its pattern.
fn detect_fixed_value<F: FieldFacts>(tree: &FieldTree<F>, id: FieldId) -> Option<ActionInfo> {
    let target = &tree.keys().target;
    let field = tree.field(id);
    let facts = field.profile(target).filter(|facts| facts.present)?;

    if let Some((_, value)) = facts.fixed_value() {
        return Some(
            ActionInfo::system_default(ActionKind::Fixed)
                .with_fixed(value.clone())
                .with_system_remark(FIXED_VALUE_REMARK),
        );
    }

    if !path::is_system_element(field.path()) {
        return None;
    }
    let parent = tree.get(path::parent(field.path())?)?;
    let system = parent.profile(target)?.pattern_coding_system.as_ref()?;
    Some(
        ActionInfo::system_default(ActionKind::Fixed)
            .with_fixed(Value::String(system.clone()))
            .with_system_remark(PATTERN_SYSTEM_REMARK),
    )
}

/// Install the counterpart of every manual copy action on its partner
fn link_copy_partners<F: FieldFacts>(
    tree: &FieldTree<F>,
    manual: &ManualEntries,
    actions: &mut ActionMap,
) {
    for (path, entry) in manual.iter() {
        let Some(counterpart) = entry.action.copy_counterpart() else {
            continue;
        };
        if !tree.contains(path) {
            continue;
        }
        let Some(partner) = entry.other.as_deref() else {
            continue;
        };
        if !tree.contains(partner) {
            tracing::debug!("Copy partner '{}' of '{}' not in field tree", partner, path);
            continue;
        }
        if actions.get(partner).is_some_and(ActionInfo::is_manual) {
            continue;
        }

        tracing::trace!("Linking {} on '{}' back to '{}'", counterpart, partner, path);
        actions.insert(
            partner.to_string(),
            ActionInfo::manual(counterpart)
                .with_other(path)
                .with_system_remark(format!("Linked from {path}")),
        );
    }
}

fn manual_roots<F: FieldFacts>(
    tree: &FieldTree<F>,
    actions: &ActionMap,
    kind: ActionKind,
) -> Vec<FieldId> {
    let mut roots: Vec<FieldId> = tree
        .ids()
        .filter(|id| {
            actions
                .get(tree.path(*id))
                .is_some_and(|info| info.is_manual() && info.action == Some(kind))
        })
        .collect();
    roots.sort_by_key(|id| tree.depth(*id));
    roots
}

/// `use_recursive` reaches every descendant. Shallow roots run first so a
/// nested manual `use_recursive` ends up as the recorded origin.
fn cascade_use_recursive<F: FieldFacts>(tree: &FieldTree<F>, actions: &mut ActionMap) {
    for root in manual_roots(tree, actions, ActionKind::UseRecursive) {
        let origin = tree.path(root);
        let mut applied = 0usize;
        for descendant in tree.descendants(root) {
            let path = tree.path(descendant);
            if actions.get(path).is_some_and(ActionInfo::is_manual) {
                continue;
            }
            actions.insert(
                path.to_string(),
                ActionInfo::inherited(ActionKind::UseRecursive, origin)
                    .with_system_remark(format!("Inherited USE_RECURSIVE from {origin}")),
            );
            applied += 1;
        }
        tracing::debug!("use_recursive on '{}' cascaded to {} fields", origin, applied);
    }
}

/// `not_use` reaches direct children only. The children end up `inherited`,
/// so nothing cascades further.
fn cascade_not_use<F: FieldFacts>(tree: &FieldTree<F>, actions: &mut ActionMap) {
    for root in manual_roots(tree, actions, ActionKind::NotUse) {
        let origin = tree.path(root);
        for child in tree.direct_children(root) {
            let path = tree.path(child);
            if actions.get(path).is_some_and(ActionInfo::is_manual) {
                continue;
            }
            actions.insert(
                path.to_string(),
                ActionInfo::inherited(ActionKind::NotUse, origin).with_system_remark(format!(
                    "Automatically inherited NOT_USE from parent field {origin}"
                )),
            );
        }
    }
}
