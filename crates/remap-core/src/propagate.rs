//! Upward propagation of unresolved status
//!
//! A field that looks fine on its own is demoted to `incompatible` as long
//! as anything below it is still incompatible. A manual action on the field
//! means the operator owns the subtree and stops the demotion.

use crate::config::PropagationConfig;
use crate::model::{
    ActionInfo, ActionMap, EvaluationMap, EvaluationReason, EvaluationResult, EvaluationStatus,
    FieldFacts, MappingStatus, Severity,
};
use crate::tree::FieldTree;
use serde_json::Value;

pub const INHERITED_INCOMPATIBLE_FROM_CHILDREN: &str = "INHERITED_INCOMPATIBLE_FROM_CHILDREN";

#[derive(Debug, Clone, Default)]
pub struct StatusPropagator {
    config: PropagationConfig,
}

impl StatusPropagator {
    pub fn new(config: PropagationConfig) -> Self {
        Self { config }
    }

    /// Return `evaluations` with ancestors of incompatible fields demoted.
    ///
    /// Descendant status is read from the input map, so the outcome does not
    /// depend on visiting order.
    pub fn propagate<F: FieldFacts>(
        &self,
        tree: &FieldTree<F>,
        evaluations: &EvaluationMap,
        actions: &ActionMap,
    ) -> EvaluationMap {
        let mut updated = evaluations.clone();
        let mut demoted = 0usize;

        for id in tree.ids() {
            let path = tree.path(id);
            let Some(current) = evaluations.get(path) else {
                continue;
            };
            if current.mapping_status == MappingStatus::Incompatible {
                continue;
            }
            if actions.get(path).is_some_and(ActionInfo::is_manual) {
                continue;
            }

            let incompatible: Vec<(&str, &EvaluationResult)> = tree
                .descendants(id)
                .into_iter()
                .filter_map(|descendant| {
                    let child_path = tree.path(descendant);
                    evaluations
                        .get(child_path)
                        .filter(|result| result.mapping_status == MappingStatus::Incompatible)
                        .map(|result| (child_path, result))
                })
                .collect();
            if incompatible.is_empty() {
                continue;
            }

            let reason = self.inherited_reason(path, &incompatible);
            if let Some(result) = updated.get_mut(path) {
                demote(result, reason);
                demoted += 1;
            }
        }

        tracing::debug!("Propagation demoted {} fields", demoted);
        updated
    }

    fn inherited_reason(
        &self,
        path: &str,
        incompatible: &[(&str, &EvaluationResult)],
    ) -> EvaluationReason {
        let severity = if incompatible.iter().any(|(_, result)| result.has_errors) {
            Severity::Error
        } else {
            Severity::Warning
        };
        let listed: Vec<Value> = incompatible
            .iter()
            .take(self.config.max_listed_children)
            .map(|(child, _)| Value::from(*child))
            .collect();

        EvaluationReason::new(
            INHERITED_INCOMPATIBLE_FROM_CHILDREN,
            severity,
            "mapping.reason.parent.inherited_incompatible",
        )
        .with_detail("parent_field", path)
        .with_detail("incompatible_children_count", incompatible.len())
        .with_detail("incompatible_children", listed)
    }
}

fn demote(result: &mut EvaluationResult, reason: EvaluationReason) {
    let mut reasons = std::mem::take(&mut result.reasons);
    reasons.push(reason);
    let status = match result.status {
        EvaluationStatus::EvaluationFailed => EvaluationStatus::EvaluationFailed,
        _ => EvaluationStatus::ActionRequired,
    };
    *result = EvaluationResult::new(status, MappingStatus::Incompatible, reasons);
}
