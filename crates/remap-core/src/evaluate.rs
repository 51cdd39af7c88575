//! Per-field evaluation
//!
//! Rules are checked top to bottom and the first match decides:
//!
//! | condition                                   | status            | mapping status |
//! |---------------------------------------------|-------------------|----------------|
//! | no action info                              | `evaluation_failed` | `incompatible` |
//! | required target, `not_use` or `empty`       | `action_required` | `incompatible` |
//! | required target, `extension`                | `resolved`        | `solved`       |
//! | `use`/`use_recursive`                       | by classification |                |
//! | undecided                                   | by classification |                |
//! | any other explicit action                   | `resolved`        | `solved`       |

use crate::model::{
    ActionInfo, ActionKind, ActionMap, Classification, EvaluationMap, EvaluationReason,
    EvaluationResult, EvaluationStatus, FieldFacts, MappingStatus, Severity,
};
use crate::tree::{FieldId, FieldTree};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const MISSING_ACTION_INFO: &str = "MISSING_ACTION_INFO";
pub const TARGET_MIN_GT_SOURCE_MIN: &str = "TARGET_MIN_GT_SOURCE_MIN";
pub const CLASSIFICATION_WARNING: &str = "CLASSIFICATION_WARNING";
pub const USE_ON_INCOMPATIBLE: &str = "USE_ON_INCOMPATIBLE";
pub const ACTION_REQUIRED: &str = "ACTION_REQUIRED";
pub const ACTION_APPLIED: &str = "ACTION_APPLIED";
pub const FIXED_VALUE_MISSING: &str = "FIXED_VALUE_MISSING";
pub const COPY_PARTNER_MISSING: &str = "COPY_PARTNER_MISSING";
pub const COPY_PARTNER_UNKNOWN: &str = "COPY_PARTNER_UNKNOWN";
pub const MANUAL_REMARK_MISSING: &str = "MANUAL_REMARK_MISSING";

/// Evaluate every field of the tree against its effective action
pub fn evaluate<F: FieldFacts>(tree: &FieldTree<F>, actions: &ActionMap) -> EvaluationMap {
    let mut evaluations: EvaluationMap = IndexMap::with_capacity(tree.len());
    for id in tree.ids() {
        let path = tree.path(id);
        evaluations.insert(path.to_string(), evaluate_field(tree, id, actions.get(path)));
    }
    evaluations
}

/// Evaluate one field
pub fn evaluate_field<F: FieldFacts>(
    tree: &FieldTree<F>,
    id: FieldId,
    info: Option<&ActionInfo>,
) -> EvaluationResult {
    let field = tree.field(id);
    let path = field.path();

    let Some(info) = info else {
        return EvaluationResult::new(
            EvaluationStatus::EvaluationFailed,
            MappingStatus::Incompatible,
            vec![
                EvaluationReason::new(
                    MISSING_ACTION_INFO,
                    Severity::Error,
                    "mapping.reason.missing_action",
                )
                .with_detail("field", path),
            ],
        );
    };

    let action = info.action;
    let classification = field.classification();

    if field.is_target_required() {
        match action {
            Some(kind @ (ActionKind::NotUse | ActionKind::Empty)) => {
                return EvaluationResult::new(
                    EvaluationStatus::ActionRequired,
                    MappingStatus::Incompatible,
                    vec![
                        EvaluationReason::new(
                            TARGET_MIN_GT_SOURCE_MIN,
                            Severity::Warning,
                            &format!("mapping.reason.target_required.{kind}"),
                        )
                        .with_detail("field", path)
                        .with_action(action),
                    ],
                );
            }
            Some(ActionKind::Extension) => {
                return EvaluationResult::new(
                    EvaluationStatus::Resolved,
                    MappingStatus::Solved,
                    vec![
                        EvaluationReason::new(
                            TARGET_MIN_GT_SOURCE_MIN,
                            Severity::Info,
                            "mapping.reason.target_required.resolved_by_extension",
                        )
                        .with_detail("field", path)
                        .with_action(action),
                    ],
                );
            }
            _ => {}
        }
    }

    match action {
        Some(ActionKind::Use | ActionKind::UseRecursive) => evaluate_use(path, classification, action),
        None => evaluate_undecided(path, classification, field.is_target_required()),
        Some(kind) => evaluate_explicit(tree, path, kind, info),
    }
}

fn evaluate_use(
    path: &str,
    classification: Classification,
    action: Option<ActionKind>,
) -> EvaluationResult {
    match classification {
        Classification::Compatible => {
            EvaluationResult::new(EvaluationStatus::Ok, MappingStatus::Compatible, Vec::new())
        }
        Classification::Warning => EvaluationResult::new(
            EvaluationStatus::Ok,
            MappingStatus::Warning,
            vec![
                EvaluationReason::new(
                    CLASSIFICATION_WARNING,
                    Severity::Warning,
                    "mapping.reason.classification.warning",
                )
                .with_detail("field", path)
                .with_action(action),
            ],
        ),
        Classification::Incompatible => EvaluationResult::new(
            EvaluationStatus::ActionRequired,
            MappingStatus::Incompatible,
            vec![
                EvaluationReason::new(
                    USE_ON_INCOMPATIBLE,
                    Severity::Error,
                    "mapping.reason.use.incompatible",
                )
                .with_detail("field", path)
                .with_action(action),
            ],
        ),
    }
}

fn evaluate_undecided(path: &str, classification: Classification, required: bool) -> EvaluationResult {
    match classification {
        Classification::Compatible => {
            EvaluationResult::new(EvaluationStatus::Ok, MappingStatus::Compatible, Vec::new())
        }
        Classification::Warning => EvaluationResult::new(
            EvaluationStatus::ActionRequired,
            MappingStatus::Warning,
            vec![
                EvaluationReason::new(
                    CLASSIFICATION_WARNING,
                    Severity::Warning,
                    "mapping.reason.classification.warning",
                )
                .with_detail("field", path),
            ],
        ),
        Classification::Incompatible => {
            let message_key = if required {
                "mapping.reason.target_required.no_action"
            } else {
                "mapping.reason.incompatible.no_action"
            };
            EvaluationResult::new(
                EvaluationStatus::ActionRequired,
                MappingStatus::Incompatible,
                vec![
                    EvaluationReason::new(ACTION_REQUIRED, Severity::Error, message_key)
                        .with_detail("field", path)
                        .with_detail("target_required", required),
                ],
            )
        }
    }
}

/// Explicit non-`use` decision: resolved, with an info reason naming the
/// action and warnings for incomplete parameters.
fn evaluate_explicit<F: FieldFacts>(
    tree: &FieldTree<F>,
    path: &str,
    kind: ActionKind,
    info: &ActionInfo,
) -> EvaluationResult {
    let mut reasons = vec![
        EvaluationReason::new(
            ACTION_APPLIED,
            Severity::Info,
            &format!("mapping.reason.action.{kind}"),
        )
        .with_detail("field", path)
        .with_action(Some(kind)),
    ];

    let mut warn = |code: &str, key: &str| {
        reasons.push(
            EvaluationReason::new(code, Severity::Warning, key)
                .with_detail("field", path)
                .with_action(Some(kind)),
        );
    };

    match kind {
        ActionKind::Fixed if info.fixed_value.is_none() => {
            warn(FIXED_VALUE_MISSING, "mapping.reason.fixed.missing_value");
        }
        ActionKind::Manual if info.user_remark.is_none() => {
            warn(MANUAL_REMARK_MISSING, "mapping.reason.manual.missing_remark");
        }
        kind if kind.is_copy() => match info.other_value.as_deref() {
            None => warn(COPY_PARTNER_MISSING, "mapping.reason.copy.missing_partner"),
            Some(partner) if !tree.contains(partner) => {
                warn(COPY_PARTNER_UNKNOWN, "mapping.reason.copy.unknown_partner");
            }
            Some(_) => {}
        },
        _ => {}
    }

    EvaluationResult::new(EvaluationStatus::Resolved, MappingStatus::Solved, reasons)
}

/// Field counts per mapping status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub total: usize,
    pub compatible: usize,
    pub warning: usize,
    pub solved: usize,
    pub incompatible: usize,
}

impl StatusSummary {
    pub fn from_evaluations(evaluations: &EvaluationMap) -> Self {
        let mut summary = Self {
            total: evaluations.len(),
            ..Self::default()
        };
        for result in evaluations.values() {
            match result.mapping_status {
                MappingStatus::Compatible => summary.compatible += 1,
                MappingStatus::Warning => summary.warning += 1,
                MappingStatus::Solved => summary.solved += 1,
                MappingStatus::Incompatible => summary.incompatible += 1,
            }
        }
        summary
    }

    /// Share of fields that need no further work, 0-100
    pub fn completion_percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.compatible + self.solved) as f64 / self.total as f64 * 100.0
    }
}
