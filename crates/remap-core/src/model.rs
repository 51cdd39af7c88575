//! Domain model for mapping actions and evaluation
//!
//! Everything in here is plain data: the field facts handed in by the
//! comparison step, and the derived action/evaluation records produced on
//! every recompute.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Effective action per field path, in field order
pub type ActionMap = IndexMap<String, ActionInfo>;

/// Recommendations per field path; fields without suggestions are absent
pub type RecommendationMap = IndexMap<String, Vec<Recommendation>>;

/// Evaluation per field path
pub type EvaluationMap = IndexMap<String, EvaluationResult>;

/// Legal action kinds per field path
pub type AllowedActionMap = IndexMap<String, BTreeSet<ActionKind>>;

/// Closed set of mapping actions an operator (or the engine) can apply to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Keep the value as is
    Use,
    /// Keep the value and every descendant
    UseRecursive,
    /// Drop the value
    NotUse,
    /// Leave the target empty, no source information available
    Empty,
    /// Set a literal value
    Fixed,
    /// Free-text implementation instructions in the remark
    Manual,
    /// Carry the value in an extension
    Extension,
    CopyValueFrom,
    CopyValueTo,
    CopyNodeFrom,
    CopyNodeTo,
}

impl ActionKind {
    pub const ALL: [ActionKind; 11] = [
        ActionKind::Use,
        ActionKind::UseRecursive,
        ActionKind::NotUse,
        ActionKind::Empty,
        ActionKind::Fixed,
        ActionKind::Manual,
        ActionKind::Extension,
        ActionKind::CopyValueFrom,
        ActionKind::CopyValueTo,
        ActionKind::CopyNodeFrom,
        ActionKind::CopyNodeTo,
    ];

    /// Canonical wire tag
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Use => "use",
            ActionKind::UseRecursive => "use_recursive",
            ActionKind::NotUse => "not_use",
            ActionKind::Empty => "empty",
            ActionKind::Fixed => "fixed",
            ActionKind::Manual => "manual",
            ActionKind::Extension => "extension",
            ActionKind::CopyValueFrom => "copy_value_from",
            ActionKind::CopyValueTo => "copy_value_to",
            ActionKind::CopyNodeFrom => "copy_node_from",
            ActionKind::CopyNodeTo => "copy_node_to",
        }
    }

    /// Look up a canonical tag. Legacy aliases are handled by
    /// [`crate::manual::parse_action`], which is the only ingestion path.
    pub(crate) fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// `copy_*` actions carry a partner path
    pub fn is_copy(self) -> bool {
        matches!(
            self,
            ActionKind::CopyValueFrom
                | ActionKind::CopyValueTo
                | ActionKind::CopyNodeFrom
                | ActionKind::CopyNodeTo
        )
    }

    /// The action installed on the partner of a copy action
    pub fn copy_counterpart(self) -> Option<Self> {
        match self {
            ActionKind::CopyValueFrom => Some(ActionKind::CopyValueTo),
            ActionKind::CopyValueTo => Some(ActionKind::CopyValueFrom),
            ActionKind::CopyNodeFrom => Some(ActionKind::CopyNodeTo),
            ActionKind::CopyNodeTo => Some(ActionKind::CopyNodeFrom),
            _ => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Origin of an effective action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSource {
    Manual,
    Inherited,
    SystemDefault,
}

/// Precomputed compatibility label produced by the structural comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Compatible,
    Warning,
    Incompatible,
}

/// Fixed-value kinds, declared in lookup priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FixedValueKind {
    #[serde(rename = "fixedUri")]
    Uri,
    #[serde(rename = "fixedUrl")]
    Url,
    #[serde(rename = "fixedCanonical")]
    Canonical,
    #[serde(rename = "fixedString")]
    String,
    #[serde(rename = "fixedCode")]
    Code,
    #[serde(rename = "fixedOid")]
    Oid,
    #[serde(rename = "fixedId")]
    Id,
    #[serde(rename = "fixedUuid")]
    Uuid,
    #[serde(rename = "fixedInteger")]
    Integer,
    #[serde(rename = "fixedDecimal")]
    Decimal,
    #[serde(rename = "fixedBoolean")]
    Boolean,
    #[serde(rename = "fixedDate")]
    Date,
    #[serde(rename = "fixedDateTime")]
    DateTime,
    #[serde(rename = "fixedTime")]
    Time,
    #[serde(rename = "fixedInstant")]
    Instant,
}

fn default_present() -> bool {
    true
}

/// Facts about one field within one profile (source or target)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFacts {
    #[serde(default = "default_present")]
    pub present: bool,
    #[serde(default)]
    pub min: u32,
    /// Maximum cardinality, `"*"` for unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Literal fixed values keyed by kind; lookup order is the kind order
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fixed: BTreeMap<FixedValueKind, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_coding_system: Option<String>,
}

impl Default for ProfileFacts {
    fn default() -> Self {
        Self {
            present: default_present(),
            min: 0,
            max: None,
            type_name: None,
            fixed: BTreeMap::new(),
            pattern_coding_system: None,
        }
    }
}

impl ProfileFacts {
    /// First fixed value present, in kind priority order
    pub fn fixed_value(&self) -> Option<(FixedValueKind, &Value)> {
        self.fixed
            .iter()
            .find(|(_, value)| !value.is_null())
            .map(|(kind, value)| (*kind, value))
    }

    /// Cardinality `0..0`: the element is prohibited in this profile
    pub fn is_prohibited(&self) -> bool {
        self.min == 0 && self.max.as_deref() == Some("0")
    }
}

/// Read-only view over one field as supplied by the comparison step.
///
/// Any adapter over real comparison output implements this; tests use
/// [`MappingField`] directly.
pub trait FieldFacts {
    fn path(&self) -> &str;
    fn classification(&self) -> Classification;
    fn is_target_required(&self) -> bool;
    fn profile(&self, key: &str) -> Option<&ProfileFacts>;
    /// Baseline allowed-action set, `None` when unrestricted
    fn actions_allowed(&self) -> Option<&BTreeSet<ActionKind>>;

    /// `true` if the baseline set permits `action`
    fn allows(&self, action: ActionKind) -> bool {
        self.actions_allowed()
            .is_none_or(|allowed| allowed.contains(&action))
    }
}

/// Concrete field record, the shape the comparison step serializes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingField {
    pub name: String,
    pub classification: Classification,
    #[serde(default)]
    pub is_target_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions_allowed: Option<BTreeSet<ActionKind>>,
    #[serde(default)]
    pub profiles: IndexMap<String, ProfileFacts>,
}

impl MappingField {
    pub fn new(name: impl Into<String>, classification: Classification) -> Self {
        Self {
            name: name.into(),
            classification,
            is_target_required: false,
            actions_allowed: None,
            profiles: IndexMap::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.is_target_required = true;
        self
    }

    pub fn with_profile(mut self, key: impl Into<String>, facts: ProfileFacts) -> Self {
        self.profiles.insert(key.into(), facts);
        self
    }

    pub fn with_actions_allowed(mut self, actions: impl IntoIterator<Item = ActionKind>) -> Self {
        self.actions_allowed = Some(actions.into_iter().collect());
        self
    }
}

impl FieldFacts for MappingField {
    fn path(&self) -> &str {
        &self.name
    }

    fn classification(&self) -> Classification {
        self.classification
    }

    fn is_target_required(&self) -> bool {
        self.is_target_required
    }

    fn profile(&self, key: &str) -> Option<&ProfileFacts> {
        self.profiles.get(key)
    }

    fn actions_allowed(&self) -> Option<&BTreeSet<ActionKind>> {
        self.actions_allowed.as_ref()
    }
}

/// Effective action for one field, with provenance
///
/// `action == None` means no decision has been made yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionInfo {
    pub action: Option<ActionKind>,
    pub source: ActionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_remark: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub system_remarks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<String>,
    pub auto_generated: bool,
}

/// A suggested action. Never installed as the effective action.
pub type Recommendation = ActionInfo;

impl ActionInfo {
    fn bare(action: Option<ActionKind>, source: ActionSource) -> Self {
        Self {
            action,
            source,
            other_value: None,
            fixed_value: None,
            user_remark: None,
            system_remarks: Vec::new(),
            inherited_from: None,
            auto_generated: source != ActionSource::Manual,
        }
    }

    /// Operator decision (or one derived from an operator decision)
    pub fn manual(action: ActionKind) -> Self {
        Self::bare(Some(action), ActionSource::Manual)
    }

    /// No action decided yet
    pub fn undecided() -> Self {
        Self::bare(None, ActionSource::SystemDefault)
    }

    /// Engine-chosen default, e.g. an auto-detected fixed value
    pub fn system_default(action: ActionKind) -> Self {
        Self::bare(Some(action), ActionSource::SystemDefault)
    }

    /// Action cascaded from a manual decision on `ancestor`
    pub fn inherited(action: ActionKind, ancestor: impl Into<String>) -> Self {
        let mut info = Self::bare(Some(action), ActionSource::Inherited);
        info.inherited_from = Some(ancestor.into());
        info
    }

    /// Suggested action
    pub fn recommendation(action: ActionKind) -> Recommendation {
        Self::system_default(action)
    }

    pub fn with_other(mut self, other: impl Into<String>) -> Self {
        self.other_value = Some(other.into());
        self
    }

    pub fn with_fixed(mut self, value: Value) -> Self {
        self.fixed_value = Some(value);
        self
    }

    pub fn with_optional_other(mut self, other: Option<String>) -> Self {
        self.other_value = other;
        self
    }

    pub fn with_optional_fixed(mut self, value: Option<Value>) -> Self {
        self.fixed_value = value;
        self
    }

    pub fn with_user_remark(mut self, remark: Option<String>) -> Self {
        self.user_remark = remark;
        self
    }

    pub fn with_system_remark(mut self, remark: impl Into<String>) -> Self {
        self.system_remarks.push(remark.into());
        self
    }

    /// First system remark, if any
    pub fn system_remark(&self) -> Option<&str> {
        self.system_remarks.first().map(String::as_str)
    }

    /// The field carries an operator decision
    pub fn is_manual(&self) -> bool {
        self.source == ActionSource::Manual && self.action.is_some()
    }
}

/// Overall evaluation outcome for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Ok,
    Resolved,
    ActionRequired,
    EvaluationFailed,
}

impl EvaluationStatus {
    pub fn summary_key(self) -> &'static str {
        match self {
            EvaluationStatus::Ok => "mapping.status.ok",
            EvaluationStatus::Resolved => "mapping.status.resolved",
            EvaluationStatus::ActionRequired => "mapping.status.action_required",
            EvaluationStatus::EvaluationFailed => "mapping.status.evaluation_failed",
        }
    }
}

/// Resolved-state label surfaced to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingStatus {
    Compatible,
    Solved,
    Warning,
    Incompatible,
}

/// Severity of one evaluation reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Structured reason attached to an evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReason {
    pub code: String,
    pub severity: Severity,
    pub message_key: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub details: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_action: Option<ActionKind>,
}

impl EvaluationReason {
    pub fn new(code: &str, severity: Severity, message_key: &str) -> Self {
        Self {
            code: code.to_string(),
            severity,
            message_key: message_key.to_string(),
            details: IndexMap::new(),
            related_action: None,
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn with_action(mut self, action: Option<ActionKind>) -> Self {
        self.related_action = action;
        self
    }
}

/// Aggregated evaluation state for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub status: EvaluationStatus,
    pub mapping_status: MappingStatus,
    #[serde(default)]
    pub reasons: Vec<EvaluationReason>,
    pub has_warnings: bool,
    pub has_errors: bool,
    pub summary_key: String,
}

impl EvaluationResult {
    /// Build a result, deriving the warning/error flags from `reasons`
    pub fn new(
        status: EvaluationStatus,
        mapping_status: MappingStatus,
        reasons: Vec<EvaluationReason>,
    ) -> Self {
        let has_warnings = reasons.iter().any(|r| r.severity == Severity::Warning);
        let has_errors = reasons.iter().any(|r| r.severity == Severity::Error);
        Self {
            status,
            mapping_status,
            reasons,
            has_warnings,
            has_errors,
            summary_key: status.summary_key().to_string(),
        }
    }

    pub fn has_reason(&self, code: &str) -> bool {
        self.reasons.iter().any(|r| r.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_copy_counterparts_are_symmetric() {
        for kind in ActionKind::ALL {
            if let Some(counterpart) = kind.copy_counterpart() {
                assert!(kind.is_copy());
                assert_eq!(counterpart.copy_counterpart(), Some(kind));
            } else {
                assert!(!kind.is_copy());
            }
        }
    }

    #[test]
    fn test_fixed_value_priority_order() {
        let mut facts = ProfileFacts::default();
        facts.fixed.insert(FixedValueKind::Code, json!("final"));
        facts.fixed.insert(FixedValueKind::Uri, json!("http://example.org"));

        let (kind, value) = facts.fixed_value().unwrap();
        assert_eq!(kind, FixedValueKind::Uri);
        assert_eq!(value, &json!("http://example.org"));
    }

    #[test]
    fn test_default_profile_facts_match_serde_defaults() {
        let built = ProfileFacts::default();
        let decoded: ProfileFacts = serde_json::from_value(json!({})).unwrap();

        assert!(built.present);
        assert_eq!(built, decoded);
    }

    #[test]
    fn test_profile_facts_deserialize_fixed_keys() {
        let facts: ProfileFacts = serde_json::from_value(json!({
            "min": 1,
            "max": "1",
            "fixed": { "fixedCode": "active" },
            "patternCodingSystem": "http://loinc.org"
        }))
        .unwrap();

        assert!(facts.present);
        assert_eq!(facts.fixed_value().map(|(k, _)| k), Some(FixedValueKind::Code));
        assert_eq!(facts.pattern_coding_system.as_deref(), Some("http://loinc.org"));
    }

    #[test]
    fn test_auto_generated_follows_source() {
        assert!(!ActionInfo::manual(ActionKind::Use).auto_generated);
        assert!(ActionInfo::undecided().auto_generated);
        assert!(ActionInfo::inherited(ActionKind::NotUse, "A").auto_generated);
        assert!(ActionInfo::system_default(ActionKind::Fixed).auto_generated);
    }

    #[test]
    fn test_evaluation_result_flags() {
        let result = EvaluationResult::new(
            EvaluationStatus::ActionRequired,
            MappingStatus::Incompatible,
            vec![EvaluationReason::new("X", Severity::Warning, "x")],
        );
        assert!(result.has_warnings);
        assert!(!result.has_errors);
        assert_eq!(result.summary_key, "mapping.status.action_required");
    }
}
