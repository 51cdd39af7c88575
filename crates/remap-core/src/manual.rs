//! Operator-authored manual entries and action parsing
//!
//! Manual entries are the only source of truth the engine consumes besides the
//! field snapshot. They arrive from the persistence layer in one of two shapes:
//!
//! ```json
//! { "Patient.identifier": { "action": "not_use", "remark": "no MRN in target" } }
//! ```
//!
//! or as a list of entries carrying their path under `name`:
//!
//! ```json
//! [ { "name": "Patient.identifier", "action": "not_use" } ]
//! ```
//!
//! Action values are normalized by [`parse_action`]. Entries whose action is
//! missing or unrecognized are dropped; only a document of the wrong overall
//! shape is an error.

use crate::error::RemapError;
use crate::model::{ActionKind, Recommendation};
use crate::result::Result;
use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Action tags written by older project files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyAction {
    Use,
    NotUse,
    Empty,
    Extension,
    Manual,
    CopyFrom,
    CopyTo,
    Fixed,
    MedicationService,
}

impl LegacyAction {
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "use" => LegacyAction::Use,
            "not_use" => LegacyAction::NotUse,
            "empty" => LegacyAction::Empty,
            "extension" => LegacyAction::Extension,
            "manual" => LegacyAction::Manual,
            "copy_from" => LegacyAction::CopyFrom,
            "copy_to" => LegacyAction::CopyTo,
            "fixed" => LegacyAction::Fixed,
            "medication_service" => LegacyAction::MedicationService,
            _ => return None,
        })
    }

    /// Current action for a legacy tag, `None` for retired actions
    fn upgrade(self) -> Option<ActionKind> {
        match self {
            LegacyAction::Use => Some(ActionKind::Use),
            LegacyAction::NotUse => Some(ActionKind::NotUse),
            LegacyAction::Empty => Some(ActionKind::Empty),
            LegacyAction::Extension => Some(ActionKind::Extension),
            LegacyAction::Manual => Some(ActionKind::Manual),
            LegacyAction::CopyFrom => Some(ActionKind::CopyValueFrom),
            LegacyAction::CopyTo => Some(ActionKind::CopyValueTo),
            LegacyAction::Fixed => Some(ActionKind::Fixed),
            LegacyAction::MedicationService => None,
        }
    }
}

/// An action value in any of its accepted representations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawAction<'a> {
    Text(&'a str),
    Legacy(LegacyAction),
    Current(ActionKind),
}

/// Normalize an action value. Returns `None` for anything unrecognized.
pub fn parse_action(raw: RawAction<'_>) -> Option<ActionKind> {
    match raw {
        RawAction::Current(kind) => Some(kind),
        RawAction::Legacy(legacy) => legacy.upgrade(),
        RawAction::Text(text) => {
            let tag = text.trim().to_ascii_lowercase();
            ActionKind::from_tag(&tag)
                .or_else(|| LegacyAction::from_tag(&tag).and_then(LegacyAction::upgrade))
        }
    }
}

/// One operator decision for one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManualEntry {
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl ManualEntry {
    pub fn new(action: ActionKind) -> Self {
        Self {
            action,
            other: None,
            fixed: None,
            remark: None,
        }
    }

    pub fn with_other(mut self, other: impl Into<String>) -> Self {
        self.other = Some(other.into());
        self
    }

    pub fn with_fixed(mut self, fixed: Value) -> Self {
        self.fixed = Some(fixed);
        self
    }

    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = Some(remark.into());
        self
    }

    /// Parse one entry object. `None` means the entry is not an operator
    /// decision and must be ignored.
    fn from_object(path: &str, object: &Map<String, Value>) -> Option<Self> {
        if object.get("auto_generated").and_then(Value::as_bool) == Some(true) {
            tracing::debug!("Ignoring auto-generated manual entry for '{}'", path);
            return None;
        }

        let action = match object.get("action") {
            Some(Value::String(text)) => parse_action(RawAction::Text(text)),
            _ => None,
        };
        let Some(action) = action else {
            tracing::debug!(
                "Skipping manual entry for '{}': unrecognized action {:?}",
                path,
                object.get("action")
            );
            return None;
        };

        let other = string_field(object, "other").or_else(|| string_field(object, "extra"));

        Some(Self {
            action,
            other,
            fixed: object.get("fixed").filter(|v| !v.is_null()).cloned(),
            remark: string_field(object, "remark"),
        })
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Sparse set of manual entries keyed by field path
///
/// Deserializing goes through [`ManualEntries::from_value`], so serde input
/// gets the same per-entry leniency as any other document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ManualEntries {
    entries: IndexMap<String, ManualEntry>,
}

impl<'de> Deserialize<'de> for ManualEntries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(de::Error::custom)
    }
}

impl ManualEntries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read entries from an untyped document (object keyed by path, or list
    /// of objects with `name`). `null` is treated as an empty set.
    pub fn from_value(value: &Value) -> Result<Self> {
        let mut entries = Self::new();
        match value {
            Value::Null => {}
            Value::Object(map) => {
                for (path, entry) in map {
                    let object = entry.as_object().ok_or_else(|| {
                        RemapError::malformed_manual_entries(format!(
                            "entry for '{path}' must be an object"
                        ))
                    })?;
                    entries.insert_parsed(path, object);
                }
            }
            Value::Array(items) => {
                for (idx, item) in items.iter().enumerate() {
                    let object = item.as_object().ok_or_else(|| {
                        RemapError::malformed_manual_entries(format!(
                            "entry #{idx} must be an object"
                        ))
                    })?;
                    let path = object.get("name").and_then(Value::as_str).ok_or_else(|| {
                        RemapError::malformed_manual_entries(format!(
                            "entry #{idx} is missing its 'name'"
                        ))
                    })?;
                    entries.insert_parsed(path, object);
                }
            }
            other => {
                return Err(RemapError::malformed_manual_entries(format!(
                    "expected an object or a list, found {}",
                    json_type_name(other)
                )));
            }
        }
        Ok(entries)
    }

    /// Decode a JSON document and read its entries
    pub fn from_json(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(&value)
    }

    /// Decode a YAML document and read its entries
    pub fn from_yaml(content: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(content)
            .map_err(|e| RemapError::serialization_error(e.to_string()))?;
        Self::from_value(&value)
    }

    fn insert_parsed(&mut self, path: &str, object: &Map<String, Value>) {
        if let Some(entry) = ManualEntry::from_object(path, object) {
            self.entries.insert(path.to_string(), entry);
        }
    }

    pub fn insert(&mut self, path: impl Into<String>, entry: ManualEntry) {
        self.entries.insert(path.into(), entry);
    }

    /// Promote a recommendation into an operator decision for `path`
    pub fn apply_recommendation(&mut self, path: impl Into<String>, recommendation: &Recommendation) {
        let Some(action) = recommendation.action else {
            return;
        };
        let entry = ManualEntry {
            action,
            other: recommendation.other_value.clone(),
            fixed: recommendation.fixed_value.clone(),
            remark: None,
        };
        self.insert(path, entry);
    }

    pub fn get(&self, path: &str) -> Option<&ManualEntry> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManualEntry)> {
        self.entries.iter().map(|(path, entry)| (path.as_str(), entry))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_action_representations() {
        assert_eq!(parse_action(RawAction::Text("use")), Some(ActionKind::Use));
        assert_eq!(parse_action(RawAction::Text(" NOT_USE ")), Some(ActionKind::NotUse));
        assert_eq!(
            parse_action(RawAction::Text("copy_from")),
            Some(ActionKind::CopyValueFrom)
        );
        assert_eq!(
            parse_action(RawAction::Legacy(LegacyAction::CopyTo)),
            Some(ActionKind::CopyValueTo)
        );
        assert_eq!(
            parse_action(RawAction::Current(ActionKind::CopyNodeTo)),
            Some(ActionKind::CopyNodeTo)
        );
    }

    #[test]
    fn test_parse_action_rejects_unknown() {
        assert_eq!(parse_action(RawAction::Text("medication_service")), None);
        assert_eq!(parse_action(RawAction::Text("frobnicate")), None);
        assert_eq!(parse_action(RawAction::Text("")), None);
    }

    #[test]
    fn test_from_object_shape() {
        let entries = ManualEntries::from_value(&json!({
            "Patient.identifier": { "action": "not_use", "remark": "dropped" },
            "Patient.name": { "action": "bogus" },
            "Patient.gender": { "action": "copy_from", "extra": "Patient.sex" },
            "Patient.birthDate": { "action": "use", "auto_generated": true }
        }))
        .unwrap();

        assert_eq!(entries.len(), 2);
        let identifier = entries.get("Patient.identifier").unwrap();
        assert_eq!(identifier.action, ActionKind::NotUse);
        assert_eq!(identifier.remark.as_deref(), Some("dropped"));

        let gender = entries.get("Patient.gender").unwrap();
        assert_eq!(gender.action, ActionKind::CopyValueFrom);
        assert_eq!(gender.other.as_deref(), Some("Patient.sex"));
        assert!(!entries.contains("Patient.name"));
    }

    #[test]
    fn test_from_list_shape() {
        let entries = ManualEntries::from_value(&json!([
            { "name": "Medication.extension:A", "action": "copy_node_to", "other": "Medication.extension:B" },
            { "name": "Medication.code", "action": "fixed", "fixed": "1234" }
        ]))
        .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries.get("Medication.code").unwrap().fixed,
            Some(json!("1234"))
        );
    }

    #[test]
    fn test_malformed_top_level_is_an_error() {
        let err = ManualEntries::from_value(&json!("not_use")).unwrap_err();
        assert!(matches!(err, RemapError::MalformedManualEntries { .. }));

        let err = ManualEntries::from_value(&json!({ "Patient.name": "use" })).unwrap_err();
        assert!(matches!(err, RemapError::MalformedManualEntries { .. }));

        let err = ManualEntries::from_value(&json!([{ "action": "use" }])).unwrap_err();
        assert!(err.to_string().contains("missing its 'name'"));
    }

    #[test]
    fn test_serde_goes_through_action_parser() {
        let entries: ManualEntries = serde_json::from_value(json!({
            "Patient.gender": { "action": "copy_from", "other": "Patient.sex" },
            "Patient.birthDate": { "action": "frobnicate" },
            "Patient.name": { "action": "use" }
        }))
        .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries.get("Patient.gender").unwrap().action,
            ActionKind::CopyValueFrom
        );
        assert!(!entries.contains("Patient.birthDate"));

        let err = serde_json::from_value::<ManualEntries>(json!(42)).unwrap_err();
        assert!(err.to_string().contains("Malformed manual entries"));
    }

    #[test]
    fn test_decode_documents() {
        let entries = ManualEntries::from_yaml(
            "Patient.identifier:\n  action: not_use\n  remark: no MRN in target\n",
        )
        .unwrap();
        assert_eq!(
            entries.get("Patient.identifier").unwrap().remark.as_deref(),
            Some("no MRN in target")
        );

        let err = ManualEntries::from_json("{ not json").unwrap_err();
        assert!(matches!(err, RemapError::SerializationError { .. }));
        let err = ManualEntries::from_yaml("a: [b").unwrap_err();
        assert!(matches!(err, RemapError::SerializationError { .. }));
    }

    #[test]
    fn test_null_is_empty() {
        assert!(ManualEntries::from_value(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_apply_recommendation() {
        let mut entries = ManualEntries::new();
        let recommendation = Recommendation::recommendation(ActionKind::CopyNodeTo)
            .with_other("Medication.extension:B.url");
        entries.apply_recommendation("Medication.extension:A.url", &recommendation);

        let entry = entries.get("Medication.extension:A.url").unwrap();
        assert_eq!(entry.action, ActionKind::CopyNodeTo);
        assert_eq!(entry.other.as_deref(), Some("Medication.extension:B.url"));
    }
}
