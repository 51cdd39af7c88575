//! Recommendation engine
//!
//! Suggests actions for every field that has no manual decision. Producers run
//! in a fixed order and the first suggestion of each action kind wins:
//!
//! 1. compatible/warning fields: `use`, plus `use_recursive` for compatible
//!    subtrees that are fully compatible or solved
//! 2. copy actions mirrored from the closest ancestor holding a `copy_*` action
//! 3. `use` below an effective `use_recursive`
//! 4. `use`/`not_use` inherited from the closest ancestor holding one
//! 5. `not_use` for fields prohibited (`0..0`) in every source profile
//!
//! Suggestions outside a field's baseline allowed-action set are dropped.

use crate::config::RecommendationConfig;
use crate::evaluate::evaluate;
use crate::gate::all_descendants_compatible_or_solved;
use crate::model::{
    ActionInfo, ActionKind, ActionMap, Classification, EvaluationMap, FieldFacts, Recommendation,
    RecommendationMap,
};
use crate::path;
use crate::tree::{FieldId, FieldTree};
use serde_json::Value;
use std::collections::BTreeSet;

pub const COMPATIBLE_REMARK: &str =
    "Recommendation: Field is compatible, suggest using it directly";
pub const WARNING_REMARK: &str =
    "Recommendation: Field is compatible with warnings, review them before using it";
pub const SUBTREE_REMARK: &str = "Field and all descendants are compatible or solved; \
     you can safely use USE_RECURSIVE to keep the subtree.";
pub const IMPLICIT_TARGET_REMARK: &str = "Target field not explicitly defined in profile but \
     structurally valid (inherits from base type).";
pub const ZERO_CARDINALITY_REMARK: &str = "Field has cardinality 0..0 in all source profiles; \
     it cannot be used and should be marked as NOT_USE.";

/// Minimal path lookup needed to judge a mirrored copy partner
pub trait PathIndex {
    fn contains_path(&self, path: &str) -> bool;

    /// Slice or type-choice children of `path`
    fn slice_children_of(&self, path: &str) -> Vec<&str>;
}

impl<F: FieldFacts> PathIndex for FieldTree<F> {
    fn contains_path(&self, path: &str) -> bool {
        self.contains(path)
    }

    fn slice_children_of(&self, path: &str) -> Vec<&str> {
        self.slice_children(path)
    }
}

/// Outcome of a partner lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartnerMatch {
    /// The partner field is defined in the tree
    Explicit(String),
    /// Not defined, but accepted because slices inherit their base children
    Implicit(String),
    Missing,
}

/// Decides whether a structurally mirrored copy partner is acceptable
pub trait PartnerValidity {
    /// `source` is the descendant receiving the suggestion, `partner` the
    /// mirrored path on the other side.
    fn check<I: PathIndex + ?Sized>(&self, index: &I, source: &str, partner: &str)
    -> PartnerMatch;
}

/// Partner lookup with slice and choice-type fallbacks
///
/// Checks run in order: exact path, first `value[x]` type alternative,
/// equivalent child on the unsliced base element, source inside a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceFallbackValidity {
    pub polymorphic_value_fallback: bool,
    pub base_type_fallback: bool,
    pub implicit_slice_children: bool,
}

impl Default for SliceFallbackValidity {
    fn default() -> Self {
        Self {
            polymorphic_value_fallback: true,
            base_type_fallback: true,
            implicit_slice_children: true,
        }
    }
}

impl SliceFallbackValidity {
    pub fn from_config(config: &RecommendationConfig) -> Self {
        Self {
            polymorphic_value_fallback: config.polymorphic_value_fallback,
            base_type_fallback: config.base_type_fallback,
            implicit_slice_children: config.implicit_slice_children,
        }
    }

    fn choice_alternative<I: PathIndex + ?Sized>(index: &I, partner: &str) -> Option<String> {
        let marker = format!("value{}", path::CHOICE_MARKER);
        let end = partner.find(&marker)? + marker.len();
        let (element, rest) = partner.split_at(end);
        if rest.starts_with(path::SLICE_SEPARATOR) {
            return None;
        }
        index
            .slice_children_of(element)
            .into_iter()
            .map(|alternative| format!("{alternative}{rest}"))
            .find(|candidate| index.contains_path(candidate))
    }
}

impl PartnerValidity for SliceFallbackValidity {
    fn check<I: PathIndex + ?Sized>(
        &self,
        index: &I,
        source: &str,
        partner: &str,
    ) -> PartnerMatch {
        if index.contains_path(partner) {
            return PartnerMatch::Explicit(partner.to_string());
        }
        if self.polymorphic_value_fallback {
            if let Some(alternative) = Self::choice_alternative(index, partner) {
                return PartnerMatch::Explicit(alternative);
            }
        }
        if self.base_type_fallback
            && path::unsliced(partner).is_some_and(|base| index.contains_path(&base))
        {
            return PartnerMatch::Implicit(partner.to_string());
        }
        if self.implicit_slice_children && path::is_sliced(source) {
            return PartnerMatch::Implicit(partner.to_string());
        }
        PartnerMatch::Missing
    }
}

/// Computes non-binding suggestions
#[derive(Debug, Clone)]
pub struct RecommendationEngine<V = SliceFallbackValidity> {
    config: RecommendationConfig,
    validity: V,
}

impl RecommendationEngine<SliceFallbackValidity> {
    pub fn new(config: RecommendationConfig) -> Self {
        let validity = SliceFallbackValidity::from_config(&config);
        Self { config, validity }
    }
}

impl Default for RecommendationEngine<SliceFallbackValidity> {
    fn default() -> Self {
        Self::new(RecommendationConfig::default())
    }
}

impl<V: PartnerValidity> RecommendationEngine<V> {
    pub fn with_validity(config: RecommendationConfig, validity: V) -> Self {
        Self { config, validity }
    }

    /// Suggestions for every field without a manual action.
    ///
    /// `actions` is the resolved action map for the same tree; it tells which
    /// fields are manually decided and which ancestors carry copy actions.
    pub fn recommend<F: FieldFacts>(
        &self,
        tree: &FieldTree<F>,
        actions: &ActionMap,
    ) -> RecommendationMap {
        let evaluations = evaluate(tree, actions);
        let mut recommendations = RecommendationMap::new();

        for (id, field) in tree.iter() {
            if actions.get(field.path()).is_some_and(ActionInfo::is_manual) {
                continue;
            }

            let prohibited = self.config.zero_cardinality_not_use && prohibited_in_sources(tree, field);
            let mut suggestions = Vec::new();

            if !prohibited {
                self.compatible(tree, id, &evaluations, &mut suggestions);
                suggestions.extend(self.mirrored_copy(tree, id, actions));
                suggestions.extend(below_use_recursive(tree, id, actions));
                if self.config.inherit_use_not_use {
                    suggestions.extend(inherited_use_not_use(tree, id, actions));
                }
            } else {
                suggestions.push(
                    Recommendation::recommendation(ActionKind::NotUse)
                        .with_system_remark(ZERO_CARDINALITY_REMARK),
                );
            }

            let mut seen = BTreeSet::new();
            suggestions.retain(|suggestion| {
                suggestion
                    .action
                    .is_some_and(|action| field.allows(action) && seen.insert(action))
            });

            if !suggestions.is_empty() {
                recommendations.insert(field.path().to_string(), suggestions);
            }
        }

        tracing::debug!("Recommendations computed for {} fields", recommendations.len());
        recommendations
    }

    fn compatible<F: FieldFacts>(
        &self,
        tree: &FieldTree<F>,
        id: FieldId,
        evaluations: &EvaluationMap,
        out: &mut Vec<Recommendation>,
    ) {
        match tree.field(id).classification() {
            Classification::Compatible => {
                out.push(
                    Recommendation::recommendation(ActionKind::Use)
                        .with_system_remark(COMPATIBLE_REMARK),
                );
                if tree.has_descendants(id)
                    && all_descendants_compatible_or_solved(tree, id, evaluations)
                {
                    out.push(
                        Recommendation::recommendation(ActionKind::UseRecursive)
                            .with_system_remark(SUBTREE_REMARK),
                    );
                }
            }
            Classification::Warning => out.push(
                Recommendation::recommendation(ActionKind::Use).with_system_remark(WARNING_REMARK),
            ),
            Classification::Incompatible => {}
        }
    }

    /// Mirror the closest ancestor's copy action onto this field
    fn mirrored_copy<F: FieldFacts>(
        &self,
        tree: &FieldTree<F>,
        id: FieldId,
        actions: &ActionMap,
    ) -> Option<Recommendation> {
        let path = tree.path(id);
        if path::is_type_choice_selection(path) {
            return None;
        }

        let (origin, kind, partner) = tree.ancestors(id).find_map(|ancestor| {
            let origin = tree.path(ancestor);
            let info = actions.get(origin)?;
            let kind = info.action.filter(|kind| kind.is_copy())?;
            Some((origin, kind, info.other_value.as_deref()))
        })?;
        let partner = partner?;
        let mirrored = format!("{partner}{}", path::child_suffix(path, origin)?);

        let mut recommendation = match self.validity.check(tree, path, &mirrored) {
            PartnerMatch::Explicit(target) => Recommendation::recommendation(kind)
                .with_other(target)
                .with_system_remark(format!("Inherited recommendation from {origin}")),
            PartnerMatch::Implicit(target) => Recommendation::recommendation(kind)
                .with_other(target)
                .with_system_remark(format!("Inherited from {origin}."))
                .with_system_remark(IMPLICIT_TARGET_REMARK),
            PartnerMatch::Missing => {
                tracing::trace!("No partner '{}' for '{}'", mirrored, path);
                return None;
            }
        };
        recommendation.inherited_from = Some(origin.to_string());

        if self.config.copy_conflict_detection && kind == ActionKind::CopyValueTo {
            return check_copy_conflict(recommendation, actions);
        }
        Some(recommendation)
    }
}

/// A `copy_value_to` into a field that already has an action would clobber
/// it. Fixed targets turn the suggestion into `not_use`; any other action
/// drops it.
fn check_copy_conflict(recommendation: Recommendation, actions: &ActionMap) -> Option<Recommendation> {
    let partner = recommendation.other_value.as_deref()?;
    let Some(existing) = actions.get(partner).filter(|info| info.action.is_some()) else {
        return Some(recommendation);
    };

    if existing.action != Some(ActionKind::Fixed) {
        tracing::trace!("Dropping copy suggestion into '{}': target already decided", partner);
        return None;
    }

    let value = match &existing.fixed_value {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => "unset".to_string(),
    };
    let mut not_use = Recommendation::recommendation(ActionKind::NotUse)
        .with_system_remark(format!("Target field '{partner}' has a fixed value: {value}"));
    not_use.inherited_from = recommendation.inherited_from;
    Some(not_use)
}

fn below_use_recursive<F: FieldFacts>(
    tree: &FieldTree<F>,
    id: FieldId,
    actions: &ActionMap,
) -> Option<Recommendation> {
    let origin = tree.ancestors(id).map(|a| tree.path(a)).find(|ancestor| {
        actions
            .get(*ancestor)
            .is_some_and(|info| info.action == Some(ActionKind::UseRecursive))
    })?;
    Some(
        Recommendation::recommendation(ActionKind::Use)
            .with_system_remark(format!("Recommendation: Parent {origin} has USE_RECURSIVE")),
    )
}

fn inherited_use_not_use<F: FieldFacts>(
    tree: &FieldTree<F>,
    id: FieldId,
    actions: &ActionMap,
) -> Option<Recommendation> {
    tree.ancestors(id).find_map(|ancestor| {
        let origin = tree.path(ancestor);
        let action = actions
            .get(origin)?
            .action
            .filter(|action| matches!(action, ActionKind::Use | ActionKind::NotUse))?;
        Some(
            Recommendation::recommendation(action)
                .with_system_remark(format!("Inherited recommendation from {origin}")),
        )
    })
}

/// `true` if the field exists in at least one source profile and every
/// source profile declares it `0..0`
fn prohibited_in_sources<F: FieldFacts>(tree: &FieldTree<F>, field: &F) -> bool {
    let mut present = tree
        .keys()
        .sources
        .iter()
        .filter_map(|key| field.profile(key))
        .filter(|facts| facts.present)
        .peekable();
    present.peek().is_some() && present.all(|facts| facts.is_prohibited())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manual::{ManualEntries, ManualEntry};
    use crate::model::{MappingField, ProfileFacts};
    use crate::resolver::resolve;
    use crate::tree::ProfileKeys;

    fn field(path: &str, classification: Classification) -> MappingField {
        MappingField::new(path, classification)
    }

    fn build(fields: Vec<MappingField>) -> FieldTree<MappingField> {
        FieldTree::new(fields, ProfileKeys::new("target").with_sources(["source"])).unwrap()
    }

    fn run(tree: &FieldTree<MappingField>, manual: &ManualEntries) -> RecommendationMap {
        let actions = resolve(tree, manual);
        RecommendationEngine::default().recommend(tree, &actions)
    }

    fn kinds(recommendations: &RecommendationMap, path: &str) -> Vec<ActionKind> {
        recommendations
            .get(path)
            .map(|list| list.iter().filter_map(|r| r.action).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_compatible_and_warning_fields_get_use() {
        let tree = build(vec![
            field("Patient.name", Classification::Compatible),
            field("Patient.gender", Classification::Warning),
            field("Patient.photo", Classification::Incompatible),
        ]);
        let recs = run(&tree, &ManualEntries::new());

        assert_eq!(kinds(&recs, "Patient.name"), vec![ActionKind::Use]);
        assert_eq!(kinds(&recs, "Patient.gender"), vec![ActionKind::Use]);
        assert!(!recs.contains_key("Patient.photo"));
        assert!(recs["Patient.name"].iter().all(|r| r.auto_generated));
    }

    #[test]
    fn test_use_recursive_offered_for_clean_subtree() {
        let tree = build(vec![
            field("Patient.name", Classification::Compatible),
            field("Patient.name.given", Classification::Compatible),
            field("Patient.address", Classification::Compatible),
            field("Patient.address.line", Classification::Incompatible),
        ]);
        let recs = run(&tree, &ManualEntries::new());

        assert_eq!(
            kinds(&recs, "Patient.name"),
            vec![ActionKind::Use, ActionKind::UseRecursive]
        );
        assert_eq!(kinds(&recs, "Patient.address"), vec![ActionKind::Use]);
        assert_eq!(kinds(&recs, "Patient.name.given"), vec![ActionKind::Use]);
    }

    #[test]
    fn test_manual_fields_are_excluded() {
        let tree = build(vec![field("Patient.name", Classification::Compatible)]);
        let mut manual = ManualEntries::new();
        manual.insert("Patient.name", ManualEntry::new(ActionKind::Use));

        assert!(run(&tree, &manual).is_empty());
    }

    #[test]
    fn test_allowed_set_filters_recommendations() {
        let tree = build(vec![
            field("Patient.name", Classification::Compatible)
                .with_actions_allowed([ActionKind::NotUse, ActionKind::Manual]),
        ]);
        assert!(run(&tree, &ManualEntries::new()).is_empty());
    }

    #[test]
    fn test_copy_recommendations_mirror_partner() {
        let tree = build(vec![
            field("Medication.extension:A", Classification::Incompatible),
            field("Medication.extension:A.url", Classification::Incompatible),
            field("Medication.extension:A.value[x]", Classification::Incompatible),
            field("Medication.extension:B", Classification::Incompatible),
            field("Medication.extension:B.url", Classification::Incompatible),
            field("Medication.extension:B.value[x]", Classification::Incompatible),
        ]);
        let mut manual = ManualEntries::new();
        manual.insert(
            "Medication.extension:A",
            ManualEntry::new(ActionKind::CopyNodeTo).with_other("Medication.extension:B"),
        );

        let recs = run(&tree, &manual);
        let url = &recs["Medication.extension:A.url"][0];
        assert_eq!(url.action, Some(ActionKind::CopyNodeTo));
        assert_eq!(url.other_value.as_deref(), Some("Medication.extension:B.url"));
        assert_eq!(
            url.system_remarks,
            vec!["Inherited recommendation from Medication.extension:A"]
        );

        let from = &recs["Medication.extension:B.url"][0];
        assert_eq!(from.action, Some(ActionKind::CopyNodeFrom));
        assert_eq!(from.other_value.as_deref(), Some("Medication.extension:A.url"));

        assert!(!recs.contains_key("Medication.extension:A"));
        assert!(!recs.contains_key("Medication.extension:B"));
    }

    #[test]
    fn test_type_choice_selection_skips_copy() {
        let tree = build(vec![
            field("Observation.value[x]", Classification::Incompatible),
            field("Observation.value[x]:valueQuantity", Classification::Compatible),
            field("Observation.component.value[x]", Classification::Incompatible),
        ]);
        let mut manual = ManualEntries::new();
        manual.insert(
            "Observation.value[x]",
            ManualEntry::new(ActionKind::CopyValueTo)
                .with_other("Observation.component.value[x]"),
        );

        let recs = run(&tree, &manual);
        assert_eq!(
            kinds(&recs, "Observation.value[x]:valueQuantity"),
            vec![ActionKind::Use]
        );
    }

    #[test]
    fn test_implicit_partner_is_flagged() {
        let tree = build(vec![
            field("Practitioner.identifier:LANR", Classification::Incompatible),
            field("Practitioner.identifier:LANR.system", Classification::Incompatible),
            field("Practitioner.identifier", Classification::Incompatible),
            field("Practitioner.identifier.system", Classification::Incompatible),
            field("Practitioner.identifier:ANR", Classification::Incompatible),
        ]);
        let mut manual = ManualEntries::new();
        manual.insert(
            "Practitioner.identifier:LANR",
            ManualEntry::new(ActionKind::CopyNodeTo).with_other("Practitioner.identifier:ANR"),
        );

        let recs = run(&tree, &manual);
        let system = &recs["Practitioner.identifier:LANR.system"][0];
        assert_eq!(
            system.other_value.as_deref(),
            Some("Practitioner.identifier:ANR.system")
        );
        assert_eq!(
            system.system_remarks[0],
            "Inherited from Practitioner.identifier:LANR."
        );
        assert!(system.system_remarks.iter().any(|r| r.contains("not explicitly defined")));
        assert!(system.system_remarks.iter().any(|r| r.contains("structurally valid")));
    }

    #[test]
    fn test_polymorphic_partner_fallback() {
        let index = build(vec![
            field("Extension.value[x]", Classification::Incompatible),
            field("Extension.value[x]:valueCoding", Classification::Incompatible),
            field("Extension.value[x]:valueCoding.code", Classification::Incompatible),
        ]);
        let validity = SliceFallbackValidity::default();

        assert_eq!(
            validity.check(&index, "Other.value[x].code", "Extension.value[x].code"),
            PartnerMatch::Explicit("Extension.value[x]:valueCoding.code".to_string())
        );
    }

    #[test]
    fn test_validity_fallbacks_can_be_disabled() {
        let index = build(vec![
            field("Practitioner.identifier", Classification::Incompatible),
            field("Practitioner.identifier.system", Classification::Incompatible),
        ]);
        let strict = SliceFallbackValidity {
            polymorphic_value_fallback: false,
            base_type_fallback: false,
            implicit_slice_children: false,
        };

        assert_eq!(
            strict.check(&index, "A:x.system", "Practitioner.identifier:ANR.system"),
            PartnerMatch::Missing
        );
        assert_eq!(
            SliceFallbackValidity::default().check(
                &index,
                "A.system",
                "Practitioner.identifier:ANR.system"
            ),
            PartnerMatch::Implicit("Practitioner.identifier:ANR.system".to_string())
        );
    }

    #[test]
    fn test_copy_value_to_conflicts_with_fixed_target() {
        let mut fixed_target = ProfileFacts::default();
        fixed_target
            .fixed
            .insert(crate::model::FixedValueKind::Uri, Value::from("http://example.org/ns"));
        let tree = build(vec![
            field("Patient.identifier:a", Classification::Incompatible),
            field("Patient.identifier:a.system", Classification::Incompatible),
            field("Patient.identifier:a.value", Classification::Incompatible),
            field("Patient.identifier:b", Classification::Incompatible),
            field("Patient.identifier:b.system", Classification::Incompatible)
                .with_profile("target", fixed_target),
            field("Patient.identifier:b.value", Classification::Incompatible),
        ]);
        let mut manual = ManualEntries::new();
        manual.insert(
            "Patient.identifier:a",
            ManualEntry::new(ActionKind::CopyValueTo).with_other("Patient.identifier:b"),
        );

        let recs = run(&tree, &manual);
        let system = &recs["Patient.identifier:a.system"][0];
        assert_eq!(system.action, Some(ActionKind::NotUse));
        assert_eq!(
            system.system_remark(),
            Some("Target field 'Patient.identifier:b.system' has a fixed value: http://example.org/ns")
        );
        assert_eq!(
            kinds(&recs, "Patient.identifier:a.value"),
            vec![ActionKind::CopyValueTo]
        );
    }

    #[test]
    fn test_inherited_use_not_use() {
        let tree = build(vec![
            field("Patient.contact", Classification::Incompatible),
            field("Patient.contact.name", Classification::Incompatible),
            field("Patient.contact.name.text", Classification::Incompatible),
        ]);
        let mut manual = ManualEntries::new();
        manual.insert("Patient.contact", ManualEntry::new(ActionKind::NotUse));

        let recs = run(&tree, &manual);
        let text = &recs["Patient.contact.name.text"][0];
        assert_eq!(text.action, Some(ActionKind::NotUse));
        assert_eq!(
            text.system_remark(),
            Some("Inherited recommendation from Patient.contact.name")
        );
    }

    #[test]
    fn test_zero_cardinality_recommends_not_use() {
        let prohibited = ProfileFacts {
            min: 0,
            max: Some("0".into()),
            ..ProfileFacts::default()
        };
        let tree = build(vec![
            field("Patient.photo", Classification::Compatible).with_profile("source", prohibited),
        ]);

        let recs = run(&tree, &ManualEntries::new());
        assert_eq!(kinds(&recs, "Patient.photo"), vec![ActionKind::NotUse]);
        assert_eq!(recs["Patient.photo"][0].system_remark(), Some(ZERO_CARDINALITY_REMARK));
    }

    #[test]
    fn test_zero_cardinality_field_gets_no_copy() {
        let prohibited = ProfileFacts {
            min: 0,
            max: Some("0".into()),
            ..ProfileFacts::default()
        };
        let tree = build(vec![
            field("Medication.extension:A", Classification::Incompatible),
            field("Medication.extension:A.url", Classification::Incompatible),
            field("Medication.extension:A.id", Classification::Incompatible)
                .with_profile("source", prohibited),
            field("Medication.extension:B", Classification::Incompatible),
            field("Medication.extension:B.url", Classification::Incompatible),
            field("Medication.extension:B.id", Classification::Incompatible),
        ]);
        let mut manual = ManualEntries::new();
        manual.insert(
            "Medication.extension:A",
            ManualEntry::new(ActionKind::CopyNodeTo).with_other("Medication.extension:B"),
        );

        let recs = run(&tree, &manual);
        assert_eq!(
            kinds(&recs, "Medication.extension:A.id"),
            vec![ActionKind::NotUse]
        );
        assert_eq!(
            kinds(&recs, "Medication.extension:A.url"),
            vec![ActionKind::CopyNodeTo]
        );
    }

    struct ExactOnly;

    impl PartnerValidity for ExactOnly {
        fn check<I: PathIndex + ?Sized>(
            &self,
            index: &I,
            _source: &str,
            partner: &str,
        ) -> PartnerMatch {
            if index.contains_path(partner) {
                PartnerMatch::Explicit(partner.to_string())
            } else {
                PartnerMatch::Missing
            }
        }
    }

    #[test]
    fn test_custom_partner_validity() {
        let tree = build(vec![
            field("Practitioner.identifier:LANR", Classification::Incompatible),
            field("Practitioner.identifier:LANR.system", Classification::Incompatible),
            field("Practitioner.identifier:LANR.value", Classification::Incompatible),
            field("Practitioner.identifier:ANR", Classification::Incompatible),
            field("Practitioner.identifier:ANR.value", Classification::Incompatible),
        ]);
        let mut manual = ManualEntries::new();
        manual.insert(
            "Practitioner.identifier:LANR",
            ManualEntry::new(ActionKind::CopyNodeTo).with_other("Practitioner.identifier:ANR"),
        );
        let actions = resolve(&tree, &manual);

        let recs = RecommendationEngine::with_validity(RecommendationConfig::default(), ExactOnly)
            .recommend(&tree, &actions);
        assert!(!recs.contains_key("Practitioner.identifier:LANR.system"));
        assert_eq!(
            kinds(&recs, "Practitioner.identifier:LANR.value"),
            vec![ActionKind::CopyNodeTo]
        );

        let lenient = RecommendationEngine::default().recommend(&tree, &actions);
        assert_eq!(
            kinds(&lenient, "Practitioner.identifier:LANR.system"),
            vec![ActionKind::CopyNodeTo]
        );
    }
}
