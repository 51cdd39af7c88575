//! Field path helpers.
//!
//! Paths are dotted element paths as found in FHIR StructureDefinitions, e.g.
//! `Patient.identifier.system`. Two separators introduce a new tree level:
//!
//! - `.` for a structural child (`Patient.identifier` → `Patient.identifier.system`)
//! - `:` for a slice or type-choice selection (`Medication.extension` →
//!   `Medication.extension:A`, `Observation.value[x]` → `Observation.value[x]:valueQuantity`)
//!
//! # Example
//!
//! ```
//! use remap_core::path;
//!
//! assert_eq!(path::parent("Medication.extension:A.url"), Some("Medication.extension:A"));
//! assert_eq!(path::parent("Medication.extension:A"), Some("Medication.extension"));
//! assert_eq!(path::depth("Medication.extension:A.url"), 3);
//! assert!(path::is_descendant_of("Medication.extension:A.url", "Medication.extension"));
//! ```

/// Marker for polymorphic choice elements (`value[x]`).
pub const CHOICE_MARKER: &str = "[x]";

/// Separator between a base element and one of its slices or type choices.
pub const SLICE_SEPARATOR: char = ':';

/// Separator between structural path segments.
pub const SEGMENT_SEPARATOR: char = '.';

fn is_separator(c: char) -> bool {
    c == SEGMENT_SEPARATOR || c == SLICE_SEPARATOR
}

fn last_separator(path: &str) -> Option<usize> {
    path.rfind(is_separator)
}

/// Number of tree levels below the root segment.
pub fn depth(path: &str) -> usize {
    path.chars().filter(|c| is_separator(*c)).count()
}

/// Parent path: everything before the last `.` or `:`.
pub fn parent(path: &str) -> Option<&str> {
    last_separator(path).map(|idx| &path[..idx])
}

/// `true` if `path` lies strictly below `ancestor`.
pub fn is_descendant_of(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path[ancestor.len()..].starts_with(is_separator)
}

/// Suffix of `path` relative to `ancestor`, including the leading separator.
///
/// Returns `None` when `path` is not a descendant of `ancestor`.
pub fn child_suffix<'a>(path: &'a str, ancestor: &str) -> Option<&'a str> {
    is_descendant_of(path, ancestor).then(|| &path[ancestor.len()..])
}

/// `true` if any segment of the path selects a slice or type choice.
pub fn is_sliced(path: &str) -> bool {
    path.contains(SLICE_SEPARATOR)
}

/// Equivalent path on the unsliced base element.
///
/// The innermost slice name is dropped while the remaining segments are
/// kept: `Medication.extension:B.url` → `Medication.extension.url`.
pub fn unsliced(path: &str) -> Option<String> {
    let start = path.rfind(SLICE_SEPARATOR)?;
    let end = path[start..]
        .find(SEGMENT_SEPARATOR)
        .map_or(path.len(), |offset| start + offset);
    Some(format!("{}{}", &path[..start], &path[end..]))
}

/// `true` if the path is a `.system` child, the target of pattern-coding
/// systems declared on its parent Coding.
pub fn is_system_element(path: &str) -> bool {
    path.ends_with(".system")
}

/// `true` if the field is a concrete type alternative of a choice element,
/// e.g. `Observation.value[x]:valueQuantity`.
///
/// Such fields are type implementations, not structural children, and never
/// mirror copy relationships of their choice parent.
pub fn is_type_choice_selection(path: &str) -> bool {
    let Some(idx) = last_separator(path) else {
        return false;
    };
    if !path[idx..].starts_with(SLICE_SEPARATOR) {
        return false;
    }
    let base = &path[..idx];
    let variant = &path[idx + 1..];
    base.ends_with(CHOICE_MARKER) || variant.starts_with("value")
}
