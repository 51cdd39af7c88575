//! Field tree built once per recompute
//!
//! Fields arrive as a flat list keyed by path. [`FieldTree`] links them into an
//! arena so that child and descendant lookups never rescan every path.
//! A field whose parent path is missing from the snapshot is attached to its
//! nearest existing ancestor.

use crate::error::RemapError;
use crate::model::{FieldFacts, MappingField};
use crate::path;
use crate::result::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Index of a field inside a [`FieldTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(usize);

/// Which per-profile fact sets describe the target and the sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileKeys {
    pub target: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl ProfileKeys {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            sources: Vec::new(),
        }
    }

    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone)]
struct Node<F> {
    field: F,
    parent: Option<FieldId>,
    children: Vec<FieldId>,
    depth: usize,
}

/// Arena of fields keyed by path
#[derive(Debug, Clone)]
pub struct FieldTree<F> {
    nodes: Vec<Node<F>>,
    index: HashMap<String, FieldId>,
    keys: ProfileKeys,
}

impl<F: FieldFacts> FieldTree<F> {
    /// Build the tree. Field order is preserved for every derived map.
    pub fn new(fields: impl IntoIterator<Item = F>, keys: ProfileKeys) -> Result<Self> {
        let mut nodes = Vec::new();
        let mut index = HashMap::new();

        for field in fields {
            let id = FieldId(nodes.len());
            if index.insert(field.path().to_string(), id).is_some() {
                return Err(RemapError::duplicate_field(field.path()));
            }
            nodes.push(Node {
                depth: path::depth(field.path()),
                field,
                parent: None,
                children: Vec::new(),
            });
        }

        let links: Vec<(usize, FieldId)> = nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, node)| {
                let mut cursor = path::parent(node.field.path());
                while let Some(candidate) = cursor {
                    if let Some(&parent) = index.get(candidate) {
                        return Some((idx, parent));
                    }
                    cursor = path::parent(candidate);
                }
                None
            })
            .collect();

        for (idx, parent) in links {
            nodes[idx].parent = Some(parent);
            nodes[parent.0].children.push(FieldId(idx));
        }

        tracing::debug!("Built field tree with {} fields", nodes.len());
        Ok(Self { nodes, index, keys })
    }

    pub fn keys(&self) -> &ProfileKeys {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn id(&self, path: &str) -> Option<FieldId> {
        self.index.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&F> {
        self.id(path).map(|id| self.field(id))
    }

    pub fn field(&self, id: FieldId) -> &F {
        &self.nodes[id.0].field
    }

    pub fn path(&self, id: FieldId) -> &str {
        self.nodes[id.0].field.path()
    }

    pub fn depth(&self, id: FieldId) -> usize {
        self.nodes[id.0].depth
    }

    /// All field ids in snapshot order
    pub fn ids(&self) -> impl Iterator<Item = FieldId> + '_ {
        (0..self.nodes.len()).map(FieldId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &F)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (FieldId(idx), &node.field))
    }

    pub fn parent(&self, id: FieldId) -> Option<FieldId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: FieldId) -> &[FieldId] {
        &self.nodes[id.0].children
    }

    /// Children exactly one path level below `id`
    pub fn direct_children(&self, id: FieldId) -> impl Iterator<Item = FieldId> + '_ {
        let depth = self.depth(id) + 1;
        self.children(id)
            .iter()
            .copied()
            .filter(move |child| self.depth(*child) == depth)
    }

    pub fn has_descendants(&self, id: FieldId) -> bool {
        !self.nodes[id.0].children.is_empty()
    }

    /// All descendants, pre-order
    pub fn descendants(&self, id: FieldId) -> Vec<FieldId> {
        let mut out = Vec::new();
        let mut stack: Vec<FieldId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Ancestors, nearest first
    pub fn ancestors(&self, id: FieldId) -> impl Iterator<Item = FieldId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    pub fn is_ancestor_of(&self, ancestor: FieldId, id: FieldId) -> bool {
        self.ancestors(id).any(|candidate| candidate == ancestor)
    }

    /// Ancestor paths from the root down to the immediate parent
    pub fn parent_chain(&self, path: &str) -> Vec<&str> {
        let Some(id) = self.id(path) else {
            return Vec::new();
        };
        let mut chain: Vec<&str> = self.ancestors(id).map(|a| self.path(a)).collect();
        chain.reverse();
        chain
    }

    pub fn roots(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.ids().filter(|id| self.parent(*id).is_none())
    }

    pub fn fields_by_depth(&self) -> BTreeMap<usize, Vec<&str>> {
        let mut levels: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for id in self.ids() {
            levels.entry(self.depth(id)).or_default().push(self.path(id));
        }
        levels
    }

    /// Paths of the slice or type-choice children of `path`
    pub fn slice_children(&self, path: &str) -> Vec<&str> {
        let Some(id) = self.id(path) else {
            return Vec::new();
        };
        self.children(id)
            .iter()
            .map(|child| self.path(*child))
            .filter(|child| {
                path::child_suffix(child, path)
                    .is_some_and(|suffix| suffix.starts_with(path::SLICE_SEPARATOR))
            })
            .collect()
    }
}

/// Field snapshot as produced by the comparison step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub target_key: String,
    #[serde(default)]
    pub source_keys: Vec<String>,
    pub fields: Vec<MappingField>,
}

impl Snapshot {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| RemapError::malformed_snapshot(e.to_string()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| RemapError::malformed_snapshot(e.to_string()))
    }

    /// Link the snapshot into a tree. Without explicit source keys, every
    /// profile key other than the target counts as a source.
    pub fn into_tree(self) -> Result<FieldTree<MappingField>> {
        let mut sources = self.source_keys;
        if sources.is_empty() {
            for field in &self.fields {
                for key in field.profiles.keys() {
                    if *key != self.target_key && !sources.contains(key) {
                        sources.push(key.clone());
                    }
                }
            }
        }
        let keys = ProfileKeys::new(self.target_key).with_sources(sources);
        FieldTree::new(self.fields, keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Classification;

    fn tree(paths: &[&str]) -> FieldTree<MappingField> {
        let fields = paths
            .iter()
            .map(|p| MappingField::new(*p, Classification::Compatible));
        FieldTree::new(fields, ProfileKeys::new("target")).unwrap()
    }

    #[test]
    fn test_children_and_descendants() {
        let tree = tree(&[
            "Patient",
            "Patient.identifier",
            "Patient.identifier.system",
            "Patient.identifier.type",
            "Patient.identifier.type.coding",
            "Patient.name",
        ]);
        let identifier = tree.id("Patient.identifier").unwrap();

        let children: Vec<&str> = tree.children(identifier).iter().map(|c| tree.path(*c)).collect();
        assert_eq!(children, vec!["Patient.identifier.system", "Patient.identifier.type"]);

        let descendants: Vec<&str> = tree
            .descendants(identifier)
            .into_iter()
            .map(|c| tree.path(c))
            .collect();
        assert_eq!(
            descendants,
            vec![
                "Patient.identifier.system",
                "Patient.identifier.type",
                "Patient.identifier.type.coding"
            ]
        );
    }

    #[test]
    fn test_slices_are_children_of_their_base() {
        let tree = tree(&[
            "Medication.extension",
            "Medication.extension:A",
            "Medication.extension:A.url",
        ]);
        let ext = tree.id("Medication.extension").unwrap();
        let slice = tree.id("Medication.extension:A").unwrap();
        assert_eq!(tree.parent(slice), Some(ext));
        assert!(tree.is_ancestor_of(ext, tree.id("Medication.extension:A.url").unwrap()));
        assert_eq!(tree.slice_children("Medication.extension"), vec!["Medication.extension:A"]);
    }

    #[test]
    fn test_gap_attaches_to_nearest_ancestor() {
        let tree = tree(&["Patient", "Patient.contact.name"]);
        let root = tree.id("Patient").unwrap();
        let name = tree.id("Patient.contact.name").unwrap();

        assert_eq!(tree.parent(name), Some(root));
        assert_eq!(tree.direct_children(root).count(), 0);
        assert_eq!(tree.descendants(root), vec![name]);
    }

    #[test]
    fn test_duplicate_paths_are_rejected() {
        let fields = vec![
            MappingField::new("Patient.name", Classification::Compatible),
            MappingField::new("Patient.name", Classification::Warning),
        ];
        let err = FieldTree::new(fields, ProfileKeys::new("target")).unwrap_err();
        assert!(matches!(err, RemapError::DuplicateField { .. }));
    }

    #[test]
    fn test_hierarchy_helpers() {
        let tree = tree(&["Patient", "Patient.name", "Patient.name.given", "Observation"]);

        assert_eq!(tree.parent_chain("Patient.name.given"), vec!["Patient", "Patient.name"]);
        assert_eq!(tree.roots().count(), 2);

        let levels = tree.fields_by_depth();
        assert_eq!(levels[&0], vec!["Patient", "Observation"]);
        assert_eq!(levels[&2], vec!["Patient.name.given"]);
    }

    #[test]
    fn test_snapshot_derives_source_keys() {
        let snapshot = Snapshot::from_json(
            r#"{
                "targetKey": "kbv",
                "fields": [
                    { "name": "Patient", "classification": "compatible",
                      "profiles": { "epa": {}, "kbv": {} } }
                ]
            }"#,
        )
        .unwrap();
        let tree = snapshot.into_tree().unwrap();
        assert_eq!(tree.keys().target, "kbv");
        assert_eq!(tree.keys().sources, vec!["epa".to_string()]);
    }

    #[test]
    fn test_malformed_snapshot() {
        let err = Snapshot::from_json(r#"{ "fields": 3 }"#).unwrap_err();
        assert!(matches!(err, RemapError::MalformedSnapshot { .. }));
    }
}
