//! Hierarchical grouping engine
//!
//! Partitions any collection by one or more keys, optionally reducing each
//! terminal group. Nothing here knows about SPC records; elements only need
//! [`FieldAccess`] when grouped by field name.
//!
//! ```
//! use serde_json::json;
//! use spcgen::core::grouping::{group_by_with, KeySpec};
//!
//! let items = vec![json!({"fab": "a"}), json!({"fab": "b"}), json!({"fab": "a"})];
//! let counts = group_by_with(items, &KeySpec::field("fab"), |g| g.len()).unwrap();
//! assert_eq!(counts["a"], 2);
//! assert_eq!(counts["b"], 1);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::trace;

/// Single-level grouping result
pub type Groups<V> = BTreeMap<String, V>;

/// Multi-level grouping result
pub type NestedGroups<V> = BTreeMap<String, GroupNode<V>>;

/// Errors raised while grouping
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GroupError {
    #[error("Missing group key '{key}' for element at index {index}")]
    MissingKey { key: String, index: usize },
}

/// Resolve a named field of an element to a group key
pub trait FieldAccess {
    /// Key text for `name`, or `None` when the element has no such field
    fn field(&self, name: &str) -> Option<String>;
}

impl<T: FieldAccess + ?Sized> FieldAccess for &T {
    fn field(&self, name: &str) -> Option<String> {
        (**self).field(name)
    }
}

/// Object properties; `null` and non-objects count as missing
impl FieldAccess for serde_json::Value {
    fn field(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl FieldAccess for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl FieldAccess for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// How a key was specified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Property lookup through [`FieldAccess`]
    Field,
    /// Caller-supplied extraction function
    Extractor,
}

/// One grouping level: a field name or an extraction function
pub struct KeySpec<'a, T> {
    name: String,
    kind: KeyKind,
    extract: Box<dyn Fn(&T) -> Option<String> + 'a>,
}

impl<'a, T: FieldAccess + 'a> KeySpec<'a, T> {
    /// Group by a named field
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        let field = name.clone();
        Self {
            name,
            kind: KeyKind::Field,
            extract: Box::new(move |item: &T| item.field(&field)),
        }
    }
}

impl<'a, T> KeySpec<'a, T> {
    /// Group by the result of `extract`; `name` labels the level in errors
    ///
    /// Returning `None` marks the key as missing for that element.
    pub fn with(name: impl Into<String>, extract: impl Fn(&T) -> Option<String> + 'a) -> Self {
        Self {
            name: name.into(),
            kind: KeyKind::Extractor,
            extract: Box::new(extract),
        }
    }

    /// Label of this key
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this key is a field lookup or an extractor
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    fn key_of(&self, item: &T) -> Option<String> {
        (self.extract)(item)
    }
}

impl<T> fmt::Debug for KeySpec<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A node of a multi-level grouping
///
/// Serializes untagged, so JSON output is plain nested objects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GroupNode<V> {
    /// Deepest level: the group's elements or its reduced value
    Leaf(V),
    /// Intermediate level keyed by the next grouping key
    Branch(NestedGroups<V>),
}

impl<V> GroupNode<V> {
    /// The leaf value, if this is a leaf
    pub fn leaf(&self) -> Option<&V> {
        match self {
            GroupNode::Leaf(v) => Some(v),
            GroupNode::Branch(_) => None,
        }
    }

    /// The child groups, if this is a branch
    pub fn branch(&self) -> Option<&NestedGroups<V>> {
        match self {
            GroupNode::Leaf(_) => None,
            GroupNode::Branch(children) => Some(children),
        }
    }

    /// Take the leaf value
    pub fn into_leaf(self) -> Option<V> {
        match self {
            GroupNode::Leaf(v) => Some(v),
            GroupNode::Branch(_) => None,
        }
    }

    /// Number of grouping levels below and including this node
    pub fn depth(&self) -> usize {
        match self {
            GroupNode::Leaf(_) => 1,
            GroupNode::Branch(children) => {
                1 + children.values().map(|c| c.depth()).max().unwrap_or(0)
            }
        }
    }
}

/// What to do with elements whose key cannot be resolved
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MissingKey {
    /// Fail with [`GroupError::MissingKey`]
    #[default]
    Reject,
    /// Collect such elements under the given sentinel key
    Bucket(String),
}

/// Grouping entry point with an explicit missing-key policy
#[derive(Debug, Clone, Default)]
pub struct Grouper {
    missing: MissingKey,
}

impl Grouper {
    /// Grouper that rejects missing keys
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the missing-key policy
    pub fn missing_key(mut self, policy: MissingKey) -> Self {
        self.missing = policy;
        self
    }

    fn resolve_key<T>(
        &self,
        key: &KeySpec<'_, T>,
        item: &T,
        index: usize,
    ) -> Result<String, GroupError> {
        match (key.key_of(item), &self.missing) {
            (Some(k), _) => Ok(k),
            (None, MissingKey::Bucket(sentinel)) => Ok(sentinel.clone()),
            (None, MissingKey::Reject) => Err(GroupError::MissingKey {
                key: key.name().to_string(),
                index,
            }),
        }
    }

    /// Group elements by a single key
    ///
    /// Every element lands in exactly one group; input order is kept within a group.
    pub fn by<T, I>(&self, items: I, key: &KeySpec<'_, T>) -> Result<Groups<Vec<T>>, GroupError>
    where
        I: IntoIterator<Item = T>,
    {
        Ok(self
            .partition(items.into_iter().enumerate(), key)?
            .into_iter()
            .map(|(k, group)| (k, without_positions(group)))
            .collect())
    }

    /// Partition position-tagged elements; positions refer to the caller's collection
    fn partition<T, I>(
        &self,
        items: I,
        key: &KeySpec<'_, T>,
    ) -> Result<Groups<Vec<(usize, T)>>, GroupError>
    where
        I: IntoIterator<Item = (usize, T)>,
    {
        let mut groups: Groups<Vec<(usize, T)>> = BTreeMap::new();
        for (index, item) in items {
            let k = self.resolve_key(key, &item, index)?;
            groups.entry(k).or_default().push((index, item));
        }
        trace!(key = key.name(), groups = groups.len(), "grouped");
        Ok(groups)
    }

    /// Group by a single key and reduce each group
    pub fn by_with<T, I, R, F>(
        &self,
        items: I,
        key: &KeySpec<'_, T>,
        reducer: F,
    ) -> Result<Groups<R>, GroupError>
    where
        I: IntoIterator<Item = T>,
        F: Fn(Vec<T>) -> R,
    {
        Ok(self
            .by(items, key)?
            .into_iter()
            .map(|(k, group)| (k, reducer(group)))
            .collect())
    }

    /// Group by a sequence of keys, nesting one level per key
    ///
    /// An empty key slice yields an empty result.
    pub fn by_multi<T, I>(
        &self,
        items: I,
        keys: &[KeySpec<'_, T>],
    ) -> Result<NestedGroups<Vec<T>>, GroupError>
    where
        I: IntoIterator<Item = T>,
    {
        self.by_multi_with(items, keys, |group| group)
    }

    /// Group by a sequence of keys, reducing only the deepest groups
    pub fn by_multi_with<T, I, R, F>(
        &self,
        items: I,
        keys: &[KeySpec<'_, T>],
        reducer: F,
    ) -> Result<NestedGroups<R>, GroupError>
    where
        I: IntoIterator<Item = T>,
        F: Fn(Vec<T>) -> R,
    {
        if keys.is_empty() {
            return Ok(BTreeMap::new());
        }
        self.nest(items.into_iter().enumerate().collect(), keys, &reducer)
    }

    fn nest<T, R, F>(
        &self,
        items: Vec<(usize, T)>,
        keys: &[KeySpec<'_, T>],
        reducer: &F,
    ) -> Result<NestedGroups<R>, GroupError>
    where
        F: Fn(Vec<T>) -> R,
    {
        match keys {
            [] => Ok(BTreeMap::new()),
            [last] => Ok(self
                .partition(items, last)?
                .into_iter()
                .map(|(k, group)| (k, GroupNode::Leaf(reducer(without_positions(group)))))
                .collect()),
            [first, rest @ ..] => {
                let mut nested = BTreeMap::new();
                for (k, group) in self.partition(items, first)? {
                    nested.insert(k, GroupNode::Branch(self.nest(group, rest, reducer)?));
                }
                Ok(nested)
            }
        }
    }
}

fn without_positions<T>(group: Vec<(usize, T)>) -> Vec<T> {
    group.into_iter().map(|(_, item)| item).collect()
}

/// Group by a single key, rejecting missing keys
pub fn group_by<T, I>(items: I, key: &KeySpec<'_, T>) -> Result<Groups<Vec<T>>, GroupError>
where
    I: IntoIterator<Item = T>,
{
    Grouper::default().by(items, key)
}

/// Group by a single key and reduce each group, rejecting missing keys
pub fn group_by_with<T, I, R, F>(
    items: I,
    key: &KeySpec<'_, T>,
    reducer: F,
) -> Result<Groups<R>, GroupError>
where
    I: IntoIterator<Item = T>,
    F: Fn(Vec<T>) -> R,
{
    Grouper::default().by_with(items, key, reducer)
}

/// Group by several keys, rejecting missing keys
pub fn group_by_multi<T, I>(
    items: I,
    keys: &[KeySpec<'_, T>],
) -> Result<NestedGroups<Vec<T>>, GroupError>
where
    I: IntoIterator<Item = T>,
{
    Grouper::default().by_multi(items, keys)
}

/// Group by several keys and reduce the deepest groups, rejecting missing keys
pub fn group_by_multi_with<T, I, R, F>(
    items: I,
    keys: &[KeySpec<'_, T>],
    reducer: F,
) -> Result<NestedGroups<R>, GroupError>
where
    I: IntoIterator<Item = T>,
    F: Fn(Vec<T>) -> R,
{
    Grouper::default().by_multi_with(items, keys, reducer)
}

/// Concatenate all leaf groups depth-first in key order
pub fn flatten_groups<T>(nested: NestedGroups<Vec<T>>) -> Vec<T> {
    let mut out = Vec::new();
    for node in nested.into_values() {
        flatten_node(node, &mut out);
    }
    out
}

fn flatten_node<T>(node: GroupNode<Vec<T>>, out: &mut Vec<T>) {
    match node {
        GroupNode::Leaf(items) => out.extend(items),
        GroupNode::Branch(children) => {
            for child in children.into_values() {
                flatten_node(child, out);
            }
        }
    }
}
