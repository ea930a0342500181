//! Book of descriptors
//!
//! Insertion-ordered id→descriptor mapping with immutable insert,
//! glob lookup, merge and a key-compatibility predicate. Equality is
//! key-set equality with per-descriptor comparison; ordering is
//! observable through iteration, not through `==`.

use indexmap::IndexMap;

use tessera_errors::{Result, TessError};
use tessera_model::{merge_descriptors, Descriptor};

/// Ordered catalog of descriptors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Book {
    content: IndexMap<String, Descriptor>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.content.contains_key(id)
    }

    /// Insert a descriptor under an id
    ///
    /// The catalog is immutable-insert: an id can be bound once.
    pub fn set(&mut self, id: impl Into<String>, descriptor: Descriptor) -> Result<()> {
        let id = id.into();
        if self.content.contains_key(&id) {
            return Err(TessError::DuplicateObject { id });
        }
        self.content.insert(id, descriptor);
        Ok(())
    }

    /// Exact-key lookup
    pub fn get(&self, id: &str) -> Result<&Descriptor> {
        self.content
            .get(id)
            .ok_or_else(|| TessError::ObjectNotFound { id: id.to_string() })
    }

    /// In-place access for catalog-internal updates (dataset membership)
    pub(crate) fn get_mut(&mut self, id: &str) -> Result<&mut Descriptor> {
        self.content
            .get_mut(id)
            .ok_or_else(|| TessError::ObjectNotFound { id: id.to_string() })
    }

    /// Glob lookup over ids, case-sensitive
    ///
    /// Returns the values whose id matches the pattern, in insertion
    /// order. An exact key is a valid pattern without wildcards.
    pub fn find_glob(&self, pattern: &str) -> Result<Vec<&Descriptor>> {
        let matcher = glob::Pattern::new(pattern).map_err(|_| TessError::InvalidKey {
            key: pattern.to_string(),
            reason: "not a valid glob pattern",
        })?;
        Ok(self
            .content
            .iter()
            .filter(|(id, _)| matcher.matches(id))
            .map(|(_, v)| v)
            .collect())
    }

    /// Ids in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.content.keys().map(|k| k.as_str())
    }

    /// Descriptors in insertion order
    pub fn values(&self) -> impl Iterator<Item = &Descriptor> {
        self.content.values()
    }

    /// (id, descriptor) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Descriptor)> {
        self.content.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Combine two books into a new one
    ///
    /// The result holds the union of keys: entries only on one side
    /// are copied through; entries on both sides merge field-wise
    /// (left-biased scalars, repeated sub-lists concatenated).
    /// Commutative on disjoint key-sets.
    pub fn merge(&self, other: &Book) -> Book {
        let mut content = IndexMap::new();
        for (id, left) in &self.content {
            let value = match other.content.get(id) {
                Some(right) => merge_descriptors(left, right),
                None => left.clone(),
            };
            content.insert(id.clone(), value);
        }
        for (id, right) in &other.content {
            if !content.contains_key(id) {
                content.insert(id.clone(), right.clone());
            }
        }
        Book { content }
    }

    /// Whether both books hold exactly the same key set
    pub fn compatible(&self, other: &Book) -> bool {
        self.content.len() == other.content.len()
            && self.content.keys().all(|k| other.content.contains_key(k))
    }
}
