use serde::{Deserialize, Serialize};

/// Ordered set of identifiers: insertion order is kept and duplicates are
/// collapsed onto their first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<i64>", into = "Vec<i64>")]
pub struct IdSet(Vec<i64>);

impl IdSet {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns `false` when the id was already present.
    pub fn insert(&mut self, id: i64) -> bool {
        if self.0.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }
}

impl FromIterator<i64> for IdSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut set = IdSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<i64> for IdSet {
    fn extend<I: IntoIterator<Item = i64>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl From<Vec<i64>> for IdSet {
    fn from(ids: Vec<i64>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<IdSet> for Vec<i64> {
    fn from(set: IdSet) -> Self {
        set.0
    }
}

impl<'a> IntoIterator for &'a IdSet {
    type Item = i64;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, i64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

/// Authenticated user snapshot, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub enabled: bool,
    pub is_admin: bool,
    pub roles: IdSet,
    pub modules: IdSet,
    pub submodules: IdSet,
}
