use std::collections::BTreeMap;

/// Returns true if `key` is private to the alerting system, meaning it is
/// wrapped in double underscores (ex `__dashboardUid__`). Private keys are
/// never exposed to notification templates.
pub fn is_private_key(key: &str) -> bool {
    // A bare "__" is both prefixed and suffixed, and is private as well.
    key.starts_with("__") && key.ends_with("__")
}

/// KV is a set of label or annotation name/value pairs, ordered by name.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct KV(BTreeMap<String, String>);

impl KV {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Remove all private keys from the set.
    pub fn remove_private(mut self) -> Self {
        self.0.retain(|key, _| !is_private_key(key));
        self
    }

    /// Returns a copy of the set without any of the given `names`.
    pub fn remove<'n>(&self, names: impl IntoIterator<Item = &'n str>) -> Self {
        let mut out = self.clone();
        for name in names {
            out.0.remove(name);
        }
        out
    }

    /// Names of the set, in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    /// Values of the set, ordered by their corresponding names.
    pub fn values(&self) -> Vec<&str> {
        self.0.values().map(String::as_str).collect()
    }

    /// Name/value pairs of the set, sorted by name.
    pub fn sorted_pairs(&self) -> Vec<(&str, &str)> {
        self.iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KV {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a KV {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
