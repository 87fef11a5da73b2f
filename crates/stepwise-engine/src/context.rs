//! The mutable state threaded through every task of a run.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Key/value state shared by every task of a run and returned as the run's result.
///
/// `SharedContext` is a cheap handle: clones refer to the same entries, so a task
/// may keep a clone inside spawned work and write to it after its task function
/// returned. Only one task runs at a time, so the inner lock is never contended;
/// it exists to make the handle `Send`.
///
/// Guards are never handed out, so holding context data across an `.await` is
/// always done on owned copies.
#[derive(Debug, Clone, Default)]
pub struct SharedContext {
    entries: Arc<Mutex<BTreeMap<String, Value>>>,
}

impl SharedContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite an entry, returning the previous value.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries().insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries().get(key).cloned()
    }

    /// Returns the entry as a string if it holds one.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.entries().get(key) {
            Some(Value::String(value)) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.entries().remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Copy of all entries, ordered by key.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.entries().clone()
    }

    /// All entries as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.entries().clone().into_iter().collect())
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        // A panic inside a task never leaves the map half-written: every
        // access is a single map operation.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Serialize for SharedContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clones_share_entries() {
        let context = SharedContext::new();
        let handle = context.clone();

        handle.insert("artifact", "dist/app.js");

        assert_eq!(context.get_str("artifact").as_deref(), Some("dist/app.js"));
        assert_eq!(context.len(), 1);
    }

    #[test]
    fn test_insert_overwrites_and_returns_previous() {
        let context = SharedContext::new();

        assert_eq!(context.insert("count", 1), None);
        assert_eq!(context.insert("count", 2), Some(json!(1)));
        assert_eq!(context.get("count"), Some(json!(2)));
        assert_eq!(context.get_str("count"), None);
    }

    #[test]
    fn test_remove_and_empty() {
        let context = SharedContext::new();
        assert!(context.is_empty());

        context.insert("k", "v");
        assert!(context.contains_key("k"));
        assert_eq!(context.remove("k"), Some(json!("v")));
        assert!(context.is_empty());
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let context = SharedContext::new();
        context.insert("zeta", true);
        context.insert("alpha", json!({"files": 3}));

        let rendered = serde_json::to_string(&context).unwrap();
        assert_eq!(rendered, r#"{"alpha":{"files":3},"zeta":true}"#);
        assert_eq!(context.to_json(), json!({"alpha": {"files": 3}, "zeta": true}));
    }
}
