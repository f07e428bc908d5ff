pub mod sqlite;

use std::collections::HashMap;

use crate::error::Result;
use crate::value::FilterValue;

/// Path-scoped session storage for resolved filter values.
///
/// The accumulator only needs two capabilities from the host's session
/// machinery: read a value for (path, field) and write one back. Keeping the
/// interface this narrow means the accumulator tests run without any web
/// framework in sight.
pub trait SessionStore {
    fn get(&self, path: &str, field: &str) -> Result<Option<FilterValue>>;
    fn set(&mut self, path: &str, field: &str, value: &FilterValue) -> Result<()>;
    fn remove(&mut self, path: &str, field: &str) -> Result<()>;
}

/// In-process store for hosts that already own session plumbing, and for
/// tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<(String, String), FilterValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, path: &str, field: &str) -> Result<Option<FilterValue>> {
        Ok(self
            .entries
            .get(&(path.to_string(), field.to_string()))
            .cloned())
    }

    fn set(&mut self, path: &str, field: &str, value: &FilterValue) -> Result<()> {
        self.entries
            .insert((path.to_string(), field.to_string()), value.clone());
        Ok(())
    }

    fn remove(&mut self, path: &str, field: &str) -> Result<()> {
        self.entries.remove(&(path.to_string(), field.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_is_path_scoped() {
        let mut store = MemoryStore::new();
        store
            .set("/users", "status", &FilterValue::Text("active".into()))
            .unwrap();
        store
            .set("/orders", "status", &FilterValue::Text("open".into()))
            .unwrap();

        assert_eq!(
            store.get("/users", "status").unwrap(),
            Some(FilterValue::Text("active".into()))
        );
        assert_eq!(
            store.get("/orders", "status").unwrap(),
            Some(FilterValue::Text("open".into()))
        );

        store.remove("/users", "status").unwrap();
        assert_eq!(store.get("/users", "status").unwrap(), None);
        assert_eq!(store.len(), 1);
    }
}
