use serde_json::Value;
use std::collections::HashMap;

/// Value of one record column as seen by the synchronizer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ColumnValue {
    #[default]
    Null,
    /// Raw JSON text as read from (or written to) storage.
    Text(String),
    /// Already-decoded data.
    Structured(Value),
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            Self::Structured(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for ColumnValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for ColumnValue {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

/// Column access the host record must provide.
pub trait RecordColumns {
    fn column(&self, name: &str) -> ColumnValue;
    fn set_column(&mut self, name: &str, value: ColumnValue);
    /// `true` until the record has been stored once.
    fn is_new_record(&self) -> bool;
    /// Registers `value` as the column's previous value for the host's own
    /// change tracking.
    fn set_old_column(&mut self, name: &str, value: ColumnValue);
}

/// In-memory column map implementing [`RecordColumns`].
///
/// Hosts without their own attribute store can embed this next to a
/// [`Synchronizer`](crate::sync::Synchronizer).
#[derive(Debug, Clone, Default)]
pub struct ColumnStore {
    columns: HashMap<String, ColumnValue>,
    old_columns: HashMap<String, ColumnValue>,
    persisted: bool,
}

impl ColumnStore {
    /// An unsaved record with no columns.
    pub fn new_record() -> Self {
        Self::default()
    }

    /// A record loaded from storage with the given column values.
    pub fn loaded<I, K, V>(columns: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ColumnValue>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
            old_columns: HashMap::new(),
            persisted: true,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ColumnValue> {
        self.columns.get(name)
    }

    pub fn old_column(&self, name: &str) -> Option<&ColumnValue> {
        self.old_columns.get(name)
    }

    /// Flags the record as stored; hosts call this once an insert succeeds.
    pub fn mark_persisted(&mut self) {
        self.persisted = true;
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.keys().map(String::as_str)
    }
}

impl RecordColumns for ColumnStore {
    fn column(&self, name: &str) -> ColumnValue {
        self.columns.get(name).cloned().unwrap_or_default()
    }

    fn set_column(&mut self, name: &str, value: ColumnValue) {
        self.columns.insert(name.to_string(), value);
    }

    fn is_new_record(&self) -> bool {
        !self.persisted
    }

    fn set_old_column(&mut self, name: &str, value: ColumnValue) {
        self.old_columns.insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loaded_store_reports_existing_record() {
        let store = ColumnStore::loaded([("profile", r#"{"name":"Ann"}"#)]);
        assert!(!store.is_new_record());
        assert_eq!(
            store.column("profile").as_text(),
            Some(r#"{"name":"Ann"}"#)
        );
        assert!(store.column("missing").is_null());
    }

    #[test]
    fn new_store_becomes_persisted_when_marked() {
        let mut store = ColumnStore::new_record();
        assert!(store.is_new_record());
        store.set_column("settings", ColumnValue::from(json!({"theme": "dark"})));
        store.mark_persisted();
        assert!(!store.is_new_record());
        assert_eq!(
            store.get("settings").and_then(ColumnValue::as_structured),
            Some(&json!({"theme": "dark"}))
        );
    }
}
