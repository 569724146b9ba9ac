//! Record discovery over an arbitrarily nested JSON tree.
//!
//! A record is any object carrying a string `product_id`. Records are found
//! depth-first, parent before children, children in document order, no matter
//! whether the root is a single record, a list of them, or a grouping tree.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::warn;

pub const ID_FIELD: &str = "product_id";

pub fn is_record(map: &Map<String, Value>) -> bool {
    map.get(ID_FIELD).is_some_and(Value::is_string)
}

/// The whole catalog document.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    root: Value,
}

impl Catalog {
    pub fn new(root: Value) -> Self {
        Catalog { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// All records in traversal order.
    pub fn records(&self) -> Vec<&Map<String, Value>> {
        let mut out = Vec::new();
        collect(&self.root, &mut out);
        out
    }

    /// JSON pointers of all records, in the same order as [`Catalog::records`].
    pub fn record_pointers(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_pointers(&self.root, String::new(), &mut out);
        out
    }

    /// Visit every record mutably. A record is handed out before any record
    /// nested inside it.
    pub fn for_each_record<F>(&mut self, mut f: F)
    where
        F: FnMut(Record<'_>),
    {
        visit_mut(&mut self.root, &mut f);
    }

    pub fn record_mut(&mut self, pointer: &str) -> Option<Record<'_>> {
        match self.root.pointer_mut(pointer) {
            Some(Value::Object(map)) if is_record(map) => Some(Record::new(map)),
            _ => None,
        }
    }

    pub fn index(&self) -> RecordIndex {
        RecordIndex::build(
            self.records()
                .into_iter()
                .zip(self.record_pointers())
                .filter_map(|(map, ptr)| Some((map.get(ID_FIELD)?.as_str()?.to_string(), ptr))),
        )
    }
}

fn collect<'a>(node: &'a Value, out: &mut Vec<&'a Map<String, Value>>) {
    match node {
        Value::Object(map) => {
            if is_record(map) {
                out.push(map);
            }
            for value in map.values() {
                collect(value, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect(item, out);
            }
        }
        _ => {}
    }
}

fn collect_pointers(node: &Value, pointer: String, out: &mut Vec<String>) {
    match node {
        Value::Object(map) => {
            if is_record(map) {
                out.push(pointer.clone());
            }
            for (key, value) in map {
                collect_pointers(value, format!("{}/{}", pointer, escape_token(key)), out);
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_pointers(item, format!("{}/{}", pointer, i), out);
            }
        }
        _ => {}
    }
}

fn visit_mut<F>(node: &mut Value, f: &mut F)
where
    F: FnMut(Record<'_>),
{
    match node {
        Value::Object(map) => {
            if is_record(map) {
                f(Record::new(&mut *map));
            }
            for value in map.values_mut() {
                visit_mut(value, f);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                visit_mut(item, f);
            }
        }
        _ => {}
    }
}

// RFC 6901: '~' and '/' inside a key
fn escape_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Mutable view of one record's fields.
pub struct Record<'a> {
    fields: &'a mut Map<String, Value>,
}

impl<'a> Record<'a> {
    pub fn new(fields: &'a mut Map<String, Value>) -> Self {
        Record { fields }
    }

    pub fn id(&self) -> &str {
        self.fields
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }

    pub fn set_text(&mut self, field: &str, text: impl Into<String>) {
        self.set(field, Value::String(text.into()));
    }

    pub fn list_mut(&mut self, field: &str) -> Option<&mut Vec<Value>> {
        self.fields.get_mut(field).and_then(Value::as_array_mut)
    }

    /// List field, logging when it is present with another type.
    pub fn list_or_warn(&mut self, field: &str) -> Option<&mut Vec<Value>> {
        if let Some(other) = self.fields.get(field).filter(|v| !v.is_array()) {
            warn!(
                product_id = %self.id(),
                field,
                found = kind_name(other),
                "expected a list, skipping field"
            );
            return None;
        }
        self.list_mut(field)
    }

    /// List field, created (or replacing a non-list value) when needed.
    pub fn ensure_list(&mut self, field: &str) -> &mut Vec<Value> {
        if let Some(other) = self.fields.get(field).filter(|v| !v.is_array()) {
            warn!(
                product_id = %self.id(),
                field,
                found = kind_name(other),
                "expected a list, replacing value with a list"
            );
        }
        let slot = self
            .fields
            .entry(field)
            .or_insert_with(|| Value::Array(Vec::new()));
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        slot.as_array_mut().expect("slot holds an array")
    }
}

pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Identifier lookup. The first record seen for an id wins; later records
/// sharing it are reported as duplicates.
#[derive(Debug, Default)]
pub struct RecordIndex {
    by_id: HashMap<String, String>,
    duplicates: Vec<String>,
}

impl RecordIndex {
    pub fn build<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut index = RecordIndex::default();
        for (id, pointer) in entries {
            if index.by_id.contains_key(&id) {
                warn!(
                    product_id = %id,
                    at = %pointer,
                    "duplicate product_id, keeping first occurrence"
                );
                if !index.duplicates.contains(&id) {
                    index.duplicates.push(id);
                }
                continue;
            }
            index.by_id.insert(id, pointer);
        }
        index
    }

    pub fn pointer(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }
}
