//! The bidirectional JSON bridge.
//!
//! [`Record::to_json`] and [`Record::from_json`] convert between a record
//! and a [`serde_json::Value`] object, one field per JSON key named after
//! the field's alias. Both directions are lenient in the same way the rest
//! of this crate is: a JSON node of the wrong kind for its field is simply
//! skipped rather than rejected, and an absent/unset field is omitted from
//! the JSON output rather than written as `null`.
//!
//! | Field type | JSON shape |
//! |---|---|
//! | `CHAR`/`BYTE`/`INT2`/`INT4` | number |
//! | `ARRAY(CHAR)` | string |
//! | `ARRAY` (other element) | array of numbers |
//! | `MODEL` | object |
//! | `MODEL_ARRAY` | array of objects |
//!
//! Empty strings and empty arrays are accepted and round-trip as empty,
//! rather than being treated as absent — the source this bridge is based
//! on skipped them by mistake, which this one does not reproduce.

use serde_json::{Map, Value};

use crate::schema::FieldType;
use crate::value::{Array, ArrayStorage, Record, Slot};

impl Record {
    /// Convert this record to a JSON object, one key per present field,
    /// named after its alias. Fields that are absent or unset are left out
    /// of the object entirely rather than appearing as `null`.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (i, field) in self.model_fields().iter().enumerate() {
            if let Some(value) = slot_to_json(self.slot(i)) {
                map.insert(field.alias.clone(), value);
            }
        }
        Value::Object(map)
    }

    /// Populate this record's fields from a JSON object, matching keys to
    /// field aliases. `json` should be a JSON object; any other JSON kind
    /// leaves this record untouched. A key that doesn't match any field on
    /// this record's model is ignored; a key that matches a field but
    /// holds a JSON value of the wrong kind for that field is also
    /// ignored, leaving that field as it was before the call.
    pub fn from_json(&mut self, json: &Value) {
        let Some(map) = json.as_object() else {
            return;
        };
        let schema = self.schema().clone();
        for (i, field) in schema.model(self.model_index()).fields.iter().enumerate() {
            if let Some(node) = map.get(&field.alias) {
                if let Some(slot) = json_to_slot(&schema, field.field_type, field.sub_type, node) {
                    self.set_slot(i, Some(slot));
                }
            }
        }
    }
}

fn slot_to_json(slot: Option<&Slot>) -> Option<Value> {
    match slot? {
        Slot::Char(v) => Some(Value::from(*v)),
        Slot::Byte(v) => Some(Value::from(*v)),
        Slot::Int2(v) => Some(Value::from(*v)),
        Slot::Int4(v) => Some(Value::from(*v)),
        Slot::Model(child) => Some(child.to_json()),
        Slot::Array(array) => Some(array_to_json(array)),
    }
}

fn array_to_json(array: &Array) -> Value {
    if let Some(chars) = array.chars() {
        return Value::String(String::from_utf8_lossy(chars).into_owned());
    }
    if let Some(bytes) = array.bytes() {
        return Value::Array(bytes.iter().map(|v| Value::from(*v)).collect());
    }
    if let Some(int2s) = array.int2s() {
        return Value::Array(int2s.iter().map(|v| Value::from(*v)).collect());
    }
    if let Some(int4s) = array.int4s() {
        return Value::Array(int4s.iter().map(|v| Value::from(*v)).collect());
    }
    Value::Array(array.records().map(|r| r.to_json()).collect())
}

fn json_to_slot(schema: &std::sync::Arc<crate::schema::Schema>, field_type: FieldType, sub_type: u8, node: &Value) -> Option<Slot> {
    match field_type {
        FieldType::Char => Some(Slot::Char(node.as_i64()? as u8)),
        FieldType::Byte => Some(Slot::Byte(node.as_i64()? as i8)),
        FieldType::Int2 => Some(Slot::Int2(node.as_i64()? as i16)),
        FieldType::Int4 => Some(Slot::Int4(node.as_i64()? as i32)),
        FieldType::Model => {
            let mut child = Record::new_by_index(std::sync::Arc::clone(schema), sub_type as usize)?;
            child.from_json(node);
            Some(Slot::Model(Box::new(child)))
        }
        FieldType::Array => {
            let element = FieldType::from_code(sub_type)?;
            let storage = match element {
                FieldType::Char => ArrayStorage::Char(node.as_str()?.bytes().collect()),
                FieldType::Byte => ArrayStorage::Byte(
                    node.as_array()?.iter().map(|v| v.as_i64().unwrap_or(0) as i8).collect(),
                ),
                FieldType::Int2 => ArrayStorage::Int2(
                    node.as_array()?.iter().map(|v| v.as_i64().unwrap_or(0) as i16).collect(),
                ),
                FieldType::Int4 => ArrayStorage::Int4(
                    node.as_array()?.iter().map(|v| v.as_i64().unwrap_or(0) as i32).collect(),
                ),
                _ => return None,
            };
            Some(Slot::Array(Array::from_parts(FieldType::Array, sub_type, storage)))
        }
        FieldType::ModelArray => {
            if sub_type as usize >= schema.model_count() {
                return None;
            }
            let items = node.as_array()?;
            let mut records = Vec::with_capacity(items.len());
            for item in items {
                let mut child = Record::new_by_index(std::sync::Arc::clone(schema), sub_type as usize)?;
                child.from_json(item);
                records.push(Some(child));
            }
            Some(Slot::Array(Array::from_parts(FieldType::ModelArray, sub_type, ArrayStorage::Records(records))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use std::sync::Arc;

    fn push_model(out: &mut Vec<u8>, name: &str, fields: &[(&str, FieldType, u8)]) {
        out.push(name.len() as u8);
        out.extend_from_slice(name.as_bytes());
        out.push(fields.len() as u8);
        for (alias, field_type, sub_type) in fields {
            out.push(alias.len() as u8);
            out.extend_from_slice(alias.as_bytes());
            out.push(field_type.code());
            out.push(*sub_type);
        }
    }

    fn user_schema() -> Arc<Schema> {
        let mut bytes = vec![3u8];
        push_model(
            &mut bytes,
            "user",
            &[
                ("age", FieldType::Byte, 0),
                ("gender", FieldType::Byte, 0),
                ("job", FieldType::Model, 1),
                ("tasks", FieldType::ModelArray, 2),
                ("name", FieldType::Array, FieldType::Char.code()),
            ],
        );
        push_model(
            &mut bytes,
            "job",
            &[
                ("title", FieldType::Array, FieldType::Char.code()),
                ("type", FieldType::Byte, 0),
            ],
        );
        push_model(
            &mut bytes,
            "task",
            &[
                ("id", FieldType::Int2, 0),
                ("status", FieldType::Byte, 0),
                ("time", FieldType::Array, FieldType::Int4.code()),
            ],
        );
        Arc::new(Schema::load(&bytes).unwrap())
    }

    #[test]
    fn to_json_omits_absent_fields() {
        let mut user = Record::new(user_schema(), "user").unwrap();
        user.set_byte("age", 30);
        let json = user.to_json();
        let map = json.as_object().unwrap();
        assert_eq!(map.get("age"), Some(&Value::from(30)));
        assert!(!map.contains_key("job"));
        assert!(!map.contains_key("name"));
    }

    #[test]
    fn round_trip_through_json() {
        let schema = user_schema();
        let mut user = Record::new(Arc::clone(&schema), "user").unwrap();
        user.set_byte("age", 30);
        user.set_byte("gender", 1);

        let mut job = user.new_child("job").unwrap();
        job.set_byte("type", 2);
        let title = job.new_array_chars("title", b"Product Manager").unwrap();
        job.set_array("title", title);
        user.set_record("job", job);

        let name = user.new_array_chars("name", b"Zhang Ji").unwrap();
        user.set_array("name", name);

        let json = user.to_json();

        let mut restored = Record::new(Arc::clone(&schema), "user").unwrap();
        restored.from_json(&json);

        assert_eq!(restored.get_byte("age"), 30);
        assert_eq!(restored.get_byte("gender"), 1);
        assert_eq!(restored.get_record("job").unwrap().get_byte("type"), 2);
        assert_eq!(
            restored.get_record("job").unwrap().get_array("title").unwrap().chars().unwrap(),
            b"Product Manager"
        );
        assert_eq!(restored.get_array("name").unwrap().chars().unwrap(), b"Zhang Ji");
    }

    #[test]
    fn empty_string_and_array_are_accepted_not_skipped() {
        let schema = user_schema();
        let mut user = Record::new(Arc::clone(&schema), "user").unwrap();
        user.from_json(&serde_json::json!({ "name": "" }));
        assert!(user.is_present("name"));
        assert_eq!(user.get_array("name").unwrap().chars().unwrap(), b"");

        let mut user2 = Record::new(Arc::clone(&schema), "user").unwrap();
        user2.from_json(&serde_json::json!({ "tasks": [] }));
        // an empty array produces a zero-length MODEL_ARRAY, not an absent field
        assert!(user2.is_present("tasks"));
        assert_eq!(user2.get_array("tasks").unwrap().count(), 0);
    }

    #[test]
    fn scalar_char_field_is_a_json_number_not_a_string() {
        let mut bytes = vec![1u8];
        push_model(&mut bytes, "letter", &[("c", FieldType::Char, 0)]);
        let schema = Arc::new(Schema::load(&bytes).unwrap());

        let mut rec = Record::new(Arc::clone(&schema), "letter").unwrap();
        rec.set_char("c", b'A');
        let json = rec.to_json();
        assert_eq!(json.as_object().unwrap().get("c"), Some(&Value::from(b'A')));

        let mut restored = Record::new(Arc::clone(&schema), "letter").unwrap();
        restored.from_json(&json);
        assert_eq!(restored.get_char("c"), b'A');
    }

    #[test]
    fn model_field_with_out_of_range_sub_type_is_skipped_not_a_panic() {
        let mut bytes = vec![1u8];
        push_model(&mut bytes, "thing", &[("ref", FieldType::Model, 99)]);
        let schema = Arc::new(Schema::load(&bytes).unwrap());

        let mut rec = Record::new(schema, "thing").unwrap();
        rec.from_json(&serde_json::json!({ "ref": { "whatever": 1 } }));
        assert!(rec.get_record("ref").is_none());
    }

    #[test]
    fn wrong_kind_json_value_is_skipped() {
        let schema = user_schema();
        let mut user = Record::new(Arc::clone(&schema), "user").unwrap();
        user.set_byte("age", 30);
        // "age" expects a number; a string is ignored, leaving the field as-is
        user.from_json(&serde_json::json!({ "age": "not a number" }));
        assert_eq!(user.get_byte("age"), 30);
    }
}
