//! Human-readable dumps of schemas and records, for debugging.
//!
//! These are plain indented text renderings, not a format anything parses
//! back — they exist for the same reason the original's `ktv_print_tree`/
//! `ktv_print_obj` did: to eyeball a schema or a record tree while working
//! on code that builds one.

use std::fmt::Write as _;

use crate::schema::{FieldType, Schema};
use crate::value::{Record, Slot};

impl Schema {
    /// Render every model and field declared by this schema, one line per
    /// field, indented under its model.
    ///
    /// For `MODEL`/`MODEL_ARRAY` fields, `sub_type` is resolved to the
    /// referenced model's name rather than printed as a bare index — the
    /// index alone isn't meaningful to a human reading the dump.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        for (i, model) in self.models_for_dump().iter().enumerate() {
            let _ = writeln!(out, "[{i}] model {}", model.name);
            for field in &model.fields {
                match field.field_type {
                    FieldType::Model | FieldType::ModelArray
                        if (field.sub_type as usize) < self.model_count() =>
                    {
                        let referenced = self.model(field.sub_type as usize).name.as_str();
                        let _ = writeln!(
                            out,
                            "    {} : {:?} -> {referenced}",
                            field.alias, field.field_type
                        );
                    }
                    FieldType::Model | FieldType::ModelArray => {
                        let _ = writeln!(
                            out,
                            "    {} : {:?} -> <invalid model index {}>",
                            field.alias, field.field_type, field.sub_type
                        );
                    }
                    _ => {
                        let _ = writeln!(
                            out,
                            "    {} : {:?} (sub_type={})",
                            field.alias, field.field_type, field.sub_type
                        );
                    }
                }
            }
        }
        out
    }

    fn models_for_dump(&self) -> Vec<&crate::schema::Model> {
        (0..self.model_count()).map(|i| self.model(i)).collect()
    }
}

impl Record {
    /// Render this record's present fields, recursing into nested records
    /// and model arrays with increasing indentation. Absent fields are
    /// omitted, matching [`Record::to_json`](crate::value::Record::to_json).
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        self.write_dump(&mut out, 0);
        out
    }

    fn write_dump(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = writeln!(out, "{indent}{} {{", self.model_name());
        for (i, field) in self.model_fields().iter().enumerate() {
            let Some(slot) = self.slot(i) else { continue };
            match slot {
                Slot::Char(v) => {
                    let _ = writeln!(out, "{indent}  {}: '{}'", field.alias, *v as char);
                }
                Slot::Byte(v) => {
                    let _ = writeln!(out, "{indent}  {}: {v}", field.alias);
                }
                Slot::Int2(v) => {
                    let _ = writeln!(out, "{indent}  {}: {v}", field.alias);
                }
                Slot::Int4(v) => {
                    let _ = writeln!(out, "{indent}  {}: {v}", field.alias);
                }
                Slot::Model(child) => {
                    let _ = writeln!(out, "{indent}  {}:", field.alias);
                    child.write_dump(out, depth + 2);
                }
                Slot::Array(array) => {
                    if let Some(chars) = array.chars() {
                        let _ = writeln!(
                            out,
                            "{indent}  {}: \"{}\"",
                            field.alias,
                            String::from_utf8_lossy(chars)
                        );
                    } else if array.field_type() == crate::schema::FieldType::ModelArray {
                        let _ = writeln!(out, "{indent}  {}: [{} elements]", field.alias, array.count());
                        for record in array.records() {
                            record.write_dump(out, depth + 2);
                        }
                    } else {
                        let _ = writeln!(out, "{indent}  {}: [{} elements]", field.alias, array.count());
                    }
                }
            }
        }
        let _ = writeln!(out, "{indent}}}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn push_model(out: &mut Vec<u8>, name: &str, fields: &[(&str, crate::schema::FieldType, u8)]) {
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

    #[test]
    fn schema_dump_lists_models_and_fields() {
        let mut bytes = vec![1u8];
        push_model(&mut bytes, "m", &[("a", crate::schema::FieldType::Byte, 0)]);
        let schema = Schema::load(&bytes).unwrap();
        let dump = schema.debug_dump();
        assert!(dump.contains("model m"));
        assert!(dump.contains("a : Byte"));
    }

    #[test]
    fn record_dump_omits_absent_fields_and_recurses() {
        let mut bytes = vec![2u8];
        push_model(&mut bytes, "user", &[("age", crate::schema::FieldType::Byte, 0), ("job", crate::schema::FieldType::Model, 1)]);
        push_model(&mut bytes, "job", &[("type", crate::schema::FieldType::Byte, 0)]);
        let schema = Arc::new(Schema::load(&bytes).unwrap());

        let mut user = Record::new(Arc::clone(&schema), "user").unwrap();
        user.set_byte("age", 30);
        let mut job = user.new_child("job").unwrap();
        job.set_byte("type", 2);
        user.set_record("job", job);

        let dump = user.debug_dump();
        assert!(dump.contains("age: 30"));
        assert!(dump.contains("job:"));
        assert!(dump.contains("type: 2"));
    }

    #[test]
    fn schema_dump_handles_out_of_range_model_sub_type_without_panicking() {
        let mut bytes = vec![1u8];
        push_model(&mut bytes, "thing", &[("ref", crate::schema::FieldType::Model, 99)]);
        let schema = Schema::load(&bytes).unwrap();
        let dump = schema.debug_dump();
        assert!(dump.contains("invalid model index 99"));
    }
}
