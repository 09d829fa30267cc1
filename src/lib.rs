#![warn(missing_docs)]

//! ## Schema-driven binary serialization for structured records
//!
//! This crate loads a compact binary schema descriptor describing a set of
//! record types ("models"), builds typed record values against that
//! schema, and moves those values to and from two wire forms: a tag-free
//! positional binary encoding, and JSON.
//!
//! - [`schema`] parses the descriptor and holds the model/field table.
//! - [`value`] is the record/slot/array value tree built against a schema.
//! - [`codec`] encodes and decodes records to the positional binary format.
//! - [`json`] converts records to and from `serde_json::Value`.
//! - [`debug`] renders schemas and records as human-readable text.
//! - [`error`] has the one error this crate raises: a malformed schema.
//!
//! ```
//! use std::sync::Arc;
//! use slotrec::schema::{FieldType, Schema};
//! use slotrec::value::Record;
//!
//! // one model, "point", with two INT4 fields
//! let mut descriptor = vec![1u8];
//! descriptor.push(5); // name_len
//! descriptor.extend_from_slice(b"point");
//! descriptor.push(2); // field_count
//! for alias in ["x", "y"] {
//!     descriptor.push(alias.len() as u8);
//!     descriptor.extend_from_slice(alias.as_bytes());
//!     descriptor.push(FieldType::Int4.code());
//!     descriptor.push(0);
//! }
//!
//! let schema = Arc::new(Schema::load(&descriptor).unwrap());
//! let mut point = Record::new(Arc::clone(&schema), "point").unwrap();
//! point.set_int4("x", 3);
//! point.set_int4("y", 4);
//!
//! let encoded = point.encode();
//! let mut decoded = Record::new(schema, "point").unwrap();
//! decoded.decode(&encoded);
//! assert_eq!(decoded.get_int4("x"), 3);
//! assert_eq!(decoded.get_int4("y"), 4);
//! ```
//!
//! ----------------------
//!
//! MIT License
//!
//! Copyright (c) 2026 Scott Lott
//!
//! Permission is hereby granted, free of charge, to any person obtaining a copy
//! of this software and associated documentation files (the "Software"), to deal
//! in the Software without restriction, including without limitation the rights
//! to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
//! copies of the Software, and to permit persons to whom the Software is
//! furnished to do so, subject to the following conditions:
//!
//! The above copyright notice and this permission notice shall be included in all
//! copies or substantial portions of the Software.
//!
//! THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
//! IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//! FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
//! AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//! LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
//! OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
//! SOFTWARE.

/// The positional big-endian binary wire codec.
pub mod codec;
/// Human-readable dumps of schemas and records.
pub mod debug;
/// The error type used by this crate.
pub mod error;
/// The bidirectional JSON bridge.
pub mod json;
/// Schema descriptor parsing and the in-memory model table.
pub mod schema;
/// The value tree: record instances, their field slots, and arrays.
pub mod value;
