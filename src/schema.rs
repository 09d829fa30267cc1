//! Schema descriptor parsing and the in-memory model table.
//!
//! A schema is a flat, binary description of a set of named record types
//! ("models"), each with an ordered list of named, typed fields. It's the
//! single source of truth the rest of this crate is driven by: the value
//! tree in [`crate::value`] is shaped by it, the wire codec in
//! [`crate::codec`] walks fields in the order it declares, and the JSON
//! bridge in [`crate::json`] uses it to decide how to coerce JSON nodes.
//!
//! # Descriptor grammar
//!
//! All lengths are a single unsigned byte, so a schema is capped at 255
//! models, 255 fields per model, and 255-byte names/aliases.
//!
//! ```text
//! descriptor  := model_count:u8  model{model_count}
//! model       := name_len:u8  name:bytes[name_len]
//!                field_count:u8  field{field_count}
//! field       := alias_len:u8  alias:bytes[alias_len]
//!                type:u8  sub_type:u8
//! ```
//!
//! Names and aliases are treated as opaque byte sequences converted to
//! UTF-8 on load; comparisons are case-sensitive exact matches. A model's
//! `sub_type` for MODEL/MODEL_ARRAY fields is validated to be a real model
//! index only when that field is actually used (forward references to
//! models later in the same descriptor are fine, since every model is
//! parsed before any of them are used).

use crate::error::{Result, SchemaError};

/// One of the seven field shapes a schema can declare.
///
/// The numeric values are the wire codes used in the schema descriptor
/// (`type` byte of a `field`) — they are part of the format, not an
/// implementation detail, so this enum is `#[repr(u8)]` and round-trips
/// through [`FieldType::from_code`]/[`FieldType::code`].
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// A single unsigned byte, conventionally used for character data.
    Char = 0x01,
    /// A single signed byte.
    Byte = 0x02,
    /// A 2-byte signed integer, big-endian on the wire.
    Int2 = 0x03,
    /// A 4-byte signed integer, big-endian on the wire.
    Int4 = 0x04,
    /// A homogeneous array of scalars; `sub_type` names the element type.
    Array = 0x10,
    /// A nested record; `sub_type` is the referenced model's index.
    Model = 0x11,
    /// An array of nested records; `sub_type` is the referenced model's index.
    ModelArray = 0x12,
}

impl FieldType {
    /// Resolve a wire code to a [`FieldType`], or `None` if it's not one of
    /// the seven reserved values.
    pub fn from_code(code: u8) -> Option<FieldType> {
        match code {
            0x01 => Some(FieldType::Char),
            0x02 => Some(FieldType::Byte),
            0x03 => Some(FieldType::Int2),
            0x04 => Some(FieldType::Int4),
            0x10 => Some(FieldType::Array),
            0x11 => Some(FieldType::Model),
            0x12 => Some(FieldType::ModelArray),
            _ => None,
        }
    }

    /// The wire code for this field type.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Byte width of a single element on the wire, for the four scalar
    /// types. Not meaningful for `Array`, `Model` or `ModelArray`, which
    /// are length/count-prefixed rather than fixed-width.
    pub fn scalar_width(self) -> Option<usize> {
        match self {
            FieldType::Char | FieldType::Byte => Some(1),
            FieldType::Int2 => Some(2),
            FieldType::Int4 => Some(4),
            FieldType::Array | FieldType::Model | FieldType::ModelArray => None,
        }
    }
}

/// A single named, typed slot within a [`Model`].
///
/// `sub_type` is reused across field shapes: for `Array` it's the element
/// [`FieldType`] (always one of `Char`/`Byte`/`Int2`/`Int4`); for `Model`
/// and `ModelArray` it's the index of the referenced model in the same
/// schema. It's unused (and conventionally zero) for the four scalar types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// The field's textual key: used by accessors and as the JSON key.
    pub alias: String,
    /// The field's declared shape.
    pub field_type: FieldType,
    /// Secondary type byte, meaning depends on `field_type` (see above).
    pub sub_type: u8,
}

/// A named record type: an ordered list of fields.
///
/// A model is identified by its position in the schema's model table (its
/// "model index"), not by name, at every point past schema loading —
/// lookups by name ([`Schema::find_model`]) only happen once, when a fresh
/// record is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    /// The model's name, as it appears in `new_record`/JSON/debug output.
    pub name: String,
    /// Fields in declared order. Encoding, decoding and JSON conversion all
    /// walk this list in order; reordering it changes the wire format.
    pub fields: Vec<Field>,
}

/// The loaded, immutable table of models that drives everything else in
/// this crate.
///
/// A `Schema` never changes after [`Schema::load`] returns it. Any number
/// of records can be built from the same schema and read concurrently
/// without synchronization; nothing about a `Schema` is ever mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    models: Vec<Model>,
}

impl Schema {
    /// Parse a binary schema descriptor (see the module docs for the
    /// grammar) into a [`Schema`].
    ///
    /// Fails with [`SchemaError::MalformedDescriptor`] if any declared
    /// length would read past the end of `bytes`. A model that's cut short
    /// is discarded entirely along with everything after it — there is no
    /// partial schema on error.
    pub fn load(bytes: &[u8]) -> Result<Schema> {
        let mut cursor = Cursor::new(bytes);
        let model_count = cursor.read_u8("model_count")?;

        let mut models = Vec::with_capacity(model_count as usize);
        for _ in 0..model_count {
            models.push(Self::parse_model(&mut cursor)?);
        }

        Ok(Schema { models })
    }

    fn parse_model(cursor: &mut Cursor) -> Result<Model> {
        let name_len = cursor.read_u8("model name_len")?;
        let name = cursor.read_string(name_len as usize, "model name")?;
        let field_count = cursor.read_u8("model field_count")?;

        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            fields.push(Self::parse_field(cursor)?);
        }

        Ok(Model { name, fields })
    }

    fn parse_field(cursor: &mut Cursor) -> Result<Field> {
        let alias_len = cursor.read_u8("field alias_len")?;
        let alias = cursor.read_string(alias_len as usize, "field alias")?;
        let type_code = cursor.read_u8("field type")?;
        let sub_type = cursor.read_u8("field sub_type")?;

        let field_type = FieldType::from_code(type_code).ok_or_else(|| {
            SchemaError::MalformedDescriptor {
                reason: format!("field `{alias}` has unknown type code 0x{type_code:02X}"),
            }
        })?;

        Ok(Field {
            alias,
            field_type,
            sub_type,
        })
    }

    /// Find a model's index by name, or `None` if no model in this schema
    /// has that name.
    pub fn find_model(&self, name: &str) -> Option<usize> {
        self.models.iter().position(|m| m.name == name)
    }

    /// Borrow a model by its index.
    ///
    /// # Panics
    /// Panics if `index` is out of range. Callers that derived `index`
    /// from [`Schema::find_model`] or from a field's `sub_type` (already
    /// validated at the point it's dereferenced) never hit this.
    pub fn model(&self, index: usize) -> &Model {
        &self.models[index]
    }

    /// Number of models in this schema.
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Find a field's index within a model by `(alias, expected type)`.
    ///
    /// Both the alias and the type must match — a field with the right
    /// name but a different declared type is treated the same as a
    /// missing field (`None`), never a distinct error. This is what makes
    /// every accessor in [`crate::value`] safe to call with an alias/type
    /// pair that doesn't exist: lookup fails closed.
    pub fn field_index(&self, model_index: usize, alias: &str, expected: FieldType) -> Option<usize> {
        self.models[model_index]
            .fields
            .iter()
            .position(|f| f.alias == alias && f.field_type == expected)
    }

    /// Find a field's index within a model by alias alone, regardless of
    /// its declared type. Used where the caller accepts either `Array` or
    /// `ModelArray` (see [`crate::value::Record::get_array`]) or wants to
    /// report on a field it doesn't yet know the shape of (the debug
    /// printer).
    pub fn field_index_any(&self, model_index: usize, alias: &str) -> Option<usize> {
        self.models[model_index].fields.iter().position(|f| f.alias == alias)
    }
}

/// Minimal bounds-checked byte cursor used only while parsing a descriptor.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Cursor { bytes, pos: 0 }
    }

    fn read_u8(&mut self, what: &str) -> Result<u8> {
        let byte = self.bytes.get(self.pos).copied().ok_or_else(|| SchemaError::MalformedDescriptor {
            reason: format!("{what} runs past the end of the descriptor"),
        })?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_string(&mut self, len: usize, what: &str) -> Result<String> {
        let end = self.pos + len;
        let slice = self.bytes.get(self.pos..end).ok_or_else(|| SchemaError::MalformedDescriptor {
            reason: format!("{what} ({len} bytes) runs past the end of the descriptor"),
        })?;
        self.pos = end;
        Ok(String::from_utf8_lossy(slice).into_owned())
    }
}
