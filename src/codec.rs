//! The positional, big-endian binary wire codec.
//!
//! There are no field tags and no presence bitmap on the wire: every field
//! declared by a model is encoded in declared order, and the decoder
//! interprets the same bytes by walking the same field list. All
//! multi-byte integers are big-endian, two's complement.
//!
//! | Field type | Wire layout |
//! |---|---|
//! | `CHAR`/`BYTE` | 1 byte |
//! | `INT2` | 2 bytes, big-endian |
//! | `INT4` | 4 bytes, big-endian |
//! | `MODEL` | 2-byte big-endian length `L`, then `L` bytes of the recursive encoding |
//! | `ARRAY` (scalar) | 2-byte big-endian count `N`, then `N` × element-size bytes |
//! | `MODEL_ARRAY` | 2-byte big-endian count `N`, then `N` copies of `(length:u16, bytes)` |
//!
//! Decoding is lenient: if the buffer runs out partway through a field,
//! decoding stops there and that field and every later one are left
//! unset. No error is raised — this format is for producers and consumers
//! that already agree on a schema, not for validating untrusted input.
//!
//! Encoding an absent scalar field writes zero bytes for it (there is
//! nothing meaningful to fill the slot with); absent `MODEL`/`ARRAY`/
//! `MODEL_ARRAY` fields encode as a zero length/count, still occupying
//! their prefix bytes, per the format above.

use std::sync::Arc;

use crate::schema::{Field, FieldType, Schema};
use crate::value::{Array, ArrayStorage, Record, Slot};

impl Record {
    /// Encode this record to bytes, per the wire format above.
    ///
    /// Scalar fields that were never set encode as zero; callers that
    /// care about round-tripping every field should populate every scalar
    /// field before encoding (see the module docs).
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, field) in self.model_fields().iter().enumerate() {
            encode_field(field, self.slot(i), &mut out);
        }
        out
    }

    /// Decode `buffer` into this record, overwriting its slots in field
    /// order. `self` should be freshly constructed for the target model
    /// (see [`Record::new`]) — decoding into a record that already has
    /// values will overwrite fields the buffer covers and leave the rest
    /// untouched.
    ///
    /// Never fails: a truncated buffer simply leaves the fields it
    /// couldn't reach unset.
    pub fn decode(&mut self, buffer: &[u8]) {
        let schema = Arc::clone(self.schema());
        let fields = schema.model(self.model_index()).fields.clone();
        let mut cursor = Cursor::new(buffer);
        for (i, field) in fields.iter().enumerate() {
            match decode_field(&schema, &field, &mut cursor) {
                Some(slot) => self.set_slot(i, slot),
                None => break,
            }
        }
    }
}

fn be16(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

fn be32(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

fn encode_field(field: &Field, slot: Option<&Slot>, out: &mut Vec<u8>) {
    match field.field_type {
        FieldType::Char => out.push(match slot {
            Some(Slot::Char(v)) => *v,
            _ => 0,
        }),
        FieldType::Byte => out.push(match slot {
            Some(Slot::Byte(v)) => *v as u8,
            _ => 0,
        }),
        FieldType::Int2 => {
            let v = match slot {
                Some(Slot::Int2(v)) => *v,
                _ => 0,
            };
            out.extend_from_slice(&be16(v as u16));
        }
        FieldType::Int4 => {
            let v = match slot {
                Some(Slot::Int4(v)) => *v,
                _ => 0,
            };
            out.extend_from_slice(&be32(v as u32));
        }
        FieldType::Model => match slot {
            Some(Slot::Model(child)) => {
                let encoded = child.encode();
                out.extend_from_slice(&be16(encoded.len() as u16));
                out.extend_from_slice(&encoded);
            }
            _ => out.extend_from_slice(&be16(0)),
        },
        FieldType::Array => match slot {
            Some(Slot::Array(array)) => encode_scalar_array(array, out),
            _ => out.extend_from_slice(&be16(0)),
        },
        FieldType::ModelArray => match slot {
            Some(Slot::Array(array)) => encode_model_array(array, out),
            _ => out.extend_from_slice(&be16(0)),
        },
    }
}

fn encode_scalar_array(array: &Array, out: &mut Vec<u8>) {
    out.extend_from_slice(&be16(array.count() as u16));
    if let Some(chars) = array.chars() {
        out.extend_from_slice(chars);
    } else if let Some(bytes) = array.bytes() {
        out.extend(bytes.iter().map(|v| *v as u8));
    } else if let Some(int2s) = array.int2s() {
        for v in int2s {
            out.extend_from_slice(&be16(*v as u16));
        }
    } else if let Some(int4s) = array.int4s() {
        for v in int4s {
            out.extend_from_slice(&be32(*v as u32));
        }
    }
}

fn encode_model_array(array: &Array, out: &mut Vec<u8>) {
    out.extend_from_slice(&be16(array.count() as u16));
    // Every index is encoded, even the ones that were never filled in —
    // an unfilled slot just encodes as a zero-length record, same as an
    // absent MODEL field.
    for i in 0..array.count() {
        match array.get_record(i) {
            Some(record) => {
                let encoded = record.encode();
                out.extend_from_slice(&be16(encoded.len() as u16));
                out.extend_from_slice(&encoded);
            }
            None => out.extend_from_slice(&be16(0)),
        }
    }
}

fn decode_field(schema: &Arc<Schema>, field: &Field, cursor: &mut Cursor) -> Option<Option<Slot>> {
    match field.field_type {
        FieldType::Char => Some(Some(Slot::Char(cursor.u8()?))),
        FieldType::Byte => Some(Some(Slot::Byte(cursor.u8()? as i8))),
        FieldType::Int2 => Some(Some(Slot::Int2(cursor.be16()? as i16))),
        FieldType::Int4 => Some(Some(Slot::Int4(cursor.be32()? as i32))),
        FieldType::Model => {
            let len = cursor.be16()? as usize;
            let sub = cursor.take(len)?;
            let mut child = Record::new_by_index(Arc::clone(schema), field.sub_type as usize)?;
            child.decode(sub);
            Some(Some(Slot::Model(Box::new(child))))
        }
        FieldType::Array => {
            let count = cursor.be16()? as usize;
            if count == 0 {
                return Some(None);
            }
            let element = FieldType::from_code(field.sub_type)?;
            let storage = match element {
                FieldType::Char => ArrayStorage::Char(cursor.take(count)?.to_vec()),
                FieldType::Byte => ArrayStorage::Byte(cursor.take(count)?.iter().map(|b| *b as i8).collect()),
                FieldType::Int2 => {
                    let mut values = Vec::with_capacity(count);
                    for _ in 0..count {
                        values.push(cursor.be16()? as i16);
                    }
                    ArrayStorage::Int2(values)
                }
                FieldType::Int4 => {
                    let mut values = Vec::with_capacity(count);
                    for _ in 0..count {
                        values.push(cursor.be32()? as i32);
                    }
                    ArrayStorage::Int4(values)
                }
                _ => return None,
            };
            Some(Some(Slot::Array(Array::from_parts(FieldType::Array, field.sub_type, storage))))
        }
        FieldType::ModelArray => {
            let count = cursor.be16()? as usize;
            if count == 0 {
                return Some(None);
            }
            if field.sub_type as usize >= schema.model_count() {
                return None;
            }
            let mut records = Vec::with_capacity(count);
            for _ in 0..count {
                let len = cursor.be16()? as usize;
                let sub = cursor.take(len)?;
                let mut child = Record::new_by_index(Arc::clone(schema), field.sub_type as usize)?;
                child.decode(sub);
                records.push(Some(child));
            }
            Some(Some(Slot::Array(Array::from_parts(
                FieldType::ModelArray,
                field.sub_type,
                ArrayStorage::Records(records),
            ))))
        }
    }
}

/// Minimal bounds-checked byte cursor used only while decoding a record.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Cursor { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let slice = self.bytes.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn be16(&mut self) -> Option<u16> {
        self.take(2).map(|b| u16::from_be_bytes([b[0], b[1]]))
    }

    fn be32(&mut self) -> Option<u32> {
        self.take(4).map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}
