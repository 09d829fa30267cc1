//! The value tree: record instances, their field slots, and arrays.
//!
//! A [`Record`] is a value that conforms to one [`Model`](crate::schema::Model)
//! of a [`Schema`]: it has one [`Slot`] per declared field, in the model's
//! field order, each either empty or holding a value whose shape matches
//! that field's declared type. [`Array`] is the storage for `ARRAY` and
//! `MODEL_ARRAY` fields — a packed buffer of scalars in the first case, a
//! vector of (possibly absent) child records in the second.
//!
//! Every accessor here is deliberately lenient, per the crate's overall
//! design: an alias that doesn't exist on the model, or does but at the
//! wrong declared type, is a silent no-op for setters and a default value
//! (`0`, or `None`) for getters. Nothing here ever panics on a caller
//! mistake of that shape. This extends to a malformed schema whose
//! `MODEL`/`MODEL_ARRAY` `sub_type` doesn't reference a valid model index
//! (`Schema::load` doesn't validate this, per [`crate::schema`]'s module
//! docs): [`Record::new_by_index`] checks the index before handing back a
//! record, so a bad `sub_type` surfaces as an absent field rather than a
//! panic in [`crate::schema::Schema::model`].
//!
//! Ownership is a plain tree: a record's MODEL/MODEL_ARRAY slots own their
//! children outright (`Box<Record>` / `Vec<Option<Record>>`), so dropping a
//! record recursively drops everything under it. There is no manual
//! delete step to remember and no way to leak a replaced child — see
//! [`Record::set_record`] for the one place the source this crate is based
//! on left that question open.

use std::sync::Arc;

use crate::schema::{Field, FieldType, Schema};

/// A single field's storage in a [`Record`]: either empty, or a value
/// whose runtime shape matches the field's declared type.
#[derive(Debug, Clone)]
pub enum Slot {
    /// Backing storage for a `CHAR` field.
    Char(u8),
    /// Backing storage for a `BYTE` field.
    Byte(i8),
    /// Backing storage for an `INT2` field.
    Int2(i16),
    /// Backing storage for an `INT4` field.
    Int4(i32),
    /// Backing storage for a `MODEL` field. Owns the child record.
    Model(Box<Record>),
    /// Backing storage for an `ARRAY` or `MODEL_ARRAY` field.
    Array(Array),
}

/// A value that conforms to one model of a [`Schema`].
///
/// Construct one with [`Record::new`], mutate it with the `set_*`/`get_*`
/// accessors below, then either hand it to [`crate::codec`] to encode, or
/// [`crate::json`] to convert to/from JSON.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    model_index: usize,
    slots: Vec<Option<Slot>>,
}

impl Record {
    /// Build a fresh, entirely empty record for the model named
    /// `model_name` in `schema`. Returns `None` if no such model exists.
    pub fn new(schema: Arc<Schema>, model_name: &str) -> Option<Record> {
        let model_index = schema.find_model(model_name)?;
        Self::new_by_index(schema, model_index)
    }

    /// Build a fresh, entirely empty record for the model at `model_index`.
    ///
    /// Used internally when recursing into a MODEL/MODEL_ARRAY field, whose
    /// `sub_type` names a model index. [`Schema::load`] does not validate
    /// that a MODEL/MODEL_ARRAY field's `sub_type` is actually a valid
    /// index into its own schema (forward references are allowed by
    /// construction), so this checks it here rather than trusting callers —
    /// returns `None` if `model_index` is out of range, rather than letting
    /// [`Schema::model`] panic.
    pub(crate) fn new_by_index(schema: Arc<Schema>, model_index: usize) -> Option<Record> {
        if model_index >= schema.model_count() {
            return None;
        }
        let field_count = schema.model(model_index).fields.len();
        Some(Record {
            schema,
            model_index,
            slots: vec![None; field_count],
        })
    }

    /// The schema this record belongs to.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// This record's model index within its schema.
    pub fn model_index(&self) -> usize {
        self.model_index
    }

    /// The name of this record's model.
    pub fn model_name(&self) -> &str {
        &self.schema.model(self.model_index).name
    }

    fn fields(&self) -> &[Field] {
        &self.schema.model(self.model_index).fields
    }

    /// Whether the field named `alias` currently holds a value, regardless
    /// of its declared type. Used by the JSON bridge to decide whether to
    /// emit a key, and by the debug printer.
    pub fn is_present(&self, alias: &str) -> bool {
        match self.schema.field_index_any(self.model_index, alias) {
            Some(idx) => self.slots[idx].is_some(),
            None => false,
        }
    }

    /// Field declarations for this record's model, in order. Used by the
    /// codec, JSON bridge and debug printer, which all need to walk every
    /// field rather than look one up by alias.
    pub fn model_fields(&self) -> &[Field] {
        self.fields()
    }

    /// Slot at position `index`, in model field order. Crate-internal:
    /// used by code that already walks `model_fields()` positionally
    /// (codec, JSON bridge, debug printer) rather than looking up by alias.
    pub(crate) fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots[index].as_ref()
    }

    /// Overwrite the slot at `index` directly. Used by the binary codec,
    /// which determines the decoded value before deciding whether the
    /// field should end up present or absent.
    pub(crate) fn set_slot(&mut self, index: usize, slot: Option<Slot>) {
        self.slots[index] = slot;
    }
}

macro_rules! scalar_accessor {
    ($set_name:ident, $get_name:ident, $variant:ident, $ty:ty, $field_type:expr) => {
        impl Record {
            #[doc = concat!(
                "Store `value` in the field named `alias`, if it exists and is ",
                "declared with this scalar type. Silent no-op otherwise \
                 (unknown alias, or a different declared type)."
            )]
            pub fn $set_name(&mut self, alias: &str, value: $ty) {
                if let Some(idx) = self.schema.field_index(self.model_index, alias, $field_type) {
                    self.slots[idx] = Some(Slot::$variant(value));
                }
            }

            #[doc = concat!(
                "The value stored in the field named `alias`, or `0` if the ",
                "field is absent, unset, or declared with a different type. ",
                "There is no way to distinguish \"absent\" from \"zero\" \
                 through this accessor — use [`Record::is_present`] or the \
                 JSON form if that distinction matters."
            )]
            pub fn $get_name(&self, alias: &str) -> $ty {
                match self.schema.field_index(self.model_index, alias, $field_type) {
                    Some(idx) => match &self.slots[idx] {
                        Some(Slot::$variant(v)) => *v,
                        _ => Default::default(),
                    },
                    None => Default::default(),
                }
            }
        }
    };
}

scalar_accessor!(set_char, get_char, Char, u8, FieldType::Char);
scalar_accessor!(set_byte, get_byte, Byte, i8, FieldType::Byte);
scalar_accessor!(set_int2, get_int2, Int2, i16, FieldType::Int2);
scalar_accessor!(set_int4, get_int4, Int4, i32, FieldType::Int4);

impl Record {
    /// Install `child` into the `MODEL` field named `alias`. Silent no-op
    /// if no such field exists.
    ///
    /// If the field already held a child record, that record is simply
    /// dropped — this crate resolves the "replace without freeing" open
    /// question from the design this is based on by relying on ordinary
    /// Rust ownership: there is no way to leak the previous occupant short
    /// of `mem::forget`, so "free on replace" is the only behavior that
    /// exists here. Detach first with [`Record::get_record`] if you need
    /// the previous child to outlive the replacement.
    pub fn set_record(&mut self, alias: &str, child: Record) {
        if let Some(idx) = self.schema.field_index(self.model_index, alias, FieldType::Model) {
            self.slots[idx] = Some(Slot::Model(Box::new(child)));
        }
    }

    /// Borrow the child record stored in the `MODEL` field named `alias`,
    /// or `None` if the field is absent, unset, or not a `MODEL` field.
    pub fn get_record(&self, alias: &str) -> Option<&Record> {
        let idx = self.schema.field_index(self.model_index, alias, FieldType::Model)?;
        match &self.slots[idx] {
            Some(Slot::Model(child)) => Some(child),
            _ => None,
        }
    }

    /// Install `array` into the field named `alias`. Silent no-op if no
    /// such field exists, or if the field's declared type/sub_type don't
    /// match `array`'s (checked defensively, even though every `Array`
    /// constructor already validates this at construction time).
    pub fn set_array(&mut self, alias: &str, array: Array) {
        if let Some(idx) = self.schema.field_index_any(self.model_index, alias) {
            let field = &self.fields()[idx];
            if field.field_type == array.field_type && field.sub_type == array.sub_type {
                self.slots[idx] = Some(Slot::Array(array));
            }
        }
    }

    /// Borrow the array stored in the field named `alias`, or `None` if
    /// it's absent or unset. Succeeds for both `ARRAY` and `MODEL_ARRAY`
    /// fields: `ARRAY` is probed first, then `MODEL_ARRAY`, matching how
    /// the two are looked up anywhere else aliases are resolved by type.
    pub fn get_array(&self, alias: &str) -> Option<&Array> {
        let idx = self
            .schema
            .field_index(self.model_index, alias, FieldType::Array)
            .or_else(|| self.schema.field_index(self.model_index, alias, FieldType::ModelArray))?;
        match &self.slots[idx] {
            Some(Slot::Array(array)) => Some(array),
            _ => None,
        }
    }

    /// Mutably borrow the array stored in the field named `alias`, or
    /// `None` if it's absent or unset. Used to fill in a `MODEL_ARRAY`
    /// after [`Record::new_array_records`] and [`Record::set_array`].
    pub fn get_array_mut(&mut self, alias: &str) -> Option<&mut Array> {
        let idx = self
            .schema
            .field_index(self.model_index, alias, FieldType::Array)
            .or_else(|| self.schema.field_index(self.model_index, alias, FieldType::ModelArray))?;
        match &mut self.slots[idx] {
            Some(Slot::Array(array)) => Some(array),
            _ => None,
        }
    }

    /// Build a `CHAR` array from `bytes`, validated against the field named
    /// `alias` on this record's model. Returns `None` if there is no such
    /// `ARRAY` field, or its element type isn't `CHAR`.
    pub fn new_array_chars(&self, alias: &str, bytes: &[u8]) -> Option<Array> {
        self.new_scalar_array(alias, FieldType::Char, ArrayStorage::Char(bytes.to_vec()))
    }

    /// Build a `BYTE` array, validated against the field named `alias`.
    pub fn new_array_bytes(&self, alias: &str, values: &[i8]) -> Option<Array> {
        self.new_scalar_array(alias, FieldType::Byte, ArrayStorage::Byte(values.to_vec()))
    }

    /// Build an `INT2` array, validated against the field named `alias`.
    pub fn new_array_int2s(&self, alias: &str, values: &[i16]) -> Option<Array> {
        self.new_scalar_array(alias, FieldType::Int2, ArrayStorage::Int2(values.to_vec()))
    }

    /// Build an `INT4` array, validated against the field named `alias`.
    pub fn new_array_int4s(&self, alias: &str, values: &[i32]) -> Option<Array> {
        self.new_scalar_array(alias, FieldType::Int4, ArrayStorage::Int4(values.to_vec()))
    }

    fn new_scalar_array(&self, alias: &str, element: FieldType, storage: ArrayStorage) -> Option<Array> {
        let idx = self.schema.field_index_any(self.model_index, alias)?;
        let field = &self.fields()[idx];
        if field.field_type != FieldType::Array || field.sub_type != element.code() {
            return None;
        }
        Some(Array {
            field_type: FieldType::Array,
            sub_type: element.code(),
            storage,
        })
    }

    /// Build a `MODEL_ARRAY` of `capacity` empty slots, validated against
    /// the field named `alias`. Returns `None` if there is no such
    /// `MODEL_ARRAY` field. Fill individual slots with
    /// [`Array::set_record`].
    pub fn new_array_records(&self, alias: &str, capacity: usize) -> Option<Array> {
        let idx = self.schema.field_index_any(self.model_index, alias)?;
        let field = &self.fields()[idx];
        if field.field_type != FieldType::ModelArray {
            return None;
        }
        Some(Array {
            field_type: FieldType::ModelArray,
            sub_type: field.sub_type,
            storage: ArrayStorage::Records(vec![None; capacity]),
        })
    }

    /// Construct a fresh, empty record for the model referenced by the
    /// `MODEL`/`MODEL_ARRAY` field named `alias` (i.e. `field.sub_type`
    /// resolved against this record's schema). Returns `None` if there's
    /// no such field.
    pub fn new_child(&self, alias: &str) -> Option<Record> {
        let idx = self.schema.field_index_any(self.model_index, alias)?;
        let field = &self.fields()[idx];
        match field.field_type {
            FieldType::Model | FieldType::ModelArray => {
                Record::new_by_index(Arc::clone(&self.schema), field.sub_type as usize)
            }
            _ => None,
        }
    }
}

/// Storage for an `ARRAY` or `MODEL_ARRAY` field.
///
/// `field_type`/`sub_type` mirror the declaring field's own type/sub_type
/// and exist so assignment into a [`Record`] slot (via
/// [`Record::set_array`]) can be validated defensively without going back
/// to the schema.
#[derive(Debug, Clone)]
pub struct Array {
    field_type: FieldType,
    sub_type: u8,
    storage: ArrayStorage,
}

#[derive(Debug, Clone)]
pub(crate) enum ArrayStorage {
    Char(Vec<u8>),
    Byte(Vec<i8>),
    Int2(Vec<i16>),
    Int4(Vec<i32>),
    Records(Vec<Option<Record>>),
}

impl Array {
    /// Build an array directly from its parts. Used by the binary codec,
    /// which already knows the exact field a decoded array belongs to and
    /// so doesn't need the alias-based validation the public constructors
    /// perform.
    pub(crate) fn from_parts(field_type: FieldType, sub_type: u8, storage: ArrayStorage) -> Array {
        Array {
            field_type,
            sub_type,
            storage,
        }
    }

    /// This array's declared field type: [`FieldType::Array`] for scalar
    /// arrays, [`FieldType::ModelArray`] for arrays of records.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// This array's element type: for a scalar array, one of
    /// `CHAR`/`BYTE`/`INT2`/`INT4`; for a `MODEL_ARRAY`, the referenced
    /// model's index.
    pub fn sub_type(&self) -> u8 {
        self.sub_type
    }

    /// Number of logical elements in this array.
    pub fn count(&self) -> usize {
        match &self.storage {
            ArrayStorage::Char(v) => v.len(),
            ArrayStorage::Byte(v) => v.len(),
            ArrayStorage::Int2(v) => v.len(),
            ArrayStorage::Int4(v) => v.len(),
            ArrayStorage::Records(v) => v.len(),
        }
    }

    /// This array's elements as `CHAR` bytes, or `None` if it isn't one.
    pub fn chars(&self) -> Option<&[u8]> {
        match &self.storage {
            ArrayStorage::Char(v) => Some(v),
            _ => None,
        }
    }

    /// This array's elements as `BYTE`s, or `None` if it isn't one.
    pub fn bytes(&self) -> Option<&[i8]> {
        match &self.storage {
            ArrayStorage::Byte(v) => Some(v),
            _ => None,
        }
    }

    /// This array's elements as `INT2`s, or `None` if it isn't one.
    pub fn int2s(&self) -> Option<&[i16]> {
        match &self.storage {
            ArrayStorage::Int2(v) => Some(v),
            _ => None,
        }
    }

    /// This array's elements as `INT4`s, or `None` if it isn't one.
    pub fn int4s(&self) -> Option<&[i32]> {
        match &self.storage {
            ArrayStorage::Int4(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the record at `index`, or `None` if it's out of bounds, this
    /// isn't a `MODEL_ARRAY`, or the slot at `index` was never filled.
    ///
    /// Bounds-checked with strict `<` — the source this is based on used
    /// `index > count`, permitting one-past-the-end access; that's fixed
    /// here.
    pub fn get_record(&self, index: usize) -> Option<&Record> {
        match &self.storage {
            ArrayStorage::Records(records) if index < records.len() => records[index].as_ref(),
            _ => None,
        }
    }

    /// Fill the slot at `index` with `record`. Silent no-op if `index` is
    /// out of bounds or this isn't a `MODEL_ARRAY`.
    pub fn set_record(&mut self, index: usize, record: Record) {
        if let ArrayStorage::Records(records) = &mut self.storage {
            if index < records.len() {
                records[index] = Some(record);
            }
        }
    }

    /// Iterate the filled slots of a `MODEL_ARRAY`, in order, skipping any
    /// that were never set. Empty for scalar arrays.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        let slice: &[Option<Record>] = match &self.storage {
            ArrayStorage::Records(records) => records.as_slice(),
            _ => &[],
        };
        slice.iter().filter_map(|r| r.as_ref())
    }
}
