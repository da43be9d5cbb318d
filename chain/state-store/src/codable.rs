use std::collections::BTreeMap;

use lisk_codec::{Codable, CodecError, FieldSpec, FieldType, Value};
use lisk_store::DBCol;

use crate::diff::{DiffEntry, DiffKey, StateDiff};

const DIFF_KEY_SCHEMA: &[FieldSpec] = &[
    FieldSpec { number: 1, name: "col", ty: FieldType::UInt32, required: true },
    FieldSpec { number: 2, name: "key", ty: FieldType::Bytes, required: true },
];
const DIFF_ENTRY_SCHEMA: &[FieldSpec] = &[
    FieldSpec { number: 1, name: "col", ty: FieldType::UInt32, required: true },
    FieldSpec { number: 2, name: "key", ty: FieldType::Bytes, required: true },
    FieldSpec { number: 3, name: "value", ty: FieldType::Bytes, required: true },
];
const STATE_DIFF_SCHEMA: &[FieldSpec] = &[
    FieldSpec { number: 1, name: "created", ty: FieldType::ArrayOfObject(DIFF_KEY_SCHEMA), required: false },
    FieldSpec { number: 2, name: "updated", ty: FieldType::ArrayOfObject(DIFF_ENTRY_SCHEMA), required: false },
    FieldSpec { number: 3, name: "deleted", ty: FieldType::ArrayOfObject(DIFF_ENTRY_SCHEMA), required: false },
];

fn col_field(fields: &BTreeMap<u32, Value>) -> Result<DBCol, CodecError> {
    let n = fields.get(&1).and_then(Value::as_u32).ok_or(CodecError::MissingRequired(1))?;
    DBCol::from_u32(n).ok_or(CodecError::WrongType(1, "known DBCol discriminant"))
}

fn bytes_field(fields: &BTreeMap<u32, Value>, n: u32) -> Result<Vec<u8>, CodecError> {
    fields.get(&n).and_then(Value::as_bytes).map(<[u8]>::to_vec).ok_or(CodecError::MissingRequired(n))
}

impl Codable for StateDiff {
    fn schema() -> &'static [FieldSpec] {
        STATE_DIFF_SCHEMA
    }

    fn to_fields(&self) -> BTreeMap<u32, Value> {
        let mut m = BTreeMap::new();
        m.insert(
            1,
            Value::Array(
                self.created
                    .iter()
                    .map(|k| {
                        let mut o = BTreeMap::new();
                        o.insert(1, Value::UInt32(k.col.as_u32()));
                        o.insert(2, Value::Bytes(k.key.clone()));
                        Value::Object(o)
                    })
                    .collect(),
            ),
        );
        let encode_entries = |entries: &[DiffEntry]| {
            Value::Array(
                entries
                    .iter()
                    .map(|e| {
                        let mut o = BTreeMap::new();
                        o.insert(1, Value::UInt32(e.col.as_u32()));
                        o.insert(2, Value::Bytes(e.key.clone()));
                        o.insert(3, Value::Bytes(e.value.clone()));
                        Value::Object(o)
                    })
                    .collect(),
            )
        };
        m.insert(2, encode_entries(&self.updated));
        m.insert(3, encode_entries(&self.deleted));
        m
    }

    fn from_fields(fields: BTreeMap<u32, Value>) -> Result<Self, CodecError> {
        let created = match fields.get(&1).and_then(Value::as_array) {
            Some(items) => items
                .iter()
                .map(|item| {
                    let obj = item.as_object().ok_or(CodecError::WrongType(1, "object"))?;
                    Ok(DiffKey { col: col_field(obj)?, key: bytes_field(obj, 2)? })
                })
                .collect::<Result<Vec<_>, CodecError>>()?,
            None => Vec::new(),
        };
        let decode_entries = |n: u32, fields: &BTreeMap<u32, Value>| -> Result<Vec<DiffEntry>, CodecError> {
            match fields.get(&n).and_then(Value::as_array) {
                Some(items) => items
                    .iter()
                    .map(|item| {
                        let obj = item.as_object().ok_or(CodecError::WrongType(n, "object"))?;
                        Ok(DiffEntry { col: col_field(obj)?, key: bytes_field(obj, 2)?, value: bytes_field(obj, 3)? })
                    })
                    .collect(),
                None => Ok(Vec::new()),
            }
        };
        Ok(StateDiff { created, updated: decode_entries(2, &fields)?, deleted: decode_entries(3, &fields)? })
    }
}
