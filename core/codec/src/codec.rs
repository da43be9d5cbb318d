use std::collections::BTreeMap;

use crate::error::CodecError;
use crate::schema::{FieldSpec, FieldType, Value};
use crate::wire::{read_length_delimited, read_varint, write_length_delimited, write_varint};

fn zigzag_encode32(v: i32) -> u32 {
    ((v << 1) ^ (v >> 31)) as u32
}
fn zigzag_decode32(v: u32) -> i32 {
    ((v >> 1) as i32) ^ -((v & 1) as i32)
}
fn zigzag_encode64(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}
fn zigzag_decode64(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

fn encode_value(value: &Value, ty: &FieldType, number: u32) -> Result<Vec<u8>, CodecError> {
    match (ty, value) {
        (FieldType::Bytes, Value::Bytes(b)) => Ok(b.clone()),
        (FieldType::String, Value::String(s)) => Ok(s.as_bytes().to_vec()),
        (FieldType::UInt32, Value::UInt32(v)) => Ok(v.to_be_bytes().to_vec()),
        (FieldType::UInt64, Value::UInt64(v)) => Ok(v.to_be_bytes().to_vec()),
        (FieldType::SInt32, Value::SInt32(v)) => Ok(zigzag_encode32(*v).to_be_bytes().to_vec()),
        (FieldType::SInt64, Value::SInt64(v)) => Ok(zigzag_encode64(*v).to_be_bytes().to_vec()),
        (FieldType::Boolean, Value::Boolean(v)) => Ok(vec![if *v { 1 } else { 0 }]),
        (FieldType::Object(schema), Value::Object(fields)) => encode_container(schema, fields),
        (FieldType::ArrayOfObject(schema), Value::Array(items)) => {
            let mut buf = Vec::new();
            write_varint(&mut buf, items.len() as u64);
            for item in items {
                let Value::Object(fields) = item else {
                    return Err(CodecError::WrongType(number, "object"));
                };
                write_length_delimited(&mut buf, &encode_container(schema, fields)?);
            }
            Ok(buf)
        }
        _ => Err(CodecError::WrongType(number, "matching dataType")),
    }
}

fn decode_value(bytes: &[u8], ty: &FieldType, number: u32, strict: bool) -> Result<Value, CodecError> {
    match ty {
        FieldType::Bytes => Ok(Value::Bytes(bytes.to_vec())),
        FieldType::String => {
            std::str::from_utf8(bytes).map(|s| Value::String(s.to_string())).map_err(|_| CodecError::WrongType(number, "utf8 string"))
        }
        FieldType::UInt32 => {
            let arr: [u8; 4] = bytes.try_into().map_err(|_| CodecError::WrongType(number, "4-byte uint32"))?;
            Ok(Value::UInt32(u32::from_be_bytes(arr)))
        }
        FieldType::UInt64 => {
            let arr: [u8; 8] = bytes.try_into().map_err(|_| CodecError::WrongType(number, "8-byte uint64"))?;
            Ok(Value::UInt64(u64::from_be_bytes(arr)))
        }
        FieldType::SInt32 => {
            let arr: [u8; 4] = bytes.try_into().map_err(|_| CodecError::WrongType(number, "4-byte sint32"))?;
            Ok(Value::SInt32(zigzag_decode32(u32::from_be_bytes(arr))))
        }
        FieldType::SInt64 => {
            let arr: [u8; 8] = bytes.try_into().map_err(|_| CodecError::WrongType(number, "8-byte sint64"))?;
            Ok(Value::SInt64(zigzag_decode64(u64::from_be_bytes(arr))))
        }
        FieldType::Boolean => match bytes {
            [0] => Ok(Value::Boolean(false)),
            [1] => Ok(Value::Boolean(true)),
            _ => Err(CodecError::WrongType(number, "single-byte boolean")),
        },
        FieldType::Object(schema) => decode_container(schema, bytes, strict).map(Value::Object),
        FieldType::ArrayOfObject(schema) => {
            let mut pos = 0;
            let count = read_varint(bytes, &mut pos)?;
            let mut items = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let item_bytes = read_length_delimited(bytes, &mut pos)?;
                items.push(Value::Object(decode_container(schema, item_bytes, strict)?));
            }
            Ok(Value::Array(items))
        }
    }
}

/// Ascending-field-number, length-delimited-per-field encoding. Re-encoding
/// a decoded value reproduces these bytes exactly (round-trip law, spec §4.1).
pub fn encode_container(schema: &[FieldSpec], fields: &BTreeMap<u32, Value>) -> Result<Vec<u8>, CodecError> {
    let mut sorted: Vec<&FieldSpec> = schema.iter().collect();
    sorted.sort_by_key(|f| f.number);

    let mut buf = Vec::new();
    for spec in sorted {
        match fields.get(&spec.number) {
            Some(value) => {
                write_varint(&mut buf, spec.number as u64);
                let encoded = encode_value(value, &spec.ty, spec.number)?;
                write_length_delimited(&mut buf, &encoded);
            }
            None if spec.required => return Err(CodecError::MissingRequired(spec.number)),
            None => {}
        }
    }
    Ok(buf)
}

pub fn decode_container(schema: &[FieldSpec], bytes: &[u8], strict: bool) -> Result<BTreeMap<u32, Value>, CodecError> {
    let mut pos = 0;
    let mut out = BTreeMap::new();
    while pos < bytes.len() {
        let number = read_varint(bytes, &mut pos)? as u32;
        let value_bytes = read_length_delimited(bytes, &mut pos)?;
        let spec = schema.iter().find(|f| f.number == number);
        match spec {
            Some(spec) => {
                let value = decode_value(value_bytes, &spec.ty, number, strict)?;
                if out.insert(number, value).is_some() {
                    return Err(CodecError::DuplicateField(number));
                }
            }
            None if strict => return Err(CodecError::UnknownField(number)),
            None => {}
        }
    }
    for spec in schema {
        if spec.required && !out.contains_key(&spec.number) {
            return Err(CodecError::MissingRequired(spec.number));
        }
    }
    Ok(out)
}

/// A Rust type with a declarative, fixed wire schema. Implementors convert to
/// and from the generic [`Value`] representation; `encode`/`decode` are
/// derived from that mapping plus the schema, never via reflection.
pub trait Codable: Sized {
    fn schema() -> &'static [FieldSpec];
    fn to_fields(&self) -> BTreeMap<u32, Value>;
    fn from_fields(fields: BTreeMap<u32, Value>) -> Result<Self, CodecError>;

    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        encode_container(Self::schema(), &self.to_fields())
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::decode_with(bytes, true)
    }

    /// `strict = false` skips unknown field numbers instead of failing on
    /// them; the default (`decode`) is strict, per spec §4.1.
    fn decode_with(bytes: &[u8], strict: bool) -> Result<Self, CodecError> {
        let fields = decode_container(Self::schema(), bytes, strict)?;
        Self::from_fields(fields)
    }
}
