pub mod codec;
pub mod error;
pub mod schema;
pub mod wire;

pub use codec::{decode_container, encode_container, Codable};
pub use error::CodecError;
pub use schema::{FieldSpec, FieldType, Value};

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    const INNER_SCHEMA: &[FieldSpec] = &[
        FieldSpec { number: 1, name: "amount", ty: FieldType::UInt64, required: true },
        FieldSpec { number: 2, name: "label", ty: FieldType::String, required: false },
    ];

    const OUTER_SCHEMA: &[FieldSpec] = &[
        FieldSpec { number: 1, name: "id", ty: FieldType::Bytes, required: true },
        FieldSpec { number: 2, name: "count", ty: FieldType::UInt32, required: true },
        FieldSpec { number: 3, name: "entries", ty: FieldType::ArrayOfObject(INNER_SCHEMA), required: false },
    ];

    fn sample() -> BTreeMap<u32, Value> {
        let mut inner1 = BTreeMap::new();
        inner1.insert(1, Value::UInt64(10));
        inner1.insert(2, Value::String("a".into()));
        let mut inner2 = BTreeMap::new();
        inner2.insert(1, Value::UInt64(20));

        let mut outer = BTreeMap::new();
        outer.insert(1, Value::Bytes(vec![1, 2, 3]));
        outer.insert(2, Value::UInt32(7));
        outer.insert(3, Value::Array(vec![Value::Object(inner1), Value::Object(inner2)]));
        outer
    }

    #[test]
    fn round_trip_law() {
        let value = sample();
        let encoded = encode_container(OUTER_SCHEMA, &value).unwrap();
        let decoded = decode_container(OUTER_SCHEMA, &encoded, true).unwrap();
        assert_eq!(decoded, value);
        let re_encoded = encode_container(OUTER_SCHEMA, &decoded).unwrap();
        assert_eq!(encoded, re_encoded);
    }

    #[test]
    fn missing_required_field_fails() {
        let mut value = sample();
        value.remove(&1);
        assert_eq!(encode_container(OUTER_SCHEMA, &value), Err(CodecError::MissingRequired(1)));
    }

    #[test]
    fn unknown_field_rejected_by_default() {
        let encoded = encode_container(OUTER_SCHEMA, &sample()).unwrap();
        let mut tampered = encoded.clone();
        // Append a bogus field number 99 with an empty value.
        tampered.push(99);
        tampered.push(0);
        assert_eq!(decode_container(OUTER_SCHEMA, &tampered, true), Err(CodecError::UnknownField(99)));
    }

    #[test]
    fn unknown_field_skipped_when_lenient() {
        let encoded = encode_container(OUTER_SCHEMA, &sample()).unwrap();
        let mut tampered = encoded.clone();
        tampered.push(99);
        tampered.push(0);
        let decoded = decode_container(OUTER_SCHEMA, &tampered, false).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn truncated_buffer_errors() {
        let encoded = encode_container(OUTER_SCHEMA, &sample()).unwrap();
        let truncated = &encoded[..encoded.len() - 1];
        assert!(decode_container(OUTER_SCHEMA, truncated, true).is_err());
    }
}
