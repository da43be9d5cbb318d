use std::collections::BTreeMap;

use lisk_codec::{Codable, CodecError, FieldSpec, FieldType, Value};

use crate::account::{Account, AccountKeys, DposAccountAsset, Unlocking, Vote};
use crate::address::Bytes;
use crate::block::{Block, BlockAsset, BlockHeader};
use crate::hash::Hash32;
use crate::transaction::Transaction;

fn bytes_field(fields: &BTreeMap<u32, Value>, n: u32) -> Result<Vec<u8>, CodecError> {
    fields.get(&n).and_then(Value::as_bytes).map(<[u8]>::to_vec).ok_or(CodecError::MissingRequired(n))
}

fn hash_field(fields: &BTreeMap<u32, Value>, n: u32) -> Result<Hash32, CodecError> {
    let b = bytes_field(fields, n)?;
    let arr: [u8; 32] = b.try_into().map_err(|_| CodecError::WrongType(n, "32-byte hash"))?;
    Ok(Hash32(arr))
}

fn u32_field(fields: &BTreeMap<u32, Value>, n: u32) -> Result<u32, CodecError> {
    fields.get(&n).and_then(Value::as_u32).ok_or(CodecError::MissingRequired(n))
}

fn u64_field(fields: &BTreeMap<u32, Value>, n: u32) -> Result<u64, CodecError> {
    fields.get(&n).and_then(Value::as_u64).ok_or(CodecError::MissingRequired(n))
}

// --- wrapper schemas for "array of scalar" (spec only allows array-of-object
// on the wire, so a lone scalar column is wrapped as a single-field object).

const WRAPPED_BYTES_SCHEMA: &[FieldSpec] =
    &[FieldSpec { number: 1, name: "value", ty: FieldType::Bytes, required: true }];
const WRAPPED_U32_SCHEMA: &[FieldSpec] =
    &[FieldSpec { number: 1, name: "value", ty: FieldType::UInt32, required: true }];

fn wrap_bytes_array(items: &[Bytes]) -> Value {
    Value::Array(
        items
            .iter()
            .map(|b| {
                let mut m = BTreeMap::new();
                m.insert(1, Value::Bytes(b.0.clone()));
                Value::Object(m)
            })
            .collect(),
    )
}

fn unwrap_bytes_array(v: Option<&Value>) -> Result<Vec<Bytes>, CodecError> {
    let Some(arr) = v.and_then(Value::as_array) else { return Ok(Vec::new()) };
    arr.iter()
        .map(|item| {
            let obj = item.as_object().ok_or(CodecError::WrongType(0, "object"))?;
            Ok(Bytes(bytes_field(obj, 1)?))
        })
        .collect()
}

fn wrap_u32_array(items: &[u32]) -> Value {
    Value::Array(
        items
            .iter()
            .map(|n| {
                let mut m = BTreeMap::new();
                m.insert(1, Value::UInt32(*n));
                Value::Object(m)
            })
            .collect(),
    )
}

fn unwrap_u32_array(v: Option<&Value>) -> Result<Vec<u32>, CodecError> {
    let Some(arr) = v.and_then(Value::as_array) else { return Ok(Vec::new()) };
    arr.iter()
        .map(|item| {
            let obj = item.as_object().ok_or(CodecError::WrongType(0, "object"))?;
            u32_field(obj, 1)
        })
        .collect()
}

// --- Transaction -----------------------------------------------------------

const SIGNATURES_SCHEMA: &[FieldSpec] = WRAPPED_BYTES_SCHEMA;

pub const TRANSACTION_SCHEMA: &[FieldSpec] = &[
    FieldSpec { number: 1, name: "moduleID", ty: FieldType::UInt32, required: true },
    FieldSpec { number: 2, name: "assetID", ty: FieldType::UInt32, required: true },
    FieldSpec { number: 3, name: "nonce", ty: FieldType::UInt64, required: true },
    FieldSpec { number: 4, name: "fee", ty: FieldType::UInt64, required: true },
    FieldSpec { number: 5, name: "senderPublicKey", ty: FieldType::Bytes, required: true },
    FieldSpec { number: 6, name: "signatures", ty: FieldType::ArrayOfObject(SIGNATURES_SCHEMA), required: false },
    FieldSpec { number: 7, name: "asset", ty: FieldType::Bytes, required: true },
];

impl Codable for Transaction {
    fn schema() -> &'static [FieldSpec] {
        TRANSACTION_SCHEMA
    }

    fn to_fields(&self) -> BTreeMap<u32, Value> {
        let mut m = BTreeMap::new();
        m.insert(1, Value::UInt32(self.module_id));
        m.insert(2, Value::UInt32(self.asset_id));
        m.insert(3, Value::UInt64(self.nonce));
        m.insert(4, Value::UInt64(self.fee));
        m.insert(5, Value::Bytes(self.sender_public_key.0.clone()));
        m.insert(6, wrap_bytes_array(&self.signatures));
        m.insert(7, Value::Bytes(self.asset.clone()));
        m
    }

    fn from_fields(fields: BTreeMap<u32, Value>) -> Result<Self, CodecError> {
        Ok(Transaction {
            module_id: u32_field(&fields, 1)?,
            asset_id: u32_field(&fields, 2)?,
            nonce: u64_field(&fields, 3)?,
            fee: u64_field(&fields, 4)?,
            sender_public_key: Bytes(bytes_field(&fields, 5)?),
            signatures: unwrap_bytes_array(fields.get(&6))?,
            asset: bytes_field(&fields, 7)?,
        })
    }
}

// --- BlockHeader -------------------------------------------------------------

const BLOCK_ASSET_SCHEMA: &[FieldSpec] = &[
    FieldSpec { number: 1, name: "moduleID", ty: FieldType::UInt32, required: true },
    FieldSpec { number: 2, name: "data", ty: FieldType::Bytes, required: true },
];

pub const BLOCK_HEADER_SCHEMA: &[FieldSpec] = &[
    FieldSpec { number: 1, name: "version", ty: FieldType::UInt32, required: true },
    FieldSpec { number: 2, name: "height", ty: FieldType::UInt32, required: true },
    FieldSpec { number: 3, name: "timestamp", ty: FieldType::UInt32, required: true },
    FieldSpec { number: 4, name: "previousBlockID", ty: FieldType::Bytes, required: true },
    FieldSpec { number: 5, name: "generatorAddress", ty: FieldType::Bytes, required: true },
    FieldSpec { number: 6, name: "transactionRoot", ty: FieldType::Bytes, required: true },
    FieldSpec { number: 7, name: "stateRoot", ty: FieldType::Bytes, required: true },
    FieldSpec { number: 8, name: "assets", ty: FieldType::ArrayOfObject(BLOCK_ASSET_SCHEMA), required: false },
    FieldSpec { number: 9, name: "signature", ty: FieldType::Bytes, required: false },
];

impl Codable for BlockHeader {
    fn schema() -> &'static [FieldSpec] {
        BLOCK_HEADER_SCHEMA
    }

    fn to_fields(&self) -> BTreeMap<u32, Value> {
        let mut m = BTreeMap::new();
        m.insert(1, Value::UInt32(self.version));
        m.insert(2, Value::UInt32(self.height));
        m.insert(3, Value::UInt32(self.timestamp));
        m.insert(4, Value::Bytes(self.previous_block_id.as_bytes().to_vec()));
        m.insert(5, Value::Bytes(self.generator_address.0.clone()));
        m.insert(6, Value::Bytes(self.transaction_root.as_bytes().to_vec()));
        m.insert(7, Value::Bytes(self.state_root.as_bytes().to_vec()));
        m.insert(
            8,
            Value::Array(
                self.assets
                    .iter()
                    .map(|a| {
                        let mut am = BTreeMap::new();
                        am.insert(1, Value::UInt32(a.module_id));
                        am.insert(2, Value::Bytes(a.data.clone()));
                        Value::Object(am)
                    })
                    .collect(),
            ),
        );
        if !self.signature.0.is_empty() {
            m.insert(9, Value::Bytes(self.signature.0.clone()));
        }
        m
    }

    fn from_fields(fields: BTreeMap<u32, Value>) -> Result<Self, CodecError> {
        let assets = match fields.get(&8).and_then(Value::as_array) {
            Some(items) => items
                .iter()
                .map(|item| {
                    let obj = item.as_object().ok_or(CodecError::WrongType(8, "object"))?;
                    Ok(BlockAsset { module_id: u32_field(obj, 1)?, data: bytes_field(obj, 2)? })
                })
                .collect::<Result<Vec<_>, CodecError>>()?,
            None => Vec::new(),
        };
        let signature = match fields.get(&9) {
            Some(v) => Bytes(v.as_bytes().ok_or(CodecError::WrongType(9, "bytes"))?.to_vec()),
            None => Bytes::default(),
        };
        Ok(BlockHeader {
            version: u32_field(&fields, 1)?,
            height: u32_field(&fields, 2)?,
            timestamp: u32_field(&fields, 3)?,
            previous_block_id: hash_field(&fields, 4)?,
            generator_address: Bytes(bytes_field(&fields, 5)?),
            transaction_root: hash_field(&fields, 6)?,
            state_root: hash_field(&fields, 7)?,
            assets,
            signature,
        })
    }
}

impl BlockHeader {
    /// `id = hash(encode(header-without-signature))` (spec §3): the id is
    /// computed over the unsigned form so that signing does not change it.
    pub fn compute_id(&self) -> Result<crate::block::BlockId, CodecError> {
        let encoded = self.without_signature().encode()?;
        Ok(Hash32::of(&encoded))
    }
}

// --- Block -------------------------------------------------------------------

pub const BLOCK_SCHEMA: &[FieldSpec] = &[
    FieldSpec { number: 1, name: "header", ty: FieldType::Object(BLOCK_HEADER_SCHEMA), required: true },
    FieldSpec { number: 2, name: "payload", ty: FieldType::ArrayOfObject(TRANSACTION_SCHEMA), required: false },
];

impl Codable for Block {
    fn schema() -> &'static [FieldSpec] {
        BLOCK_SCHEMA
    }

    fn to_fields(&self) -> BTreeMap<u32, Value> {
        let mut m = BTreeMap::new();
        m.insert(1, Value::Object(self.header.to_fields()));
        m.insert(2, Value::Array(self.payload.iter().map(|tx| Value::Object(tx.to_fields())).collect()));
        m
    }

    fn from_fields(fields: BTreeMap<u32, Value>) -> Result<Self, CodecError> {
        let header_obj = fields.get(&1).and_then(Value::as_object).ok_or(CodecError::MissingRequired(1))?;
        let header = BlockHeader::from_fields(header_obj.clone())?;
        let payload = match fields.get(&2).and_then(Value::as_array) {
            Some(items) => items
                .iter()
                .map(|item| {
                    let obj = item.as_object().ok_or(CodecError::WrongType(2, "object"))?;
                    Transaction::from_fields(obj.clone())
                })
                .collect::<Result<Vec<_>, CodecError>>()?,
            None => Vec::new(),
        };
        Ok(Block { header, payload })
    }
}

// --- Account -----------------------------------------------------------------

const VOTE_SCHEMA: &[FieldSpec] = &[
    FieldSpec { number: 1, name: "delegateAddress", ty: FieldType::Bytes, required: true },
    FieldSpec { number: 2, name: "amount", ty: FieldType::UInt64, required: true },
];
const UNLOCKING_SCHEMA: &[FieldSpec] = &[
    FieldSpec { number: 1, name: "delegateAddress", ty: FieldType::Bytes, required: true },
    FieldSpec { number: 2, name: "amount", ty: FieldType::UInt64, required: true },
    FieldSpec { number: 3, name: "unvoteHeight", ty: FieldType::UInt32, required: true },
];
const DPOS_ASSET_SCHEMA: &[FieldSpec] = &[
    FieldSpec { number: 1, name: "username", ty: FieldType::String, required: false },
    FieldSpec { number: 2, name: "pomHeights", ty: FieldType::ArrayOfObject(WRAPPED_U32_SCHEMA), required: false },
    FieldSpec { number: 3, name: "consecutiveMissedBlocks", ty: FieldType::UInt32, required: true },
    FieldSpec { number: 4, name: "lastForgedHeight", ty: FieldType::UInt32, required: true },
    FieldSpec { number: 5, name: "isBanned", ty: FieldType::Boolean, required: true },
    FieldSpec { number: 6, name: "totalVotesReceived", ty: FieldType::UInt64, required: true },
    FieldSpec { number: 7, name: "sentVotes", ty: FieldType::ArrayOfObject(VOTE_SCHEMA), required: false },
    FieldSpec { number: 8, name: "unlocking", ty: FieldType::ArrayOfObject(UNLOCKING_SCHEMA), required: false },
];
const ACCOUNT_KEYS_SCHEMA: &[FieldSpec] = &[
    FieldSpec { number: 1, name: "numberOfSignatures", ty: FieldType::UInt32, required: true },
    FieldSpec { number: 2, name: "mandatoryKeys", ty: FieldType::ArrayOfObject(WRAPPED_BYTES_SCHEMA), required: false },
    FieldSpec { number: 3, name: "optionalKeys", ty: FieldType::ArrayOfObject(WRAPPED_BYTES_SCHEMA), required: false },
];
pub const ACCOUNT_SCHEMA: &[FieldSpec] = &[
    FieldSpec { number: 1, name: "address", ty: FieldType::Bytes, required: true },
    FieldSpec { number: 2, name: "balance", ty: FieldType::UInt64, required: true },
    FieldSpec { number: 3, name: "nonce", ty: FieldType::UInt64, required: true },
    FieldSpec { number: 4, name: "keys", ty: FieldType::Object(ACCOUNT_KEYS_SCHEMA), required: true },
    FieldSpec { number: 5, name: "asset", ty: FieldType::Object(DPOS_ASSET_SCHEMA), required: true },
];

impl Codable for Account {
    fn schema() -> &'static [FieldSpec] {
        ACCOUNT_SCHEMA
    }

    fn to_fields(&self) -> BTreeMap<u32, Value> {
        let mut keys = BTreeMap::new();
        keys.insert(1, Value::UInt32(self.keys.number_of_signatures));
        keys.insert(2, wrap_bytes_array(&self.keys.mandatory_keys));
        keys.insert(3, wrap_bytes_array(&self.keys.optional_keys));

        let mut asset = BTreeMap::new();
        if let Some(username) = &self.asset.username {
            asset.insert(1, Value::String(username.clone()));
        }
        asset.insert(2, wrap_u32_array(&self.asset.pom_heights));
        asset.insert(3, Value::UInt32(self.asset.consecutive_missed_blocks));
        asset.insert(4, Value::UInt32(self.asset.last_forged_height));
        asset.insert(5, Value::Boolean(self.asset.is_banned));
        asset.insert(6, Value::UInt64(self.asset.total_votes_received));
        asset.insert(
            7,
            Value::Array(
                self.asset
                    .sent_votes
                    .iter()
                    .map(|v| {
                        let mut m = BTreeMap::new();
                        m.insert(1, Value::Bytes(v.delegate_address.0.clone()));
                        m.insert(2, Value::UInt64(v.amount));
                        Value::Object(m)
                    })
                    .collect(),
            ),
        );
        asset.insert(
            8,
            Value::Array(
                self.asset
                    .unlocking
                    .iter()
                    .map(|u| {
                        let mut m = BTreeMap::new();
                        m.insert(1, Value::Bytes(u.delegate_address.0.clone()));
                        m.insert(2, Value::UInt64(u.amount));
                        m.insert(3, Value::UInt32(u.unvote_height));
                        Value::Object(m)
                    })
                    .collect(),
            ),
        );

        let mut m = BTreeMap::new();
        m.insert(1, Value::Bytes(self.address.0.clone()));
        m.insert(2, Value::UInt64(self.balance));
        m.insert(3, Value::UInt64(self.nonce));
        m.insert(4, Value::Object(keys));
        m.insert(5, Value::Object(asset));
        m
    }

    fn from_fields(fields: BTreeMap<u32, Value>) -> Result<Self, CodecError> {
        let keys_obj = fields.get(&4).and_then(Value::as_object).ok_or(CodecError::MissingRequired(4))?;
        let keys = AccountKeys {
            number_of_signatures: u32_field(keys_obj, 1)?,
            mandatory_keys: unwrap_bytes_array(keys_obj.get(&2))?.into_iter().collect(),
            optional_keys: unwrap_bytes_array(keys_obj.get(&3))?.into_iter().collect(),
        };

        let asset_obj = fields.get(&5).and_then(Value::as_object).ok_or(CodecError::MissingRequired(5))?;
        let username = match asset_obj.get(&1) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };
        let sent_votes = match asset_obj.get(&7).and_then(Value::as_array) {
            Some(items) => items
                .iter()
                .map(|item| {
                    let obj = item.as_object().ok_or(CodecError::WrongType(7, "object"))?;
                    Ok(Vote { delegate_address: Bytes(bytes_field(obj, 1)?), amount: u64_field(obj, 2)? })
                })
                .collect::<Result<Vec<_>, CodecError>>()?,
            None => Vec::new(),
        };
        let unlocking = match asset_obj.get(&8).and_then(Value::as_array) {
            Some(items) => items
                .iter()
                .map(|item| {
                    let obj = item.as_object().ok_or(CodecError::WrongType(8, "object"))?;
                    Ok(Unlocking {
                        delegate_address: Bytes(bytes_field(obj, 1)?),
                        amount: u64_field(obj, 2)?,
                        unvote_height: u32_field(obj, 3)?,
                    })
                })
                .collect::<Result<Vec<_>, CodecError>>()?,
            None => Vec::new(),
        };
        let asset = DposAccountAsset {
            username,
            pom_heights: unwrap_u32_array(asset_obj.get(&2))?,
            consecutive_missed_blocks: u32_field(asset_obj, 3)?,
            last_forged_height: u32_field(asset_obj, 4)?,
            is_banned: matches!(asset_obj.get(&5), Some(Value::Boolean(true))),
            total_votes_received: u64_field(asset_obj, 6)?,
            sent_votes,
            unlocking,
        };

        Ok(Account {
            address: Bytes(bytes_field(&fields, 1)?),
            balance: u64_field(&fields, 2)?,
            nonce: u64_field(&fields, 3)?,
            keys,
            asset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> BlockHeader {
        BlockHeader {
            version: 2,
            height: 1,
            timestamp: 100,
            previous_block_id: Hash32::of(b"prev"),
            generator_address: Bytes(vec![1, 2, 3]),
            transaction_root: Hash32::of(b"root"),
            state_root: Hash32::of(b"state"),
            assets: vec![BlockAsset { module_id: 5, data: vec![9, 9] }],
            signature: Bytes(vec![7; 64]),
        }
    }

    #[test]
    fn block_header_round_trip() {
        let header = sample_header();
        let encoded = header.encode().unwrap();
        let decoded = BlockHeader::decode(&encoded).unwrap();
        assert_eq!(header, decoded);
        assert_eq!(encoded, decoded.encode().unwrap());
    }

    #[test]
    fn id_ignores_signature() {
        let mut header = sample_header();
        let id1 = header.compute_id().unwrap();
        header.signature = Bytes(vec![0; 64]);
        let id2 = header.compute_id().unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn transaction_round_trip() {
        let tx = Transaction {
            module_id: 5,
            asset_id: 0,
            nonce: 1,
            fee: 1000,
            sender_public_key: Bytes(vec![1; 32]),
            signatures: vec![Bytes(vec![2; 64])],
            asset: vec![10, 20, 30],
        };
        let encoded = tx.encode().unwrap();
        assert_eq!(Transaction::decode(&encoded).unwrap(), tx);
    }

    #[test]
    fn account_round_trip() {
        let mut account = Account::new(Bytes(vec![1, 2, 3, 4]));
        account.balance = 500;
        account.asset.username = Some("forger".into());
        account.asset.sent_votes.push(Vote { delegate_address: Bytes(vec![9]), amount: 100 });
        let encoded = account.encode().unwrap();
        assert_eq!(Account::decode(&encoded).unwrap(), account);
    }
}
