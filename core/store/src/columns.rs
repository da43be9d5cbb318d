use strum::{EnumIter, IntoStaticStr};

/// One RocksDB column family per storage domain from the key layout table in
/// spec §3. Using a column family per domain gives each domain its own
/// lexicographic key ordering for free, rather than multiplexing everything
/// behind a single leading prefix byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum DBCol {
    /// block id (32B) -> encoded header
    BlocksId,
    /// height (u32 BE) -> block id
    BlocksHeight,
    /// tx id (32B) -> encoded tx
    TxId,
    /// block id -> concatenation of 32-byte tx ids
    TxBlockId,
    /// height (u32 BE) -> encoded full block
    TempBlocksHeight,
    /// height (u32 BE) -> encoded state diff
    DiffState,
    /// single row -> u32 BE finalized height
    FinalizedHeight,
    /// address -> encoded account
    Accounts,
    /// module-scoped key -> opaque module bytes
    ChainState,
}

impl DBCol {
    pub fn all() -> impl Iterator<Item = DBCol> {
        use strum::IntoEnumIterator;
        DBCol::iter()
    }

    pub fn cf_name(self) -> &'static str {
        self.into()
    }

    /// Stable discriminant used when a column needs to be written to the
    /// wire (e.g. inside a persisted [`crate::kv`] diff record).
    pub fn as_u32(self) -> u32 {
        match self {
            DBCol::BlocksId => 0,
            DBCol::BlocksHeight => 1,
            DBCol::TxId => 2,
            DBCol::TxBlockId => 3,
            DBCol::TempBlocksHeight => 4,
            DBCol::DiffState => 5,
            DBCol::FinalizedHeight => 6,
            DBCol::Accounts => 7,
            DBCol::ChainState => 8,
        }
    }

    pub fn from_u32(n: u32) -> Option<Self> {
        Some(match n {
            0 => DBCol::BlocksId,
            1 => DBCol::BlocksHeight,
            2 => DBCol::TxId,
            3 => DBCol::TxBlockId,
            4 => DBCol::TempBlocksHeight,
            5 => DBCol::DiffState,
            6 => DBCol::FinalizedHeight,
            7 => DBCol::Accounts,
            8 => DBCol::ChainState,
            _ => return None,
        })
    }
}

pub fn height_key(height: u32) -> Vec<u8> {
    height.to_be_bytes().to_vec()
}
