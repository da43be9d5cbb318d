use lisk_primitives::BlockHeader;

use crate::error::BftError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForkStatus {
    IdenticalBlock,
    ValidBlock,
    DoubleForging,
    TieBreak,
    DifferentChain,
    Discard,
}

/// Spec §4.5: derives fork status for `incoming` against the current tip.
/// The six variants are matched exhaustively at every call site — there is
/// no `Unknown` case because the computation here covers every input pair.
pub fn compute_fork_status(incoming: &BlockHeader, current: &BlockHeader) -> Result<ForkStatus, BftError> {
    let incoming_id = incoming.compute_id()?;
    let current_id = current.compute_id()?;

    if incoming_id == current_id {
        return Ok(ForkStatus::IdenticalBlock);
    }

    if incoming.height == current.height {
        if incoming.generator_address == current.generator_address {
            return Ok(ForkStatus::DoubleForging);
        }
        return Ok(if prefers_incoming(incoming, &incoming_id, current, &current_id) {
            ForkStatus::TieBreak
        } else {
            ForkStatus::Discard
        });
    }

    if incoming.height == current.height + 1 && incoming.previous_block_id == current_id {
        return Ok(ForkStatus::ValidBlock);
    }

    if incoming.height > current.height + 1 || incoming.previous_block_id != current_id {
        return Ok(ForkStatus::DifferentChain);
    }

    Ok(ForkStatus::Discard)
}

/// Earlier timestamp wins the slot; ties break on lower lexicographic id.
fn prefers_incoming(
    incoming: &BlockHeader,
    incoming_id: &lisk_primitives::BlockId,
    current: &BlockHeader,
    current_id: &lisk_primitives::BlockId,
) -> bool {
    match incoming.timestamp.cmp(&current.timestamp) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => incoming_id.as_bytes() < current_id.as_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use lisk_primitives::{Address, BlockAsset, Bytes, Hash32};

    use super::*;

    fn header(height: u32, timestamp: u32, generator: u8, previous: lisk_primitives::BlockId) -> BlockHeader {
        BlockHeader {
            version: 1,
            height,
            timestamp,
            previous_block_id: previous,
            generator_address: Address(vec![generator]),
            transaction_root: Hash32::ZERO,
            state_root: Hash32::ZERO,
            assets: vec![BlockAsset { module_id: 0, data: vec![] }],
            signature: Bytes(vec![]),
        }
    }

    #[test]
    fn identical_block_when_ids_match() {
        let current = header(10, 100, 1, Hash32::ZERO);
        let incoming = current.clone();
        assert_eq!(compute_fork_status(&incoming, &current).unwrap(), ForkStatus::IdenticalBlock);
    }

    #[test]
    fn valid_block_extends_tip() {
        let current = header(10, 100, 1, Hash32::ZERO);
        let current_id = current.compute_id().unwrap();
        let incoming = header(11, 110, 2, current_id);
        assert_eq!(compute_fork_status(&incoming, &current).unwrap(), ForkStatus::ValidBlock);
    }

    #[test]
    fn double_forging_same_height_same_generator() {
        let current = header(10, 100, 1, Hash32::ZERO);
        let incoming = header(10, 105, 1, Hash32::of(b"other-parent"));
        assert_eq!(compute_fork_status(&incoming, &current).unwrap(), ForkStatus::DoubleForging);
    }

    #[test]
    fn tie_break_prefers_earlier_slot() {
        let current = header(10, 100, 1, Hash32::ZERO);
        let incoming = header(10, 90, 2, Hash32::ZERO);
        assert_eq!(compute_fork_status(&incoming, &current).unwrap(), ForkStatus::TieBreak);
    }

    #[test]
    fn same_height_later_slot_is_discarded() {
        let current = header(10, 100, 1, Hash32::ZERO);
        let incoming = header(10, 110, 2, Hash32::ZERO);
        assert_eq!(compute_fork_status(&incoming, &current).unwrap(), ForkStatus::Discard);
    }

    #[test]
    fn different_chain_when_ahead_by_more_than_one() {
        let current = header(10, 100, 1, Hash32::ZERO);
        let incoming = header(12, 120, 2, Hash32::of(b"unrelated"));
        assert_eq!(compute_fork_status(&incoming, &current).unwrap(), ForkStatus::DifferentChain);
    }

    #[test]
    fn different_chain_when_parent_mismatches_at_next_height() {
        let current = header(10, 100, 1, Hash32::ZERO);
        let incoming = header(11, 110, 2, Hash32::of(b"not-current-id"));
        assert_eq!(compute_fork_status(&incoming, &current).unwrap(), ForkStatus::DifferentChain);
    }

    #[test]
    fn discard_when_behind_tip() {
        let current = header(10, 100, 1, Hash32::ZERO);
        let incoming = header(9, 90, 1, Hash32::ZERO);
        assert_eq!(compute_fork_status(&incoming, &current).unwrap(), ForkStatus::Discard);
    }
}
