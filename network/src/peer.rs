use async_trait::async_trait;
use lisk_primitives::TransactionId;

/// Identifies the remote end of a handler call. Real transports carry a lot
/// more (socket addr, protocol version); the processor only ever needs the
/// id, for penalty attribution and outbound requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerContext {
    pub peer_id: String,
}

impl PeerContext {
    pub fn new(peer_id: impl Into<String>) -> Self {
        PeerContext { peer_id: peer_id.into() }
    }
}

/// Outbound `requestFromPeer` (spec §4.9's `handleEventPostTransactionsAnnouncement`).
/// The concrete socket/libp2p transport is out of scope (spec §1); `node`
/// wires up whatever sends the request and decodes the response into
/// encoded transaction bytes.
#[async_trait]
pub trait PeerRequester: Send + Sync {
    async fn request_transactions(&self, peer_id: &str, ids: &[TransactionId]) -> Vec<Vec<u8>>;
}

/// Answers every request with nothing; useful for handlers that only ever
/// observe ids already resolvable locally (tests, and any deployment that
/// doesn't yet wire up a real peer transport).
pub struct NoPeerRequester;

#[async_trait]
impl PeerRequester for NoPeerRequester {
    async fn request_transactions(&self, _peer_id: &str, _ids: &[TransactionId]) -> Vec<Vec<u8>> {
        Vec::new()
    }
}
