//! Concrete delegate-voting module (spec's Account asset data model, §4.7
//! supplement): `registerDelegate`, `voteDelegate` and `unlock` wired over
//! `lisk_processor`'s generic module registry.
pub mod error;
pub mod module;
pub mod payload;

pub use error::DposError;
pub use module::build;
