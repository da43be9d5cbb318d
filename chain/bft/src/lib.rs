pub mod error;
pub mod finality;
pub mod fork_status;

pub use error::BftError;
pub use finality::FinalityTracker;
pub use fork_status::{compute_fork_status, ForkStatus};
