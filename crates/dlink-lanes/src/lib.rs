//! Datalog submission lanes for dlink.
//!
//! A lane guards record submission for one signing identity so that at most
//! one ledger transaction is in flight for it at any time:
//!
//! - [`StateLane`] coalesces bursts: only the most recent waiting request is
//!   submitted once the lane frees, after a short settle delay.
//! - [`CredentialLane`] never drops a request: waiters are serialized and
//!   each one cools down before submitting.
//!
//! Both lanes submit through a [`RecordSubmitter`], which runs the blocking
//! ledger call on a [`dlink_ledger::BlockingExecutor`]. Failures never cross
//! the lane boundary; callers receive `None` instead of a receipt.

pub mod config;
pub mod credential_lane;
pub mod error;
pub mod state;
pub mod state_lane;
pub mod submitter;

#[cfg(test)]
mod testing;

pub use config::LaneConfig;
pub use credential_lane::CredentialLane;
pub use error::SubmitError;
pub use state::LaneState;
pub use state_lane::StateLane;
pub use submitter::{RecordSubmitter, SubmissionTarget};
