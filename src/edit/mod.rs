//! # edit
//!
//! The mutation engine: allele resolution, metadata application, and the
//! per-batch driver that ties them to record decode/encode and
//! validation.

mod driver;
mod metadata;
mod resolve;

pub use driver::{BatchOutcome, CancelToken, Driver, RunSummary};
pub use metadata::{apply_assignments, MetadataField};
pub use resolve::{resolve, ResolvedCall};
