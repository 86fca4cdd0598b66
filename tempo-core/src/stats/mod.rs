//! Run statistics
//!
//! Actions report into a shared [`RunRecorder`] themselves; the dispatch
//! strategies never look at results. After a run, [`RunRecorder::summary`]
//! condenses the records into a serializable [`RunSummary`].

pub mod recorder;

pub use recorder::{DistributionSummary, RunRecorder, RunSummary};
