// SPDX-License-Identifier: MIT OR Apache-2.0

//! From candidate documents to reported matches: the possible-match
//! lifecycle, batch scheduling per root, and match reporting.

pub mod possible_match;
pub mod report;
pub mod scheduler;

pub use possible_match::PossibleMatch;
pub use report::{Accuracy, Completion, MatchRecord, MatchReporter, SearchRequestor};
pub use scheduler::{BatchScheduler, ScheduleStats};
