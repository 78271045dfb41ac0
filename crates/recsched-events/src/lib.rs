//! `recsched-events` — recurrence engine and event store for scheduled
//! recordings.
//!
//! # Overview
//!
//! Events are kept in an in-memory [`store::EventStore`] keyed by an opaque
//! caller-chosen tag and persisted as a single binary file (see [`marshal`]).
//! There is no background scheduler: the collaborator drives a lazy
//! [`rollover`](store::EventStore::rollover_all) pass before each display or
//! listing, which advances or removes events whose stop time has passed.
//!
//! # Repeat rules
//!
//! | Rule            | Behaviour once the stop time has passed              |
//! |-----------------|------------------------------------------------------|
//! | `Once`          | Removed from the store                               |
//! | `Daily`         | Start/stop shifted forward one day                   |
//! | `Weekly`        | Start/stop shifted forward seven days                |
//! | `Monday-Friday` | Shifted one day, same as `Daily` (no weekend skip)   |
//! | `Delete`        | Removed unconditionally, even before the stop time   |
//! | `Deleted`       | Kept as-is (already recorded, display only)          |

pub mod error;
pub mod marshal;
pub mod rollover;
pub mod store;
pub mod types;

pub use error::{EventStoreError, Result};
pub use rollover::{advance, Outcome};
pub use store::EventStore;
pub use types::{EventRecord, RepeatRule, Tag};
