//! `recsched-core` — shared leaf crate for the recording scheduler.
//!
//! Holds the pieces every other crate needs: the [`config`] loader
//! (recsched.toml + `RECSCHED_*` env overrides), the core error type, and
//! the [`wallclock`] time codec that maps between 12-hour wall-clock fields
//! and the offset-normalized instants the event store works in.

pub mod config;
pub mod error;
pub mod wallclock;

pub use config::RecorderConfig;
pub use error::{CoreError, Result};
pub use wallclock::{Meridiem, TimeCodec, WallClock};
