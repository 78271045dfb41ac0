use tracing::warn;

use crate::types::{EventRecord, RepeatRule};

/// One day in seconds. Shifts are fixed-width with no daylight-saving
/// adjustment; the schedule timeline is offset-normalized and flat.
pub const DAY_SECS: i64 = 24 * 60 * 60;
pub const WEEK_SECS: i64 = 7 * DAY_SECS;

/// What a rollover pass should do with one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Leave the record exactly as it is.
    Unchanged,
    /// Rewrite start/stop to the next occurrence; all other fields untouched.
    Updated { start: i64, stop: i64 },
    /// Remove the record from the store.
    Remove,
}

/// Compute the rollover outcome for `record` at time `now`.
///
/// Never fails and never panics, whatever state the record is in:
/// `Unchanged` is the safe default for anything the engine does not
/// recognize — unknown rules never self-delete.
pub fn advance(record: &EventRecord, now: i64) -> Outcome {
    // Delete wins over everything, including future stop times.
    if record.repeat == RepeatRule::Delete {
        return Outcome::Remove;
    }

    // An event the engine cannot date is left alone.
    let Some(stop) = record.stop else {
        return Outcome::Unchanged;
    };

    // In-progress or future events never roll over.
    if stop > now {
        return Outcome::Unchanged;
    }

    let shift = match record.repeat {
        RepeatRule::Once => return Outcome::Remove,
        RepeatRule::Daily => DAY_SECS,
        // Labelled weekdays-only but shifts one day like Daily; the original
        // recorder never skipped weekends and neither do we.
        RepeatRule::MondayFriday => DAY_SECS,
        RepeatRule::Weekly => WEEK_SECS,
        RepeatRule::Deleted => return Outcome::Unchanged,
        RepeatRule::Other(ref label) => {
            warn!(repeat = %label, "unrecognized repeat rule, not rolling over");
            return Outcome::Unchanged;
        }
        RepeatRule::Delete => return Outcome::Remove,
    };

    // A shifting rule with no start is malformed; never half-shift it.
    let Some(start) = record.start else {
        warn!(repeat = %record.repeat, "record has a stop but no start, not rolling over");
        return Outcome::Unchanged;
    };

    Outcome::Updated {
        start: start + shift,
        stop: stop + shift,
    }
}
