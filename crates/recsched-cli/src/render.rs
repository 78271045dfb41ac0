//! Text and JSON rendering of the event table, plus stamp parsing.
//!
//! Stamps are the grid editor's shape: `MM/DD/YYYY HH:MM AM`. All
//! conversion goes through the wall-clock codec so the CLI and the stored
//! timeline can never drift apart.

use anyhow::{anyhow, Context};
use recsched_core::wallclock::{Meridiem, TimeCodec, WallClock};
use recsched_events::{EventRecord, EventStore};
use serde::Serialize;

/// One row of `list --json` output.
#[derive(Debug, Serialize)]
pub struct ListingRow<'a> {
    pub tag: &'a str,
    #[serde(flatten)]
    pub record: &'a EventRecord,
}

/// Parse a `MM/DD/YYYY HH:MM AM` stamp into an instant.
pub fn parse_stamp(codec: &TimeCodec, s: &str) -> anyhow::Result<i64> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    let [date, time, ampm] = parts[..] else {
        return Err(anyhow!("expected `MM/DD/YYYY HH:MM AM`, got `{s}`"));
    };

    let date_parts: Vec<&str> = date.split('/').collect();
    let [month, day, year] = date_parts[..] else {
        return Err(anyhow!("expected date as MM/DD/YYYY, got `{date}`"));
    };
    let time_parts: Vec<&str> = time.split(':').collect();
    let [hour12, minute] = time_parts[..] else {
        return Err(anyhow!("expected time as HH:MM, got `{time}`"));
    };

    let wc = WallClock {
        hour12: hour12.parse().with_context(|| format!("bad hour `{hour12}`"))?,
        minute: minute.parse().with_context(|| format!("bad minute `{minute}`"))?,
        meridiem: ampm
            .parse::<Meridiem>()
            .map_err(|e| anyhow!("bad meridiem: {e}"))?,
        day: day.parse().with_context(|| format!("bad day `{day}`"))?,
        month: month.parse().with_context(|| format!("bad month `{month}`"))?,
        year: year.parse().with_context(|| format!("bad year `{year}`"))?,
    };
    codec
        .compose(&wc)
        .ok_or_else(|| anyhow!("`{s}` is not a real calendar time"))
}

/// Render an instant as `MM/DD/YYYY HH:MM AM`; unset fields show as `--`.
pub fn format_stamp(codec: &TimeCodec, instant: Option<i64>) -> String {
    let Some(wc) = instant.and_then(|i| codec.decompose(i)) else {
        return "--".to_string();
    };
    format!(
        "{:02}/{:02}/{:04} {:2}:{:02} {}",
        wc.month, wc.day, wc.year, wc.hour12, wc.minute, wc.meridiem
    )
}

/// One line per event, sorted by start, the console listing the original
/// recorder printed.
pub fn print_table(codec: &TimeCodec, store: &EventStore) {
    for tag in store.tags_by_start() {
        if let Some(record) = store.lookup(&tag) {
            print_record(codec, &tag, record);
        }
    }
}

pub fn print_record(codec: &TimeCodec, tag: &str, record: &EventRecord) {
    let start = format_stamp(codec, record.start);
    // Stop shares the start's date on screen, so only its time-of-day shows.
    let stop = format_stamp(codec, record.stop);
    let stop_time = stop.split_once(' ').map_or(stop.as_str(), |(_, t)| t);
    println!(
        "{tag}  {start} - {stop_time}  [{}]  ch {}  {}",
        record.repeat,
        record.channel.as_deref().unwrap_or("-"),
        record.title.as_deref().unwrap_or(""),
    );
}

pub fn print_json(store: &EventStore) -> anyhow::Result<()> {
    let tags = store.tags_by_start();
    let rows: Vec<ListingRow<'_>> = tags
        .iter()
        .filter_map(|tag| {
            store.lookup(tag).map(|record| ListingRow {
                tag: tag.as_str(),
                record,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
