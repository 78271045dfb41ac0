//! Binary persistence format for the event table.
//!
//! One file holds the whole tag→record mapping. All integers are
//! little-endian:
//!
//! ```text
//! store  := u32 count , count × entry
//! entry  := str tag , u32 nfields , nfields × field
//! field  := str name , value
//! value  := 0x00                      absent / null
//!         | 0x01 i64                  integer (8 bytes)
//!         | 0x02 str                  string
//! str    := u32 len , len bytes of UTF-8
//! ```
//!
//! The writer always emits all five record fields in a fixed order
//! (`channel`, `start`, `stop`, `repeat`, `title`) so output is
//! deterministic. The reader is tolerant: fields may come in any order, a
//! missing or absent `repeat` means `Once`, unrecognized `repeat` labels are
//! preserved, and unknown field names are skipped with a warning. Structural
//! damage — truncation, an unknown value tag, a length overrunning the
//! buffer, non-UTF-8 text, trailing bytes — is `CorruptStore`. There is no
//! version field.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::{
    error::{EventStoreError, Result},
    store::EventStore,
    types::{EventRecord, RepeatRule, Tag},
};

const TAG_ABSENT: u8 = 0x00;
const TAG_INT: u8 = 0x01;
const TAG_STR: u8 = 0x02;

const FIELD_COUNT: u32 = 5;

/// Load the event table from `path`.
///
/// A missing file is a first run and yields an empty store; any other read
/// failure, and any decode failure, is surfaced as an error.
pub fn load(path: &Path) -> Result<EventStore> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no event file yet, starting empty");
            return Ok(EventStore::new());
        }
        Err(e) => {
            return Err(EventStoreError::ReadFailed {
                path: path.display().to_string(),
                source: e,
            })
        }
    };
    let store = decode(&bytes)?;
    debug!(path = %path.display(), events = store.len(), "event file loaded");
    Ok(store)
}

/// Persist the full event table to `path`.
///
/// Encodes into memory, writes a sibling temp file, then renames over the
/// target, so a crash mid-write leaves the previous file intact.
pub fn save(path: &Path, store: &EventStore) -> Result<()> {
    let write_failed = |e: std::io::Error| EventStoreError::WriteFailed {
        path: path.display().to_string(),
        source: e,
    };

    let bytes = encode(store);
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, &bytes).map_err(write_failed)?;
    std::fs::rename(&tmp, path).map_err(write_failed)?;
    info!(path = %path.display(), events = store.len(), "event file saved");
    Ok(())
}

/// Encode the store. Entries come out in tag order; infallible.
pub fn encode(store: &EventStore) -> Vec<u8> {
    let events = store.events();
    let mut out = Vec::new();
    put_u32(&mut out, events.len() as u32);
    for (tag, record) in events {
        put_str(&mut out, tag);
        put_u32(&mut out, FIELD_COUNT);

        put_str(&mut out, "channel");
        put_opt_str(&mut out, record.channel.as_deref());

        put_str(&mut out, "start");
        put_opt_int(&mut out, record.start);

        put_str(&mut out, "stop");
        put_opt_int(&mut out, record.stop);

        put_str(&mut out, "repeat");
        put_opt_str(&mut out, Some(record.repeat.label()));

        put_str(&mut out, "title");
        put_opt_str(&mut out, record.title.as_deref());
    }
    out
}

/// Decode a full store image. Trailing bytes after the last entry are
/// treated as corruption, not ignored.
pub fn decode(bytes: &[u8]) -> Result<EventStore> {
    let mut r = Reader::new(bytes);
    let count = r.u32("entry count")?;
    let mut events: BTreeMap<Tag, EventRecord> = BTreeMap::new();
    for _ in 0..count {
        let (tag, record) = decode_entry(&mut r)?;
        events.insert(tag, record);
    }
    if !r.at_end() {
        return Err(EventStoreError::CorruptStore(format!(
            "{} trailing bytes after last entry",
            r.remaining()
        )));
    }
    Ok(EventStore::from_events(events))
}

fn decode_entry(r: &mut Reader<'_>) -> Result<(Tag, EventRecord)> {
    let tag = r.str("entry tag")?;
    let nfields = r.u32("field count")?;
    let mut record = EventRecord::default();
    for _ in 0..nfields {
        let name = r.str("field name")?;
        match name.as_str() {
            "channel" => record.channel = r.opt_str("channel")?,
            "title" => record.title = r.opt_str("title")?,
            "start" => record.start = r.opt_int("start")?,
            "stop" => record.stop = r.opt_int("stop")?,
            "repeat" => {
                // Absent repeat means Once; unknown labels survive verbatim.
                record.repeat = match r.opt_str("repeat")? {
                    Some(label) => RepeatRule::from(label),
                    None => RepeatRule::Once,
                };
            }
            other => {
                warn!(tag = %tag, field = %other, "skipping unknown field in event file");
                r.skip_value(other)?;
            }
        }
    }
    Ok((tag, record))
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_str(out: &mut Vec<u8>, s: &str) {
    put_u32(out, s.len() as u32);
    out.extend_from_slice(s.as_bytes());
}

fn put_opt_str(out: &mut Vec<u8>, s: Option<&str>) {
    match s {
        Some(s) => {
            out.push(TAG_STR);
            put_str(out, s);
        }
        None => out.push(TAG_ABSENT),
    }
}

fn put_opt_int(out: &mut Vec<u8>, v: Option<i64>) {
    match v {
        Some(v) => {
            out.push(TAG_INT);
            out.extend_from_slice(&v.to_le_bytes());
        }
        None => out.push(TAG_ABSENT),
    }
}

/// Bounds-checked cursor over the raw file image. Every read names what it
/// was after so corruption errors say where decoding fell over.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(EventStoreError::CorruptStore(format!(
                "truncated while reading {what}: wanted {n} bytes, {} left",
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }

    fn u32(&mut self, what: &str) -> Result<u32> {
        let raw = self.take(4, what)?;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(raw);
        Ok(u32::from_le_bytes(buf))
    }

    fn i64(&mut self, what: &str) -> Result<i64> {
        let raw = self.take(8, what)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(raw);
        Ok(i64::from_le_bytes(buf))
    }

    fn str(&mut self, what: &str) -> Result<String> {
        let len = self.u32(what)? as usize;
        let raw = self.take(len, what)?;
        String::from_utf8(raw.to_vec()).map_err(|_| {
            EventStoreError::CorruptStore(format!("{what} is not valid UTF-8"))
        })
    }

    fn opt_str(&mut self, what: &str) -> Result<Option<String>> {
        match self.u8(what)? {
            TAG_ABSENT => Ok(None),
            TAG_STR => Ok(Some(self.str(what)?)),
            other => Err(EventStoreError::CorruptStore(format!(
                "field {what}: expected string or absent, got value tag {other:#04x}"
            ))),
        }
    }

    fn opt_int(&mut self, what: &str) -> Result<Option<i64>> {
        match self.u8(what)? {
            TAG_ABSENT => Ok(None),
            TAG_INT => Ok(Some(self.i64(what)?)),
            other => Err(EventStoreError::CorruptStore(format!(
                "field {what}: expected integer or absent, got value tag {other:#04x}"
            ))),
        }
    }

    /// Consume one value of any type (used for unknown field names).
    fn skip_value(&mut self, what: &str) -> Result<()> {
        match self.u8(what)? {
            TAG_ABSENT => Ok(()),
            TAG_INT => self.i64(what).map(|_| ()),
            TAG_STR => self.str(what).map(|_| ()),
            other => Err(EventStoreError::CorruptStore(format!(
                "field {what}: unknown value tag {other:#04x}"
            ))),
        }
    }
}
