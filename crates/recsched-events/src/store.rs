use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::{
    error::{EventStoreError, Result},
    rollover::{advance, Outcome},
    types::{EventRecord, RepeatRule, Tag},
};

/// In-memory table of scheduled recordings for one load→edit→save session.
///
/// The backing map is a `BTreeMap` so tag iteration is deterministic;
/// display/processing order is always ascending `start` via
/// [`tags_by_start`](Self::tags_by_start). Single-owner, synchronous: one
/// session process owns the store for its whole lifetime, so there is no
/// locking anywhere.
#[derive(Debug, Default)]
pub struct EventStore {
    events: BTreeMap<Tag, EventRecord>,
    /// Tags added during the current edit session, undone by `cancel_edits`.
    pending: Vec<Tag>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-persisted records (used by the loader).
    /// Loaded records are not pending — only fresh `add`s are.
    pub fn from_events(events: BTreeMap<Tag, EventRecord>) -> Self {
        Self {
            events,
            pending: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All records in tag order, for encoding and rendering.
    pub fn events(&self) -> &BTreeMap<Tag, EventRecord> {
        &self.events
    }

    /// Tags added during the current session and not yet committed.
    pub fn pending_tags(&self) -> &[Tag] {
        &self.pending
    }

    /// Insert a new record. The tag must not already exist; overwriting is
    /// an explicit caller decision via [`update`](Self::update).
    pub fn add(&mut self, tag: impl Into<Tag>, record: EventRecord) -> Result<()> {
        let tag = tag.into();
        if self.events.contains_key(&tag) {
            return Err(EventStoreError::DuplicateTag { tag });
        }
        info!(%tag, repeat = %record.repeat, "event added");
        self.events.insert(tag.clone(), record);
        self.pending.push(tag);
        Ok(())
    }

    /// Overwrite an existing record in place.
    pub fn update(&mut self, tag: &str, record: EventRecord) -> Result<()> {
        match self.events.get_mut(tag) {
            Some(slot) => {
                info!(%tag, "event updated");
                *slot = record;
                Ok(())
            }
            None => Err(EventStoreError::EventNotFound {
                tag: tag.to_string(),
            }),
        }
    }

    /// Remove a record. Idempotent: an absent tag is a no-op, returns false.
    pub fn delete(&mut self, tag: &str) -> bool {
        let removed = self.events.remove(tag).is_some();
        if removed {
            info!(%tag, "event deleted");
        }
        removed
    }

    pub fn lookup(&self, tag: &str) -> Option<&EventRecord> {
        self.events.get(tag)
    }

    /// All tags sorted ascending by `start`; unset starts order first, ties
    /// keep tag order. Stable across repeated calls within one session, so
    /// the same sequence serves display, commit, and cancel passes.
    pub fn tags_by_start(&self) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self.events.keys().cloned().collect();
        tags.sort_by_key(|tag| self.events[tag].start.unwrap_or(i64::MIN));
        tags
    }

    /// Run one rollover pass over every record: advance finished repeating
    /// events to their next occurrence, drop finished `Once` events and
    /// anything marked `Delete`.
    ///
    /// Called lazily by the collaborator before each display/listing — this
    /// is the whole scheduler, there is no timer.
    pub fn rollover_all(&mut self, now: i64) {
        // Snapshot: the pass deletes from the map it iterates.
        let tags: Vec<Tag> = self.events.keys().cloned().collect();
        for tag in tags {
            self.rollover_one(&tag, now);
        }
    }

    fn rollover_one(&mut self, tag: &str, now: i64) {
        let Some(record) = self.events.get(tag) else {
            return;
        };
        match advance(record, now) {
            Outcome::Unchanged => {}
            Outcome::Updated { start, stop } => {
                info!(%tag, start, stop, "event rolled over to next occurrence");
                if let Some(record) = self.events.get_mut(tag) {
                    record.start = Some(start);
                    record.stop = Some(stop);
                }
            }
            Outcome::Remove => {
                info!(%tag, "event expired, removing");
                self.events.remove(tag);
            }
        }
    }

    /// The capture collaborator's hook, invoked when a recording fires. A
    /// `Once` event is retired to `Deleted` (still visible, never fires
    /// again); any other rule gets one normal rollover pass. Returns false
    /// for an unknown tag.
    pub fn mark_recorded(&mut self, tag: &str, now: i64) -> bool {
        let Some(record) = self.events.get_mut(tag) else {
            return false;
        };
        if record.repeat == RepeatRule::Once {
            info!(%tag, "once event recorded, retiring to Deleted");
            record.repeat = RepeatRule::Deleted;
        } else {
            self.rollover_one(tag, now);
        }
        true
    }

    /// End the edit session by applying the collaborator's edited views: a
    /// view with repeat `Delete` removes the tag, any other view overwrites
    /// the record wholesale. Tags without a view are left untouched. Clears
    /// the pending list; persisting the result is the caller's next move.
    pub fn commit_edits(&mut self, edits: &BTreeMap<Tag, EventRecord>) {
        for tag in self.tags_by_start() {
            let Some(view) = edits.get(&tag) else {
                warn!(%tag, "no edited view for event, leaving as-is");
                continue;
            };
            if view.repeat == RepeatRule::Delete {
                self.delete(&tag);
            } else {
                self.events.insert(tag, view.clone());
            }
        }
        self.pending.clear();
    }

    /// Abort the edit session: every tag added since the last commit is
    /// removed, previously-existing records stay as they are.
    pub fn cancel_edits(&mut self) {
        if self.pending.is_empty() {
            debug!("cancel with no pending additions");
        }
        for tag in std::mem::take(&mut self.pending) {
            self.delete(&tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(start: i64, repeat: RepeatRule) -> EventRecord {
        EventRecord {
            start: Some(start),
            stop: Some(start + 1800),
            repeat,
            ..Default::default()
        }
    }

    #[test]
    fn tags_sort_by_ascending_start() {
        let mut store = EventStore::new();
        store.add("c", record(300, RepeatRule::Once)).unwrap();
        store.add("a", record(100, RepeatRule::Once)).unwrap();
        store.add("b", record(200, RepeatRule::Once)).unwrap();

        assert_eq!(store.tags_by_start(), vec!["a", "b", "c"]);
    }

    #[test]
    fn unset_start_orders_first_and_ties_are_stable() {
        let mut store = EventStore::new();
        store.add("z", record(100, RepeatRule::Once)).unwrap();
        store
            .add("m", EventRecord::default())
            .unwrap();
        store.add("a", record(100, RepeatRule::Once)).unwrap();

        // Tie between "a" and "z" keeps tag (BTreeMap) order.
        assert_eq!(store.tags_by_start(), vec!["m", "a", "z"]);
        assert_eq!(store.tags_by_start(), store.tags_by_start());
    }

    #[test]
    fn duplicate_add_is_rejected_and_leaves_record_alone() {
        let mut store = EventStore::new();
        store.add("a", record(100, RepeatRule::Once)).unwrap();

        let err = store.add("a", record(999, RepeatRule::Daily)).unwrap_err();
        assert!(matches!(err, EventStoreError::DuplicateTag { .. }));
        assert_eq!(store.lookup("a").unwrap().start, Some(100));
        assert_eq!(store.pending_tags(), ["a"]);
    }

    #[test]
    fn update_requires_existing_tag() {
        let mut store = EventStore::new();
        let err = store.update("a", record(1, RepeatRule::Once)).unwrap_err();
        assert!(matches!(err, EventStoreError::EventNotFound { .. }));

        store.add("a", record(100, RepeatRule::Once)).unwrap();
        store.update("a", record(500, RepeatRule::Weekly)).unwrap();
        assert_eq!(store.lookup("a").unwrap().repeat, RepeatRule::Weekly);
        // update never touches the pending list
        assert_eq!(store.pending_tags(), ["a"]);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = EventStore::new();
        store.add("a", record(100, RepeatRule::Once)).unwrap();
        assert!(store.delete("a"));
        assert!(!store.delete("a"));
        assert!(!store.delete("never-existed"));
    }

    #[test]
    fn cancel_undoes_session_additions_only() {
        let mut events = BTreeMap::new();
        events.insert("old".to_string(), record(50, RepeatRule::Daily));
        let mut store = EventStore::from_events(events);

        store.add("a", record(100, RepeatRule::Once)).unwrap();
        store.add("b", record(200, RepeatRule::Once)).unwrap();
        store.cancel_edits();

        assert_eq!(store.tags_by_start(), vec!["old"]);
        assert!(store.pending_tags().is_empty());
    }

    #[test]
    fn cancel_on_empty_store_leaves_it_empty() {
        let mut store = EventStore::new();
        store.add("a", record(100, RepeatRule::Once)).unwrap();
        store.add("b", record(200, RepeatRule::Once)).unwrap();
        store.cancel_edits();

        assert!(store.is_empty());
        assert!(store.pending_tags().is_empty());
    }

    #[test]
    fn rollover_shifts_and_removes() {
        let mut store = EventStore::new();
        store.add("done", record(100, RepeatRule::Once)).unwrap();
        store.add("daily", record(200, RepeatRule::Daily)).unwrap();
        store.add("future", record(90_000, RepeatRule::Once)).unwrap();
        store
            .add("marked", record(90_000, RepeatRule::Delete))
            .unwrap();

        store.rollover_all(10_000);

        assert!(store.lookup("done").is_none());
        assert!(store.lookup("marked").is_none());
        assert_eq!(store.lookup("future").unwrap().start, Some(90_000));
        let daily = store.lookup("daily").unwrap();
        assert_eq!(daily.start, Some(200 + crate::rollover::DAY_SECS));
        assert_eq!(daily.stop, Some(2_000 + crate::rollover::DAY_SECS));
    }

    #[test]
    fn rollover_removing_pending_tag_keeps_cancel_safe() {
        let mut store = EventStore::new();
        store.add("a", record(100, RepeatRule::Once)).unwrap();
        store.rollover_all(10_000);
        assert!(store.is_empty());

        // "a" is still pending but already gone; cancel must not blow up.
        store.cancel_edits();
        assert!(store.is_empty());
        assert!(store.pending_tags().is_empty());
    }

    #[test]
    fn commit_applies_views_and_honours_delete() {
        let mut store = EventStore::new();
        store.add("a", record(100, RepeatRule::Daily)).unwrap();
        store.add("b", record(200, RepeatRule::Once)).unwrap();

        let mut edits = BTreeMap::new();
        edits.insert("a".to_string(), record(100, RepeatRule::Delete));
        let mut view_b = record(200, RepeatRule::Weekly);
        view_b.title = Some("movie night".to_string());
        edits.insert("b".to_string(), view_b);

        store.commit_edits(&edits);

        assert!(store.lookup("a").is_none());
        assert!(!store.tags_by_start().contains(&"a".to_string()));
        let b = store.lookup("b").unwrap();
        assert_eq!(b.repeat, RepeatRule::Weekly);
        assert_eq!(b.title.as_deref(), Some("movie night"));
        assert!(store.pending_tags().is_empty());
    }

    #[test]
    fn commit_leaves_unviewed_tags_untouched() {
        let mut store = EventStore::new();
        store.add("a", record(100, RepeatRule::Daily)).unwrap();
        store.commit_edits(&BTreeMap::new());
        assert_eq!(store.lookup("a").unwrap().repeat, RepeatRule::Daily);
        assert!(store.pending_tags().is_empty());
    }

    #[test]
    fn mark_recorded_retires_once_to_deleted() {
        let mut store = EventStore::new();
        store.add("a", record(100, RepeatRule::Once)).unwrap();

        assert!(store.mark_recorded("a", 150));
        assert_eq!(store.lookup("a").unwrap().repeat, RepeatRule::Deleted);

        // Retired events survive any number of later rollover passes.
        store.rollover_all(1_000_000);
        assert_eq!(store.lookup("a").unwrap().repeat, RepeatRule::Deleted);
    }

    #[test]
    fn mark_recorded_rolls_repeating_events_once() {
        let mut store = EventStore::new();
        store.add("d", record(100, RepeatRule::Daily)).unwrap();

        assert!(store.mark_recorded("d", 10_000));
        let d = store.lookup("d").unwrap();
        assert_eq!(d.start, Some(100 + crate::rollover::DAY_SECS));

        assert!(!store.mark_recorded("ghost", 10_000));
    }
}
