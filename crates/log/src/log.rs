//! The append-and-notify stream store.

use crate::walker::{WalkerId, WalkerState};
use crate::StreamEmptyError;
use sensorgraph_types::{DataStream, DataStreamSelector, Reading, StreamKind};
use std::collections::{BTreeMap, VecDeque};
use tracing::trace;

/// How a stream's readings are retained, decided by its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Retention {
    /// Full history until consumed; readings get ids.
    History,
    /// Latest reading only, pending count accumulates.
    LatestWithCount,
    /// Latest reading only, at most one pending.
    LatestOnly,
}

fn retention_for(kind: StreamKind) -> Retention {
    match kind {
        StreamKind::Output | StreamKind::Buffered => Retention::History,
        StreamKind::Counter | StreamKind::Input | StreamKind::System => {
            Retention::LatestWithCount
        }
        StreamKind::Unbuffered | StreamKind::Constant => Retention::LatestOnly,
    }
}

#[derive(Debug)]
struct StreamBuffer {
    retention: Retention,
    /// Retained readings; populated only for `History` retention.
    readings: VecDeque<Reading>,
    /// Total readings ever pushed to this stream.
    total: u64,
    /// The most recent reading, regardless of retention.
    last: Option<Reading>,
}

impl StreamBuffer {
    fn new(retention: Retention) -> Self {
        Self {
            retention,
            readings: VecDeque::new(),
            total: 0,
            last: None,
        }
    }

    /// Pending readings visible to a walker that has consumed through
    /// `offset` pushes.
    fn pending(&self, offset: u64) -> u64 {
        let raw = self.total.saturating_sub(offset);
        match self.retention {
            Retention::LatestOnly => raw.min(1),
            _ => raw,
        }
    }

    /// The reading a walker at `offset` would pop next.
    fn peek(&self, offset: u64) -> Option<Reading> {
        if self.pending(offset) == 0 {
            return None;
        }
        match self.retention {
            Retention::History => self.readings.get(offset as usize).copied(),
            Retention::LatestWithCount | Retention::LatestOnly => self.last,
        }
    }
}

/// Opaque handle returned by [`SensorLog::watch`], used to remove the
/// subscription again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchToken(u64);

/// Callback invoked synchronously inside `push` for each matching reading.
pub type WatchCallback = Box<dyn FnMut(&Reading)>;

struct WatcherEntry {
    token: u64,
    selector: DataStreamSelector,
    callback: WatchCallback,
}

/// Append-only per-stream storage with cursor-based readers and change
/// notification.
///
/// Owned by a single `SensorGraph`; no internal locking is provided, per the
/// engine's single-threaded contract. Watchers are invoked synchronously in
/// registration order and must not mutate engine state.
#[derive(Default)]
pub struct SensorLog {
    buffers: BTreeMap<DataStream, StreamBuffer>,
    walkers: Vec<WalkerState>,
    watchers: Vec<WatcherEntry>,
    next_reading_id: u32,
    next_token: u64,
}

impl SensorLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `reading` to its stream, assigning a reading id when the
    /// stream's retention requires individually addressable readings, then
    /// synchronously invoke every matching watcher in registration order.
    pub fn push(&mut self, mut reading: Reading) {
        let stream = reading.stream;
        let buffer = self
            .buffers
            .entry(stream)
            .or_insert_with(|| StreamBuffer::new(retention_for(stream.kind)));

        if buffer.retention == Retention::History {
            reading.reading_id = Some(self.next_reading_id);
            self.next_reading_id += 1;
            buffer.readings.push_back(reading);
        }

        buffer.total += 1;
        buffer.last = Some(reading);

        trace!(stream = %stream, value = reading.value, tick = reading.timestamp, "push");

        for i in 0..self.watchers.len() {
            if self.watchers[i].selector.matches(&stream) {
                (self.watchers[i].callback)(&reading);
            }
        }
    }

    /// Most recent reading on an exact stream, without consuming it.
    pub fn inspect_last(&self, stream: DataStream) -> Result<Reading, StreamEmptyError> {
        self.buffers
            .get(&stream)
            .and_then(|b| b.last)
            .ok_or(StreamEmptyError {
                selector: DataStreamSelector::exact(stream),
            })
    }

    /// Latest value on `stream`, if it has ever been written.
    pub fn latest_value(&self, stream: DataStream) -> Option<u32> {
        self.buffers.get(&stream).and_then(|b| b.last).map(|r| r.value)
    }

    /// Create a cursor positioned at the current log state: readings already
    /// in the log are considered consumed, readings pushed afterwards are
    /// pending. Streams that first appear after creation are fully visible.
    pub fn create_walker(&mut self, selector: DataStreamSelector) -> WalkerId {
        let mut state = WalkerState::new(selector);
        for (stream, buffer) in &self.buffers {
            if selector.matches(stream) {
                state.offsets.insert(*stream, buffer.total);
            }
        }
        self.walkers.push(state);
        WalkerId(self.walkers.len() - 1)
    }

    /// Number of not-yet-consumed readings matching the walker's selector.
    pub fn count(&self, walker: WalkerId) -> u32 {
        let state = &self.walkers[walker.0];
        let mut total: u64 = 0;
        for (stream, buffer) in &self.buffers {
            if state.selector.matches(stream) {
                total += buffer.pending(state.offset(stream));
            }
        }
        total.min(u32::MAX as u64) as u32
    }

    /// Remove and return the oldest pending reading across all matched
    /// streams, ordered by `(timestamp, stream id)`.
    pub fn pop(&mut self, walker: WalkerId) -> Result<Reading, StreamEmptyError> {
        let state = &self.walkers[walker.0];
        let selector = state.selector;

        let mut best: Option<(Reading, DataStream)> = None;
        for (stream, buffer) in &self.buffers {
            if !selector.matches(stream) {
                continue;
            }
            if let Some(candidate) = buffer.peek(state.offset(stream)) {
                let replace = match &best {
                    None => true,
                    Some((current, cur_stream)) => {
                        (candidate.timestamp, stream.id) < (current.timestamp, cur_stream.id)
                    }
                };
                if replace {
                    best = Some((candidate, *stream));
                }
            }
        }

        let (reading, stream) = best.ok_or(StreamEmptyError { selector })?;
        let buffer = &self.buffers[&stream];
        let consumed_through = match buffer.retention {
            // A latest-only stream has exactly one pending reading; popping
            // it consumes everything outstanding.
            Retention::LatestOnly => buffer.total,
            _ => self.walkers[walker.0].offset(&stream) + 1,
        };
        self.walkers[walker.0].offsets.insert(stream, consumed_through);
        Ok(reading)
    }

    /// Mark all currently pending readings as consumed without returning
    /// them. Idempotent; does not affect the visibility of future pushes.
    pub fn skip_all(&mut self, walker: WalkerId) {
        let selector = self.walkers[walker.0].selector;
        let totals: Vec<(DataStream, u64)> = self
            .buffers
            .iter()
            .filter(|(stream, _)| selector.matches(stream))
            .map(|(stream, buffer)| (*stream, buffer.total))
            .collect();
        let state = &mut self.walkers[walker.0];
        for (stream, total) in totals {
            state.offsets.insert(stream, total);
        }
    }

    /// Register a scoped subscription. `callback` is invoked synchronously
    /// inside [`push`](Self::push) for each matching reading. A watcher must
    /// not itself push to the stream it watches.
    pub fn watch(&mut self, selector: DataStreamSelector, callback: WatchCallback) -> WatchToken {
        let token = self.next_token;
        self.next_token += 1;
        self.watchers.push(WatcherEntry {
            token,
            selector,
            callback,
        });
        WatchToken(token)
    }

    /// Remove a subscription created by [`watch`](Self::watch).
    pub fn unwatch(&mut self, token: WatchToken) {
        self.watchers.retain(|w| w.token != token.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorgraph_types::{DataStream, StreamKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn stream(text: &str) -> DataStream {
        text.parse().unwrap()
    }

    fn push_value(log: &mut SensorLog, s: DataStream, tick: u32, value: u32) {
        log.push(Reading::new(s, tick, value));
    }

    #[test]
    fn walker_count_matches_pushes() {
        let mut log = SensorLog::new();
        let buffered = stream("buffered 1");
        let walker = log.create_walker(DataStreamSelector::exact(buffered));

        for i in 0..5 {
            push_value(&mut log, buffered, i, i);
        }
        assert_eq!(log.count(walker), 5);
    }

    #[test]
    fn pop_drains_in_order_then_errors() {
        let mut log = SensorLog::new();
        let buffered = stream("buffered 1");
        let walker = log.create_walker(DataStreamSelector::exact(buffered));

        for i in 0..3 {
            push_value(&mut log, buffered, i, 10 + i);
        }
        assert_eq!(log.pop(walker).unwrap().value, 10);
        assert_eq!(log.pop(walker).unwrap().value, 11);
        assert_eq!(log.pop(walker).unwrap().value, 12);
        assert_eq!(log.count(walker), 0);
        assert!(log.pop(walker).is_err());
    }

    #[test]
    fn skip_all_is_idempotent_and_preserves_future_visibility() {
        let mut log = SensorLog::new();
        let buffered = stream("buffered 1");
        let walker = log.create_walker(DataStreamSelector::exact(buffered));

        for i in 0..4 {
            push_value(&mut log, buffered, i, i);
        }
        log.skip_all(walker);
        assert_eq!(log.count(walker), 0);
        log.skip_all(walker);
        assert_eq!(log.count(walker), 0);

        push_value(&mut log, buffered, 9, 99);
        assert_eq!(log.count(walker), 1);
        assert_eq!(log.pop(walker).unwrap().value, 99);
    }

    #[test]
    fn class_walker_orders_by_tick_then_id() {
        let mut log = SensorLog::new();
        let walker = log.create_walker(DataStreamSelector::all(StreamKind::Output));

        push_value(&mut log, stream("output 2"), 5, 2);
        push_value(&mut log, stream("output 1"), 3, 1);
        push_value(&mut log, stream("output 3"), 5, 3);

        assert_eq!(log.count(walker), 3);
        assert_eq!(log.pop(walker).unwrap().value, 1); // tick 3 first
        assert_eq!(log.pop(walker).unwrap().value, 2); // tick 5, lower id
        assert_eq!(log.pop(walker).unwrap().value, 3);
    }

    #[test]
    fn counter_streams_accumulate_count_but_keep_latest() {
        let mut log = SensorLog::new();
        let counter = stream("counter 15");
        let walker = log.create_walker(DataStreamSelector::exact(counter));

        for i in 1..=60 {
            push_value(&mut log, counter, i, i);
        }
        assert_eq!(log.count(walker), 60);
        // Pops return copies of the latest reading.
        assert_eq!(log.pop(walker).unwrap().value, 60);
        assert_eq!(log.count(walker), 59);
    }

    #[test]
    fn unbuffered_streams_retain_only_latest() {
        let mut log = SensorLog::new();
        let unbuffered = stream("unbuffered 1");
        let walker = log.create_walker(DataStreamSelector::exact(unbuffered));

        for i in 0..5 {
            push_value(&mut log, unbuffered, i, i);
        }
        assert_eq!(log.count(walker), 1);
        assert_eq!(log.pop(walker).unwrap().value, 4);
        assert_eq!(log.count(walker), 0);
        assert!(log.pop(walker).is_err());
    }

    #[test]
    fn inspect_last_does_not_consume() {
        let mut log = SensorLog::new();
        let unbuffered = stream("unbuffered 2");

        assert!(log.inspect_last(unbuffered).is_err());
        push_value(&mut log, unbuffered, 1, 7);
        assert_eq!(log.inspect_last(unbuffered).unwrap().value, 7);
        assert_eq!(log.inspect_last(unbuffered).unwrap().value, 7);
    }

    #[test]
    fn walker_starts_at_current_state() {
        let mut log = SensorLog::new();
        let buffered = stream("buffered 1");

        push_value(&mut log, buffered, 0, 1);
        push_value(&mut log, buffered, 1, 2);
        let walker = log.create_walker(DataStreamSelector::exact(buffered));
        assert_eq!(log.count(walker), 0);

        push_value(&mut log, buffered, 2, 3);
        assert_eq!(log.count(walker), 1);
    }

    #[test]
    fn reading_ids_are_monotonic_for_history_streams() {
        let mut log = SensorLog::new();
        let output = stream("output 1");
        let counter = stream("counter 1");
        let walker = log.create_walker(DataStreamSelector::exact(output));

        push_value(&mut log, output, 0, 1);
        push_value(&mut log, counter, 0, 1); // no id for counter streams
        push_value(&mut log, output, 1, 2);

        assert_eq!(log.pop(walker).unwrap().reading_id, Some(0));
        assert_eq!(log.pop(walker).unwrap().reading_id, Some(1));
        assert_eq!(log.inspect_last(counter).unwrap().reading_id, None);
    }

    #[test]
    fn watchers_fire_in_registration_order_and_unwatch_works() {
        let mut log = SensorLog::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&seen);
        let token = log.watch(
            DataStreamSelector::all(StreamKind::Output),
            Box::new(move |r| first.borrow_mut().push(("a", r.value))),
        );
        let second = Rc::clone(&seen);
        log.watch(
            DataStreamSelector::exact(stream("output 1")),
            Box::new(move |r| second.borrow_mut().push(("b", r.value))),
        );

        push_value(&mut log, stream("output 1"), 0, 5);
        assert_eq!(*seen.borrow(), vec![("a", 5), ("b", 5)]);

        log.unwatch(token);
        push_value(&mut log, stream("output 1"), 1, 6);
        assert_eq!(*seen.borrow(), vec![("a", 5), ("b", 5), ("b", 6)]);
    }
}
