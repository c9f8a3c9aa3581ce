/*!
 * Timeline lookups: which subtitle entry is showing at a playback position.
 *
 * Lookups are pure functions over an immutable `SubtitleTrack`. They never
 * allocate, block or touch I/O, so a player can call them on every tick of
 * its position poll.
 *
 * When entries overlap, the entry with the latest start time that still
 * contains the position wins; among entries with equal start times, the one
 * that appeared last in the file wins.
 *
 * Each track carries a flattened segment table built once at construction:
 * the timeline is cut at every start time and every end time + 1, and each
 * segment records the winning entry (or none) for every position inside it.
 * A lookup is then a single binary search, however long or deeply nested the
 * overlapping entries are.
 */

use std::collections::BinaryHeap;

use crate::subtitle_processor::{SubtitleEntry, SubtitleTrack};

/// Span of the timeline with a single answer, running until the next segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment {
    /// First position covered, inclusive
    pub(crate) from_ms: u64,

    /// Position in the track of the entry showing, if any
    pub(crate) entry: Option<usize>,
}

/// Sweep the sorted entries into at most `2 * entries.len()` segments
///
/// Entries must already be sorted by start time. Within that order a higher
/// position means a later start, or the same start later in the file, so the
/// winner at any moment is simply the highest-positioned active entry.
pub(crate) fn build_segments(entries: &[SubtitleEntry]) -> Vec<Segment> {
    let mut boundaries: Vec<u64> = entries
        .iter()
        .flat_map(|entry| std::iter::once(entry.start_time_ms).chain(entry.end_time_ms.checked_add(1)))
        .collect();
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut segments: Vec<Segment> = Vec::with_capacity(boundaries.len());
    let mut active = BinaryHeap::new();
    let mut next = 0;

    for from_ms in boundaries {
        while next < entries.len() && entries[next].start_time_ms <= from_ms {
            active.push(next);
            next += 1;
        }

        // Only the top needs to be live; stale entries below it are dropped lazily
        while active.peek().is_some_and(|&top| entries[top].end_time_ms < from_ms) {
            active.pop();
        }

        let entry = active.peek().copied();
        if segments.last().map(|segment| segment.entry) != Some(entry) {
            segments.push(Segment { from_ms, entry });
        }
    }

    segments
}

/// Find the entry showing at `position_ms`, bounds inclusive
pub fn current_entry(track: &SubtitleTrack, position_ms: u64) -> Option<&SubtitleEntry> {
    locate(track, position_ms).and_then(|k| resolve(track, k))
}

/// Text of the entry showing at `position_ms`
pub fn current_text(track: &SubtitleTrack, position_ms: u64) -> Option<&str> {
    current_entry(track, position_ms).map(|entry| entry.text.as_str())
}

// Segment containing the position; None before the first start time
fn locate(track: &SubtitleTrack, position_ms: u64) -> Option<usize> {
    track
        .segments()
        .partition_point(|segment| segment.from_ms <= position_ms)
        .checked_sub(1)
}

fn resolve(track: &SubtitleTrack, segment: usize) -> Option<&SubtitleEntry> {
    track
        .segments()
        .get(segment)
        .and_then(|segment| segment.entry)
        .and_then(|i| track.get(i))
}

impl SubtitleTrack {
    pub fn current_entry(&self, position_ms: u64) -> Option<&SubtitleEntry> {
        current_entry(self, position_ms)
    }

    pub fn current_text(&self, position_ms: u64) -> Option<&str> {
        current_text(self, position_ms)
    }
}

/// Remembers the last matched segment so steady forward playback skips the search
///
/// The cursor only ever answers from its hint when the hinted segment provably
/// covers the position; otherwise it falls back to [`current_entry`]. Results
/// are therefore identical to the stateless lookup for any sequence of
/// positions, seeks included, and even when one cursor is used against
/// several tracks.
#[derive(Debug, Clone, Default)]
pub struct TimelineCursor {
    hint: Option<usize>,
}

impl TimelineCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the remembered position, e.g. after loading a new track
    pub fn reset(&mut self) {
        self.hint = None;
    }

    pub fn current_entry<'a>(&mut self, track: &'a SubtitleTrack, position_ms: u64) -> Option<&'a SubtitleEntry> {
        let found = self
            .hinted(track, position_ms)
            .or_else(|| locate(track, position_ms));

        if found.is_some() {
            self.hint = found;
        }

        found.and_then(|k| resolve(track, k))
    }

    pub fn current_text<'a>(&mut self, track: &'a SubtitleTrack, position_ms: u64) -> Option<&'a str> {
        self.current_entry(track, position_ms).map(|entry| entry.text.as_str())
    }

    // Checks the remembered segment, then its successor
    fn hinted(&self, track: &SubtitleTrack, position_ms: u64) -> Option<usize> {
        let hint = self.hint?;
        [hint, hint + 1]
            .into_iter()
            .find(|&k| covers(track, k, position_ms))
    }
}

// Segment `k` starts at or before the position and the next one starts after it
fn covers(track: &SubtitleTrack, k: usize, position_ms: u64) -> bool {
    let segments = track.segments();
    let Some(segment) = segments.get(k) else {
        return false;
    };

    segment.from_ms <= position_ms
        && segments
            .get(k + 1)
            .is_none_or(|next| next.from_ms > position_ms)
}
