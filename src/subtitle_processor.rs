use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use regex::{Captures, Regex};
use once_cell::sync::Lazy;
use anyhow::{Result, Context, anyhow};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::timeline::{self, Segment};

// @module: Subtitle parsing and track construction

// @const: SRT timing line regex, comma or period before the milliseconds
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]{2}):([0-9]{2}):([0-9]{2})[,.]([0-9]{3})\s*-->\s*([0-9]{2}):([0-9]{2}):([0-9]{2})[,.]([0-9]{3})").unwrap()
});

// @const: Inline markup such as <i>, </b> or <font color="...">
static MARKUP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]*>").unwrap()
});

/// What to do with an entry whose end time precedes its start time
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvalidTimingPolicy {
    /// Keep the entry, clamping its end time to its start time
    #[default]
    Clamp,
    /// Drop the entry
    Discard,
}

/// Options controlling how subtitle text is turned into a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub invalid_timing: InvalidTimingPolicy,
    pub strip_markup: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            invalid_timing: InvalidTimingPolicy::Clamp,
            strip_markup: true,
        }
    }
}

// @struct: Single timed caption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    // @field: Ordinal tag from the source file, used only for correlation
    pub index: i32,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms, never before start
    pub end_time_ms: u64,

    // @field: Display text, lines separated by '\n'
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new entry, clamping the end time so it never precedes the start
    pub fn new(index: i32, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            index,
            start_time_ms,
            end_time_ms: end_time_ms.max(start_time_ms),
            text,
        }
    }

    /// Returns a copy of this entry carrying different text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        SubtitleEntry {
            text: text.into(),
            ..self.clone()
        }
    }

    /// Whether the position falls inside this entry, both bounds inclusive
    pub fn contains(&self, position_ms: u64) -> bool {
        position_ms >= self.start_time_ms && position_ms <= self.end_time_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_time_ms.saturating_sub(self.start_time_ms)
    }

    /// Parse an SRT timestamp (`HH:MM:SS,mmm` or `HH:MM:SS.mmm`) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        hours
            .checked_mul(3_600_000)
            .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
            .ok_or_else(|| anyhow!("Timestamp out of range: {}", timestamp))
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Reason a block was left out of the track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    TooFewLines,
    BadIndex,
    BadTiming,
    EndBeforeStart,
    EmptyText,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let reason = match self {
            Self::TooFewLines => "fewer than 3 lines",
            Self::BadIndex => "index line is not an integer",
            Self::BadTiming => "timing line does not match",
            Self::EndBeforeStart => "end time before start time",
            Self::EmptyText => "no visible text",
        };
        f.write_str(reason)
    }
}

/// Ordered, immutable sequence of subtitle entries
///
/// Entries are sorted ascending by start time; entries sharing a start time
/// keep their file order. Alongside the entries the track keeps a table of
/// non-overlapping timeline segments, each naming the entry showing during
/// it, so position lookups are a single binary search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleTrack {
    entries: Vec<SubtitleEntry>,
    segments: Vec<Segment>,
}

impl SubtitleTrack {
    /// Build a track from entries in any order
    pub fn from_entries(mut entries: Vec<SubtitleEntry>) -> Self {
        entries.sort_by_key(|entry| entry.start_time_ms);
        let segments = timeline::build_segments(&entries);

        SubtitleTrack { entries, segments }
    }

    /// Parse SRT text with default options
    pub fn parse(content: &str) -> Self {
        Self::parse_with_options(content, &ParseOptions::default())
    }

    /// Parse raw file bytes, decoding them as UTF-8 and replacing invalid sequences
    pub fn parse_bytes(bytes: &[u8]) -> Self {
        Self::parse_bytes_with_options(bytes, &ParseOptions::default())
    }

    pub fn parse_bytes_with_options(bytes: &[u8], options: &ParseOptions) -> Self {
        let content = String::from_utf8_lossy(bytes);
        Self::parse_with_options(&content, options)
    }

    /// Parse SRT text into a track
    ///
    /// Malformed blocks are skipped rather than reported: a block needs an
    /// integer index line, a timing line and at least one line of visible
    /// text. Empty or unparsable input produces an empty track.
    pub fn parse_with_options(content: &str, options: &ParseOptions) -> Self {
        let normalized = normalize_line_endings(content);
        let blocks = split_blocks(&normalized);

        let mut entries = Vec::with_capacity(blocks.len());
        let mut skipped = 0;

        for (block_num, block) in blocks.iter().enumerate() {
            match parse_block(block, options) {
                Ok(entry) => entries.push(entry),
                Err(reason) => {
                    skipped += 1;
                    debug!("Skipping subtitle block {}: {}", block_num + 1, reason);
                }
            }
        }

        let track = Self::from_entries(entries);

        debug!("Parsed {} subtitle entries ({} blocks skipped)", track.len(), skipped);

        let overlaps = track.overlap_count();
        if overlaps > 0 {
            warn!("Found {} overlapping subtitle entries", overlaps);
        }

        track
    }

    pub fn entries(&self) -> &[SubtitleEntry] {
        &self.entries
    }

    pub fn get(&self, position: usize) -> Option<&SubtitleEntry> {
        self.entries.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubtitleEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timeline segments, ordered by start position
    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of entries that start before their predecessor ends
    pub fn overlap_count(&self) -> usize {
        self.entries
            .windows(2)
            .filter(|pair| pair[1].start_time_ms < pair[0].end_time_ms)
            .count()
    }

    /// Render the whole track as SRT text
    pub fn to_srt(&self) -> String {
        self.entries.iter().map(|entry| entry.to_string()).collect()
    }

    /// Write the track to an SRT file, creating parent directories as needed
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;

        for entry in &self.entries {
            write!(file, "{}", entry)?;
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a SubtitleTrack {
    type Item = &'a SubtitleEntry;
    type IntoIter = std::slice::Iter<'a, SubtitleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for SubtitleTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Track")?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        let last_end = self.entries.iter().map(|entry| entry.end_time_ms).max();
        if let (Some(first), Some(last)) = (self.entries.first(), last_end) {
            writeln!(
                f,
                "Span: {} - {}",
                SubtitleEntry::format_timestamp(first.start_time_ms),
                SubtitleEntry::format_timestamp(last)
            )?;
        }
        Ok(())
    }
}

/// Parse SRT text with default options
pub fn parse(content: &str) -> SubtitleTrack {
    SubtitleTrack::parse(content)
}

fn normalize_line_endings(content: &str) -> String {
    content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

// Blocks are runs of non-blank lines
fn split_blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in content.split('\n') {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn parse_block(lines: &[&str], options: &ParseOptions) -> Result<SubtitleEntry, SkipReason> {
    if lines.len() < 3 {
        return Err(SkipReason::TooFewLines);
    }

    let index: i32 = lines[0].trim().parse().map_err(|_| SkipReason::BadIndex)?;

    let caps = TIMESTAMP_REGEX.captures(lines[1]).ok_or(SkipReason::BadTiming)?;
    let start_time_ms = captured_ms(&caps, 1).ok_or(SkipReason::BadTiming)?;
    let mut end_time_ms = captured_ms(&caps, 5).ok_or(SkipReason::BadTiming)?;

    if end_time_ms < start_time_ms {
        match options.invalid_timing {
            InvalidTimingPolicy::Clamp => end_time_ms = start_time_ms,
            InvalidTimingPolicy::Discard => return Err(SkipReason::EndBeforeStart),
        }
    }

    let raw_text = lines[2..].join("\n");
    let raw_text = raw_text.trim();
    let text = if options.strip_markup {
        MARKUP_REGEX.replace_all(raw_text, "").trim().to_string()
    } else {
        raw_text.to_string()
    };

    if text.is_empty() {
        return Err(SkipReason::EmptyText);
    }

    Ok(SubtitleEntry {
        index,
        start_time_ms,
        end_time_ms,
        text,
    })
}

// Reads four consecutive capture groups (H, M, S, mmm) starting at `first`
fn captured_ms(caps: &Captures, first: usize) -> Option<u64> {
    let mut parts = [0u64; 4];
    for (offset, part) in parts.iter_mut().enumerate() {
        *part = caps.get(first + offset)?.as_str().parse().ok()?;
    }
    let [hours, minutes, seconds, millis] = parts;
    Some(((hours * 60 + minutes) * 60 + seconds) * 1000 + millis)
}
