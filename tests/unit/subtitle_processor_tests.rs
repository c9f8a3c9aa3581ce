/*!
 * Tests for subtitle parsing functionality
 */

use std::fmt::Write;
use subtimeline::subtitle_processor::{parse, InvalidTimingPolicy, ParseOptions, SubtitleEntry, SubtitleTrack};
use crate::common::{self, srt_block};

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let ms = SubtitleEntry::parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5025678);

    let formatted = SubtitleEntry::format_timestamp(ms);
    assert_eq!(formatted, ts);

    assert_eq!(SubtitleEntry::parse_timestamp("00:00:01.250").unwrap(), 1250);
    assert!(SubtitleEntry::parse_timestamp("00:61:00,000").is_err());
    assert!(SubtitleEntry::parse_timestamp("garbage").is_err());
}

#[test]
fn test_timestamp_parsing_withHugeHours_shouldRejectInsteadOfOverflowing() {
    assert!(SubtitleEntry::parse_timestamp("99999999999999999:00:00,000").is_err());
    assert!(SubtitleEntry::parse_timestamp("5124095576031:00:00,000").is_err());
    assert!(SubtitleEntry::parse_timestamp("5124095576030:59:59,999").is_err());

    assert_eq!(SubtitleEntry::parse_timestamp("1000:00:00,001").unwrap(), 3_600_000_001);
}

/// Formatting a timing line and parsing it back recovers the exact offsets
#[test]
fn test_timing_line_roundTrip_withComponentGrid_shouldRecoverMilliseconds() {
    for &(h, m, s, ms) in &[(0u64, 0u64, 0u64, 0u64), (0, 0, 59, 999), (1, 2, 3, 4), (23, 59, 59, 999), (99, 0, 30, 500)] {
        let expected = ((h * 60 + m) * 60 + s) * 1000 + ms;
        let stamp = format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms);
        let content = srt_block(1, &stamp, &stamp, "x");

        let track = parse(&content);
        assert_eq!(track.len(), 1, "timing line {}", stamp);
        assert_eq!(track.entries()[0].start_time_ms, expected);
        assert_eq!(SubtitleEntry::format_timestamp(expected), stamp);
    }
}

/// Test subtitle entry display formatting
#[test]
fn test_subtitle_entry_display_withValidEntry_shouldFormatAsSrtBlock() {
    let entry = SubtitleEntry::new(1, 5000, 10000, "Test subtitle".to_string());
    let mut output = String::new();
    write!(output, "{}", entry).unwrap();

    assert_eq!(output, "1\n00:00:05,000 --> 00:00:10,000\nTest subtitle\n\n");
}

#[test]
fn test_subtitle_entry_new_withEndBeforeStart_shouldClampEnd() {
    let entry = SubtitleEntry::new(4, 9000, 1000, "Backwards".to_string());
    assert_eq!(entry.end_time_ms, 9000);
    assert_eq!(entry.duration_ms(), 0);
    assert!(entry.contains(9000));
}

/// The two-entry scenario parses into exactly the expected entries
#[test]
fn test_parse_withHelloWorld_shouldYieldTwoEntries() {
    let track = parse(common::HELLO_WORLD_SRT);

    assert_eq!(track.entries(), &[
        SubtitleEntry::new(1, 1000, 3000, "Hello".to_string()),
        SubtitleEntry::new(2, 5500, 7250, "World".to_string()),
    ]);
}

#[test]
fn test_parse_withEmptyInput_shouldYieldEmptyTrack() {
    assert!(parse("").is_empty());
    assert!(parse("\n\n   \n\t\n").is_empty());
}

#[test]
fn test_parse_withMixedLineEndings_shouldNormalize() {
    let content = "1\r\n00:00:01,000 --> 00:00:03,000\r\nHello\r\n\r\n2\r00:00:05,500 --> 00:00:07,250\rWorld\r";
    let track = parse(content);

    assert_eq!(track.len(), 2);
    assert_eq!(track.entries()[0].text, "Hello");
    assert_eq!(track.entries()[1].text, "World");
    assert_eq!(track.entries()[1].end_time_ms, 7250);
}

#[test]
fn test_parse_withPeriodSeparatorAndTightArrow_shouldParse() {
    let track = parse("7\n00:01:00.100-->00:01:02.200\nDots\n");

    assert_eq!(track.len(), 1);
    assert_eq!(track.entries()[0].index, 7);
    assert_eq!(track.entries()[0].start_time_ms, 60_100);
    assert_eq!(track.entries()[0].end_time_ms, 62_200);
}

#[test]
fn test_parse_withPositionCuesAfterTiming_shouldIgnoreCues() {
    let track = parse("1\n00:00:01,000 --> 00:00:02,000 X1:100 X2:200 Y1:10 Y2:20\nPositioned\n");
    assert_eq!(track.len(), 1);
    assert_eq!(track.entries()[0].end_time_ms, 2000);
}

#[test]
fn test_parse_withByteOrderMark_shouldParseFirstBlock() {
    let content = format!("\u{feff}{}", common::HELLO_WORLD_SRT);
    let track = parse(&content);
    assert_eq!(track.len(), 2);
    assert_eq!(track.entries()[0].index, 1);
}

/// A block with a non-numeric index is skipped and does not stop later blocks
#[test]
fn test_parse_withNonNumericIndex_shouldSkipOnlyThatBlock() {
    let content = "x\n00:00:01,000 --> 00:00:02,000\nBad index\n\n2\n00:00:03,000 --> 00:00:04,000\nGood\n";
    let track = parse(content);

    assert_eq!(track.len(), 1);
    assert_eq!(track.entries()[0].index, 2);
    assert_eq!(track.entries()[0].text, "Good");
}

#[test]
fn test_parse_withMissingArrow_shouldSkipBlock() {
    let content = format!(
        "1\n00:00:01,000 00:00:02,000\nNo arrow\n\n{}",
        srt_block(2, "00:00:03,000", "00:00:04,000", "Kept")
    );
    let track = parse(&content);

    assert_eq!(track.len(), 1);
    assert_eq!(track.entries()[0].text, "Kept");
}

#[test]
fn test_parse_withTooFewLines_shouldSkipBlock() {
    let content = format!(
        "1\n00:00:01,000 --> 00:00:02,000\n\n{}",
        srt_block(2, "00:00:03,000", "00:00:04,000", "Kept")
    );
    let track = parse(&content);

    assert_eq!(track.len(), 1);
    assert_eq!(track.entries()[0].index, 2);
}

#[test]
fn test_parse_withNonFixedWidthTiming_shouldSkipBlock() {
    let track = parse("1\n0:00:01,000 --> 0:00:02,000\nShort hours\n");
    assert!(track.is_empty());
}

#[test]
fn test_parse_withInlineMarkup_shouldStripTags() {
    let track = parse("1\n00:00:01,000 --> 00:00:02,000\n<i>Hello</i> <font color=\"#ffffff\">there</font>\n<b>friend</b>\n");

    assert_eq!(track.len(), 1);
    assert_eq!(track.entries()[0].text, "Hello there\nfriend");
}

#[test]
fn test_parse_withMarkupOnlyText_shouldDiscardBlock() {
    let track = parse("1\n00:00:01,000 --> 00:00:02,000\n<i></i>\n");
    assert!(track.is_empty());
}

#[test]
fn test_parse_withMarkupStrippingDisabled_shouldKeepTags() {
    let options = ParseOptions {
        strip_markup: false,
        ..ParseOptions::default()
    };
    let track = SubtitleTrack::parse_with_options("1\n00:00:01,000 --> 00:00:02,000\n<i>Hi</i>\n", &options);
    assert_eq!(track.entries()[0].text, "<i>Hi</i>");
}

#[test]
fn test_parse_withMultiLineText_shouldPreserveLineBreaks() {
    let track = parse("1\n00:00:01,000 --> 00:00:02,000\n  - Are you there?\n  - Yes.  \n");
    assert_eq!(track.entries()[0].text, "- Are you there?\n  - Yes.");
}

#[test]
fn test_parse_withIndexPadding_shouldTrimIndex() {
    let track = parse(" 12 \n00:00:01,000 --> 00:00:02,000\nPadded\n");
    assert_eq!(track.entries()[0].index, 12);
}

#[test]
fn test_parse_withDuplicateIndices_shouldKeepBoth() {
    let content = format!(
        "{}{}",
        srt_block(1, "00:00:01,000", "00:00:02,000", "First"),
        srt_block(1, "00:00:03,000", "00:00:04,000", "Second")
    );
    let track = parse(&content);

    assert_eq!(track.len(), 2);
    assert!(track.iter().all(|entry| entry.index == 1));
}

#[test]
fn test_parse_withEndBeforeStart_shouldFollowPolicy() {
    let content = srt_block(1, "00:00:05,000", "00:00:04,000", "Backwards");

    let clamped = parse(&content);
    assert_eq!(clamped.len(), 1);
    assert_eq!(clamped.entries()[0].start_time_ms, 5000);
    assert_eq!(clamped.entries()[0].end_time_ms, 5000);

    let discard = ParseOptions {
        invalid_timing: InvalidTimingPolicy::Discard,
        ..ParseOptions::default()
    };
    assert!(SubtitleTrack::parse_with_options(&content, &discard).is_empty());
}

#[test]
fn test_parse_withOutOfOrderBlocks_shouldSortByStart() {
    let content = format!(
        "{}{}{}",
        srt_block(3, "00:00:09,000", "00:00:10,000", "Third"),
        srt_block(1, "00:00:01,000", "00:00:02,000", "First"),
        srt_block(2, "00:00:05,000", "00:00:06,000", "Second")
    );
    let track = parse(&content);

    let texts: Vec<&str> = track.iter().map(|entry| entry.text.as_str()).collect();
    assert_eq!(texts, vec!["First", "Second", "Third"]);
    assert!(track.entries().windows(2).all(|pair| pair[0].start_time_ms <= pair[1].start_time_ms));
}

/// Permuting blocks with distinct start times does not change the parsed track
#[test]
fn test_parse_withPermutedBlocks_shouldYieldSameTrack() {
    let blocks = [
        srt_block(1, "00:00:01,000", "00:00:02,000", "A"),
        srt_block(2, "00:00:03,000", "00:00:05,000", "B"),
        srt_block(3, "00:00:04,000", "00:00:06,000", "C"),
        srt_block(4, "00:01:00,000", "00:01:01,000", "D"),
    ];
    let in_order = parse(&blocks.concat());

    for order in [[3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]] {
        let permuted: String = order.iter().map(|&i| blocks[i].as_str()).collect();
        assert_eq!(parse(&permuted), in_order);
    }
}

#[test]
fn test_parse_withEqualStartTimes_shouldKeepFileOrder() {
    let content = format!(
        "{}{}{}",
        srt_block(9, "00:00:02,000", "00:00:03,000", "Later"),
        srt_block(5, "00:00:01,000", "00:00:04,000", "Top"),
        srt_block(6, "00:00:01,000", "00:00:02,000", "Bottom")
    );
    let track = parse(&content);

    let indices: Vec<i32> = track.iter().map(|entry| entry.index).collect();
    assert_eq!(indices, vec![5, 6, 9]);
    assert_eq!(track.overlap_count(), 1);
}

#[test]
fn test_parse_bytes_withInvalidUtf8_shouldNotPanic() {
    let garbage = [0xffu8, 0xfe, 0x00, 0x9f, 0x92, 0x96, 0x0a, 0x0a];
    assert!(SubtitleTrack::parse_bytes(&garbage).is_empty());

    let mut mostly_valid = common::HELLO_WORLD_SRT.as_bytes().to_vec();
    mostly_valid.extend_from_slice(&[0xff, 0xff]);
    assert_eq!(SubtitleTrack::parse_bytes(&mostly_valid).len(), 2);
}

#[test]
fn test_to_srt_withParsedTrack_shouldReparseIdentically() {
    let content = format!(
        "{}{}",
        srt_block(2, "00:00:05,000", "00:00:06,000", "Two\nlines"),
        srt_block(1, "00:00:01,000", "00:00:02,000", "One")
    );
    let track = parse(&content);
    let rendered = track.to_srt();

    assert!(rendered.starts_with("1\n00:00:01,000 --> 00:00:02,000\nOne\n\n"));
    assert_eq!(parse(&rendered), track);
}

#[test]
fn test_track_display_withEntries_shouldSummarize() {
    let track = parse(common::HELLO_WORLD_SRT);
    let summary = track.to_string();

    assert!(summary.contains("Entries: 2"));
    assert!(summary.contains("00:00:01,000 - 00:00:07,250"));
}
