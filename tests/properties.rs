//! Property tests for line splitting on the fixed-advance surface.
//!
//! Every char advances 10px (font size 10, em ratio 1), so widths translate
//! directly into columns.

use linegap::{FixedAdvanceSurface, LineFragment, LineSplitter, Marker, RenderContext};
use proptest::prelude::*;
use proptest::sample::Index;

const MARKERS: [&str; 2] = ["AAAA", "BBBB"];

fn ctx(width: f32) -> RenderContext {
    RenderContext {
        font_size: 10.0,
        line_height: 14.0,
        width,
        ..RenderContext::default()
    }
}

fn markers() -> Vec<Marker> {
    MARKERS
        .iter()
        .enumerate()
        .map(|(index, name)| Marker::new(index, *name))
        .collect()
}

fn split(source: &str, width: f32) -> Vec<LineFragment> {
    let mut surface = FixedAdvanceSurface::new(1.0);
    LineSplitter::new(&mut surface).split(source, &markers(), &ctx(width))
}

fn joined(lines: &[LineFragment]) -> String {
    lines.iter().map(|line| line.text.as_str()).collect()
}

/// Lower-case words with both markers dropped in somewhere
fn paragraph() -> impl Strategy<Value = (Vec<String>, String)> {
    (
        prop::collection::vec("[a-z]{1,8}[.,]?", 1..40),
        any::<Index>(),
        any::<Index>(),
    )
        .prop_map(|(words, first, second)| {
            let mut with_markers = words.clone();
            with_markers.insert(first.index(with_markers.len() + 1), MARKERS[0].to_string());
            with_markers.insert(second.index(with_markers.len() + 1), MARKERS[1].to_string());
            (words, with_markers.join(" "))
        })
}

proptest! {
    #[test]
    fn prop_fragments_rebuild_the_words_without_markers(
        (words, source) in paragraph(),
        width in 90.0f32..800.0,
    ) {
        let lines = split(&source, width);
        let text = joined(&lines);

        let rebuilt: Vec<&str> = text.split_whitespace().collect();
        prop_assert_eq!(rebuilt, words.iter().map(String::as_str).collect::<Vec<_>>());
        // padding keeps the char count, every marker is four columns wide
        prop_assert_eq!(text.chars().count(), source.chars().count());
    }

    #[test]
    fn prop_fragments_cover_the_padded_text_contiguously(
        (_, source) in paragraph(),
        width in 10.0f32..800.0,
    ) {
        let lines = split(&source, width);

        let mut next = 0;
        for line in &lines {
            prop_assert_eq!(line.chars.start, next);
            prop_assert_eq!(line.chars.len(), line.text.chars().count());
            next = line.chars.end;
        }
        prop_assert_eq!(next, source.chars().count());
    }

    #[test]
    fn prop_split_is_idempotent(
        (_, source) in paragraph(),
        width in 10.0f32..800.0,
    ) {
        prop_assert_eq!(split(&source, width), split(&source, width));
    }

    #[test]
    fn prop_line_tops_strictly_increase(
        (_, source) in paragraph(),
        width in 10.0f32..800.0,
    ) {
        let lines = split(&source, width);
        for pair in lines.windows(2) {
            prop_assert!(pair[0].top < pair[1].top, "{} !< {}", pair[0].top, pair[1].top);
        }
    }

    #[test]
    fn prop_one_char_wide_block_puts_every_char_on_its_own_line(
        (_, source) in paragraph(),
    ) {
        // exactly one column
        let lines = split(&source, 10.0);
        let visible = source.chars().filter(|ch| !ch.is_whitespace()).count();

        let per_line: Vec<usize> = lines
            .iter()
            .map(|line| line.text.chars().filter(|ch| !ch.is_whitespace()).count())
            .collect();

        // a leading marker leaves a line of padding only
        prop_assert!(per_line.iter().all(|&count| count <= 1));
        prop_assert_eq!(per_line.iter().filter(|&&count| count == 1).count(), visible);
        prop_assert!(lines.len() <= visible + 1);
    }
}

#[test]
fn prop_sub_column_block_still_terminates() {
    let lines = split("AAAA is a test. BBBB is another test.", 1.0);

    assert!(!lines.is_empty());
    assert_eq!(joined(&lines), "     is a test.      is another test.");
    assert!(
        lines
            .iter()
            .all(|line| line.text.chars().filter(|ch| !ch.is_whitespace()).count() <= 1)
    );
}
