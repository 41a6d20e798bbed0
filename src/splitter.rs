//! Finding where a paragraph really wraps.
//!
//! Markers are blanked out with spaces first, the padded text is laid out in an
//! off-screen block, and the per-char boxes are walked top to bottom: whenever a
//! char's top moves by more than [`LINE_EPSILON`] a new visual line starts.

use std::ops::Range;

use crate::fonts::{MeasuredText, RenderContext, TextSurface};
use crate::types::{LineFragment, Marker};

/// Tolerance in pixels for sub-pixel rounding of line tops
pub const LINE_EPSILON: f32 = 1.0;

/// Source text with every marker replaced by blank padding
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedText {
    pub text: String,
    /// Char range of each marker's padding, indexed like the markers.
    /// `None` when the marker does not occur in the source.
    pub gaps: Vec<Option<Range<usize>>>,
}

/// Number of spaces that renders about as wide as the marker itself
pub fn padding_for<S: TextSurface>(marker: &Marker, surface: &mut S, ctx: &RenderContext) -> usize {
    if let Some(spaces) = marker.padding {
        return spaces.max(1);
    }

    let space_width = surface.advance(" ", ctx);
    if space_width <= 0.0 {
        return marker.name.chars().count().max(1);
    }

    let marker_width = surface.advance(&marker.name, ctx);
    ((marker_width / space_width).round() as usize).max(1)
}

/// Replace the first occurrence of every marker with blank padding
pub fn pad_markers<S: TextSurface>(
    source: &str,
    markers: &[Marker],
    surface: &mut S,
    ctx: &RenderContext,
) -> PaddedText {
    // (byte range in source, position in `markers`)
    let mut hits: Vec<(Range<usize>, usize)> = Vec::new();
    for (slot, marker) in markers.iter().enumerate() {
        if marker.name.is_empty() {
            log::warn!("marker {} has an empty name, not padded", marker.index);
            continue;
        }
        match source.find(&marker.name) {
            Some(start) => hits.push((start..start + marker.name.len(), slot)),
            None => log::warn!(
                "marker {} ('{}') does not occur in the paragraph",
                marker.index,
                marker.name
            ),
        }
    }
    hits.sort_by_key(|(range, _)| range.start);

    let mut text = String::with_capacity(source.len());
    let mut gaps = vec![None; markers.len()];
    let mut cursor = 0;
    let mut char_cursor = 0;

    for (range, slot) in hits {
        if range.start < cursor {
            log::warn!(
                "marker {} ('{}') overlaps another marker, not padded",
                markers[slot].index,
                markers[slot].name
            );
            continue;
        }

        let before = &source[cursor..range.start];
        text.push_str(before);
        char_cursor += before.chars().count();

        let spaces = padding_for(&markers[slot], surface, ctx);
        text.extend(std::iter::repeat_n(' ', spaces));
        gaps[slot] = Some(char_cursor..char_cursor + spaces);
        char_cursor += spaces;
        cursor = range.end;
    }
    text.push_str(&source[cursor..]);

    PaddedText { text, gaps }
}

/// Cut measured text into one fragment per visual line
pub fn fragments_of(measured: &MeasuredText, epsilon: f32) -> Vec<LineFragment> {
    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut start = 0;
    let mut last_top: Option<f32> = None;

    for (idx, (ch, rect)) in measured.iter().enumerate() {
        let top = *last_top.get_or_insert(rect.y);
        if (rect.y - top).abs() > epsilon {
            fragments.push(LineFragment {
                text: std::mem::take(&mut current),
                chars: start..idx,
                top,
            });
            start = idx;
            last_top = Some(rect.y);
        }
        current.push(ch);
    }

    if !current.is_empty() {
        fragments.push(LineFragment {
            text: current,
            chars: start..measured.len(),
            top: last_top.unwrap_or_default(),
        });
    }

    fragments
}

/// Splits paragraphs into visual lines on a measuring surface
pub struct LineSplitter<'a, S: TextSurface> {
    surface: &'a mut S,
    pub epsilon: f32,
}

impl<'a, S: TextSurface> LineSplitter<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        Self {
            surface,
            epsilon: LINE_EPSILON,
        }
    }

    pub fn pad(&mut self, source: &str, markers: &[Marker], ctx: &RenderContext) -> PaddedText {
        pad_markers(source, markers, &mut *self.surface, ctx)
    }

    /// Blank the markers out of `source` and split the result into visual lines
    pub fn split(
        &mut self,
        source: &str,
        markers: &[Marker],
        ctx: &RenderContext,
    ) -> Vec<LineFragment> {
        let padded = self.pad(source, markers, ctx);
        self.split_padded(&padded.text, ctx)
    }

    /// Split text that needs no padding. An empty text or a block without
    /// width yields no fragments at all, which callers treat as nothing to render.
    pub fn split_padded(&mut self, text: &str, ctx: &RenderContext) -> Vec<LineFragment> {
        if text.is_empty() || !(ctx.width > 0.0) {
            log::debug!(
                "nothing to split ({} chars in a {}px block)",
                text.chars().count(),
                ctx.width
            );
            return Vec::new();
        }

        // the measuring block only lives for this call
        let measured = self.surface.mount(text, ctx);
        fragments_of(&measured, self.epsilon)
    }
}
