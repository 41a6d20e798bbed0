use std::num::NonZeroUsize;
use std::path::Path;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Weight};
use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::types::Rect;

const FONT_FAMILY: &str = "sans-serif";
const FONT_SIZE: f32 = 16.0;
const FONT_WEIGHT: u16 = 400;
const LINE_HEIGHT: f32 = 24.0;
const BLOCK_WIDTH: f32 = 600.0;
const ADVANCE_CACHE_SIZE: NonZeroUsize = NonZeroUsize::new(1024).unwrap();

/// Text styling and block width under which line wrapping is evaluated.
/// Must mirror the live paragraph's computed style, otherwise the offsets
/// computed from it land in the wrong place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderContext {
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_font_weight")]
    pub font_weight: u16,
    /// Line height in pixels
    #[serde(default = "default_line_height")]
    pub line_height: f32,
    #[serde(default)]
    pub letter_spacing: f32,
    #[serde(default = "default_width")]
    pub width: f32,
}

fn default_font_family() -> String {
    FONT_FAMILY.to_string()
}
fn default_font_size() -> f32 {
    FONT_SIZE
}
fn default_font_weight() -> u16 {
    FONT_WEIGHT
}
fn default_line_height() -> f32 {
    LINE_HEIGHT
}
fn default_width() -> f32 {
    BLOCK_WIDTH
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_size: FONT_SIZE,
            font_weight: FONT_WEIGHT,
            line_height: LINE_HEIGHT,
            letter_spacing: 0.0,
            width: BLOCK_WIDTH,
        }
    }
}

/// Per-char geometry of a text laid out in an off-screen block
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredText {
    text: String,
    boxes: Vec<Rect>,
}

impl MeasuredText {
    /// `boxes` holds one rect per char of `text`.
    pub fn new(text: &str, boxes: Vec<Rect>) -> Self {
        debug_assert_eq!(text.chars().count(), boxes.len());
        Self {
            text: text.to_string(),
            boxes,
        }
    }

    /// Chars the surface produced no glyph for (newlines, ignorables) take
    /// the box of the char before them.
    fn from_sparse(text: &str, boxes: Vec<Option<Rect>>) -> Self {
        let mut last = Rect::default();
        let boxes = boxes
            .into_iter()
            .map(|slot| {
                if let Some(rect) = slot {
                    last = rect;
                }
                last
            })
            .collect();
        Self::new(text, boxes)
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn char_rect(&self, index: usize) -> Option<Rect> {
        self.boxes.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, Rect)> + '_ {
        self.text.chars().zip(self.boxes.iter().copied())
    }
}

/// Whatever can lay text out the way the real page does.
pub trait TextSurface {
    /// Lay `text` out in an off-screen block `ctx.width` wide (pre-wrap white
    /// space, over-long words broken) and report the box of every char.
    fn mount(&mut self, text: &str, ctx: &RenderContext) -> MeasuredText;

    /// Width of `text` on one unwrapped line.
    fn advance(&mut self, text: &str, ctx: &RenderContext) -> f32;
}

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    text: String,
    font_family: String,
    font_size_bits: u32,
    font_weight: u16,
}

pub struct CosmicTextSurface {
    font_system: FontSystem,
    cache: LruCache<MeasureKey, f32>,
}

impl CosmicTextSurface {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            cache: LruCache::new(ADVANCE_CACHE_SIZE),
        }
    }

    /// Make the fonts in `dir` available on top of the system fonts
    pub fn load_fonts_dir(&mut self, dir: &Path) {
        self.font_system.db_mut().load_fonts_dir(dir);
        self.cache.clear();
    }

    fn buffer(&mut self, text: &str, ctx: &RenderContext, width: Option<f32>) -> Buffer {
        if ctx.letter_spacing != 0.0 {
            log::debug!(
                "letter spacing {} ignored by the cosmic-text surface",
                ctx.letter_spacing
            );
        }

        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics {
                font_size: ctx.font_size,
                line_height: ctx.line_height,
            },
        );

        // the default wrap mode breaks at words and falls back to glyphs
        buffer.set_size(&mut self.font_system, width, None);

        let attrs = Attrs::new()
            .family(family_of(&ctx.font_family))
            .weight(Weight(ctx.font_weight));

        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        buffer
    }
}

impl Default for CosmicTextSurface {
    fn default() -> Self {
        Self::new()
    }
}

fn family_of(name: &str) -> Family<'_> {
    match name.trim().to_ascii_lowercase().as_str() {
        "sans-serif" => Family::SansSerif,
        "serif" => Family::Serif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name.trim()),
    }
}

/// Byte offset at which every buffer line starts. The buffer splits on
/// `\n`, `\r`, `\r\n` and `\n\r`, so the offsets come from its own lines.
fn buffer_line_starts(buffer: &Buffer) -> Vec<usize> {
    let mut starts = Vec::with_capacity(buffer.lines.len());
    let mut offset = 0;
    for line in &buffer.lines {
        starts.push(offset);
        offset += line.text().len() + line.ending().as_str().len();
    }
    starts
}

impl TextSurface for CosmicTextSurface {
    fn mount(&mut self, text: &str, ctx: &RenderContext) -> MeasuredText {
        let buffer = self.buffer(text, ctx, Some(ctx.width));

        let line_starts = buffer_line_starts(&buffer);
        let char_starts: Vec<usize> = text.char_indices().map(|(idx, _)| idx).collect();
        let mut boxes: Vec<Option<Rect>> = vec![None; char_starts.len()];

        for run in buffer.layout_runs() {
            let base = line_starts.get(run.line_i).copied().unwrap_or(0);
            for glyph in run.glyphs {
                let rect = Rect::new(glyph.x, run.line_top, glyph.w, run.line_height);
                let first = char_starts.partition_point(|&b| b < base + glyph.start);
                let last = char_starts.partition_point(|&b| b < base + glyph.end);
                for slot in &mut boxes[first..last.max(first)] {
                    slot.get_or_insert(rect);
                }
            }
        }

        MeasuredText::from_sparse(text, boxes)
    }

    fn advance(&mut self, text: &str, ctx: &RenderContext) -> f32 {
        let key = MeasureKey {
            text: text.to_string(),
            font_family: ctx.font_family.clone(),
            font_size_bits: ctx.font_size.to_bits(),
            font_weight: ctx.font_weight,
        };

        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let buffer = self.buffer(text, ctx, None);
        let width = buffer
            .layout_runs()
            .fold(0.0_f32, |width, run| width.max(run.line_w));

        self.cache.put(key, width);
        width
    }
}

/// Surface where every char advances by the same amount. Lays text out
/// the way a browser does for `white-space: pre-wrap; word-wrap: break-word`
/// with a monospace font, which keeps results reproducible without fonts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvanceSurface {
    /// Char advance as a fraction of the font size
    pub em_ratio: f32,
}

impl FixedAdvanceSurface {
    pub fn new(em_ratio: f32) -> Self {
        Self { em_ratio }
    }

    pub fn char_advance(&self, ctx: &RenderContext) -> f32 {
        ctx.font_size * self.em_ratio + ctx.letter_spacing
    }
}

impl Default for FixedAdvanceSurface {
    fn default() -> Self {
        Self::new(0.6)
    }
}

/// Split `text` into alternating runs of whitespace and non-whitespace
fn runs(text: &str) -> Vec<(&str, bool)> {
    let mut out = Vec::new();
    let mut chars = text.char_indices();
    let Some((_, first_ch)) = chars.next() else {
        return out;
    };

    let mut start = 0;
    let mut in_whitespace = first_ch.is_whitespace();
    for (idx, ch) in chars {
        if ch.is_whitespace() != in_whitespace {
            out.push((&text[start..idx], in_whitespace));
            start = idx;
            in_whitespace = ch.is_whitespace();
        }
    }
    out.push((&text[start..], in_whitespace));
    out
}

impl TextSurface for FixedAdvanceSurface {
    fn mount(&mut self, text: &str, ctx: &RenderContext) -> MeasuredText {
        let advance = self.char_advance(ctx);
        let line_height = ctx.line_height;
        let max_columns = if advance > 0.0 {
            ((ctx.width + 1e-3) / advance).floor().max(0.0) as usize
        } else {
            usize::MAX
        };

        let mut boxes = Vec::with_capacity(text.len());
        let mut line = 0usize;
        let mut column = 0usize;

        for (run, is_whitespace) in runs(text) {
            if is_whitespace {
                // trailing white space hangs past the edge instead of wrapping
                for ch in run.chars() {
                    let top = line as f32 * line_height;
                    if ch == '\n' {
                        boxes.push(Rect::new(column as f32 * advance, top, 0.0, line_height));
                        line += 1;
                        column = 0;
                        continue;
                    }
                    boxes.push(Rect::new(column as f32 * advance, top, advance, line_height));
                    column += 1;
                }
                continue;
            }

            let run_len = run.chars().count();
            if column > 0 && column + run_len > max_columns {
                line += 1;
                column = 0;
            }

            for _ in run.chars() {
                if column > 0 && column + 1 > max_columns {
                    line += 1;
                    column = 0;
                }
                boxes.push(Rect::new(
                    column as f32 * advance,
                    line as f32 * line_height,
                    advance,
                    line_height,
                ));
                column += 1;
            }
        }

        MeasuredText::new(text, boxes)
    }

    fn advance(&mut self, text: &str, ctx: &RenderContext) -> f32 {
        text.chars().count() as f32 * self.char_advance(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(width: f32) -> RenderContext {
        RenderContext {
            font_size: 10.0,
            line_height: 12.0,
            width,
            ..RenderContext::default()
        }
    }

    fn line_of(measured: &MeasuredText, index: usize) -> usize {
        (measured.char_rect(index).unwrap().y / 12.0).round() as usize
    }

    #[test]
    fn fixed_surface_wraps_at_white_space() {
        let mut surface = FixedAdvanceSurface::new(1.0);
        // ten columns per line
        let measured = surface.mount("aaaa bbbb cccc", &ctx(100.0));

        assert_eq!(measured.len(), 14);
        assert_eq!(line_of(&measured, 0), 0);
        assert_eq!(line_of(&measured, 5), 0);
        assert_eq!(line_of(&measured, 9), 0);
        assert_eq!(line_of(&measured, 10), 1);
        assert_eq!(measured.char_rect(10).unwrap().x, 0.0);
    }

    #[test]
    fn fixed_surface_breaks_over_long_words() {
        let mut surface = FixedAdvanceSurface::new(1.0);
        let measured = surface.mount("abcdefgh", &ctx(30.0));

        let lines: Vec<usize> = (0..8).map(|i| line_of(&measured, i)).collect();
        assert_eq!(lines, vec![0, 0, 0, 1, 1, 1, 2, 2]);
    }

    #[test]
    fn fixed_surface_honours_newlines() {
        let mut surface = FixedAdvanceSurface::new(1.0);
        let measured = surface.mount("ab\ncd", &ctx(100.0));

        assert_eq!(line_of(&measured, 2), 0);
        assert_eq!(line_of(&measured, 3), 1);
        assert_eq!(measured.char_rect(3).unwrap().x, 0.0);
    }

    #[test]
    fn fixed_surface_advance_includes_letter_spacing() {
        let mut surface = FixedAdvanceSurface::new(0.5);
        let spaced = RenderContext {
            letter_spacing: 1.0,
            ..ctx(100.0)
        };
        assert_eq!(surface.advance("abcd", &spaced), 24.0);
    }

    #[test]
    fn sparse_boxes_inherit_the_previous_char() {
        let first = Rect::new(1.0, 2.0, 3.0, 4.0);
        let measured = MeasuredText::from_sparse("ab", vec![Some(first), None]);
        assert_eq!(measured.char_rect(1), Some(first));
    }

    fn cosmic_ctx(width: f32) -> RenderContext {
        RenderContext {
            font_family: "sans-serif".to_string(),
            font_size: 16.0,
            line_height: 20.0,
            width,
            ..RenderContext::default()
        }
    }

    #[test]
    fn buffer_line_starts_follow_every_line_ending() {
        let mut surface = CosmicTextSurface::new();
        let ctx = cosmic_ctx(400.0);

        for (text, expected) in [
            ("ab\ncd", vec![0, 3]),
            ("ab\rcd", vec![0, 3]),
            ("ab\r\ncd", vec![0, 4]),
            ("ab\n\rcd", vec![0, 4]),
            ("a\rb\nc", vec![0, 2, 4]),
        ] {
            let buffer = surface.buffer(text, &ctx, Some(ctx.width));
            assert_eq!(buffer_line_starts(&buffer), expected, "{:?}", text);
        }
    }

    #[test]
    fn cosmic_mount_gives_one_box_per_char() {
        let mut surface = CosmicTextSurface::new();
        let text = "héllo wörld, one more line of text";
        let measured = surface.mount(text, &cosmic_ctx(400.0));

        assert_eq!(measured.len(), text.chars().count());
    }

    #[test]
    fn cosmic_mount_tops_never_move_up() {
        let mut surface = CosmicTextSurface::new();
        let text = "The nuclear control room is an interactive installation at the museum.";
        let measured = surface.mount(text, &cosmic_ctx(120.0));

        let tops: Vec<f32> = measured.iter().map(|(_, rect)| rect.y).collect();
        assert!(tops.windows(2).all(|pair| pair[0] <= pair[1]), "{:?}", tops);
        assert!(tops[tops.len() - 1] > tops[0], "text never wrapped");
    }

    #[test]
    fn cosmic_mount_starts_a_line_at_every_line_ending() {
        let mut surface = CosmicTextSurface::new();

        for text in ["ab\ncd", "ab\rcd", "ab\r\ncd", "ab\n\rcd"] {
            let measured = surface.mount(text, &cosmic_ctx(400.0));
            let chars = text.chars().count();
            let a = measured.char_rect(0).unwrap();
            let c = measured.char_rect(chars - 2).unwrap();
            let d = measured.char_rect(chars - 1).unwrap();

            assert!(c.y > a.y, "{:?}: c stayed on the first line", text);
            assert!(c.x < d.x, "{:?}: c at {} not before d at {}", text, c.x, d.x);
            assert!(c.x.abs() < 1e-3, "{:?}: c does not start its line", text);
        }
    }

    #[test]
    fn cosmic_split_is_idempotent_on_a_narrow_block() {
        use crate::splitter::LineSplitter;

        let mut surface = CosmicTextSurface::new();
        let ctx = cosmic_ctx(60.0);
        let text = "     is a test.      is another test.";

        let first = LineSplitter::new(&mut surface).split_padded(text, &ctx);
        let second = LineSplitter::new(&mut surface).split_padded(text, &ctx);

        assert!(first.len() > 1);
        assert_eq!(first, second);
        assert_eq!(first.iter().map(|f| f.text.as_str()).collect::<String>(), text);
        assert!(first.windows(2).all(|pair| pair[0].top < pair[1].top));
    }

    #[test]
    fn generic_family_names_map_to_cosmic_families() {
        assert_eq!(family_of("Monospace"), Family::Monospace);
        assert_eq!(family_of(" Inter "), Family::Name("Inter"));
    }
}
