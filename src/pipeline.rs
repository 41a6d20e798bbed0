use serde::Serialize;

use crate::aligner::{Aligner, ContainerMetrics, Label};
use crate::error::LayoutError;
use crate::fonts::{RenderContext, TextSurface};
use crate::locator::locate;
use crate::motion::MotionPlan;
use crate::page::{LabelAlign, Page, Profile};
use crate::paragraph::Paragraph;
use crate::splitter::LineSplitter;
use crate::types::{LineFragment, LocatedMarker, PlacementOffset, Rect};

/// Result of one layout pass. Built from scratch on every pass.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutReport {
    pub page: String,
    pub viewport: f32,
    pub context: RenderContext,
    pub padded_text: String,
    pub paragraph: Paragraph,
    pub lines: Vec<LineFragment>,
    pub gaps: Vec<LocatedMarker>,
    /// Boxes of the gaps that could be found in the live paragraph
    pub gap_boxes: Vec<Rect>,
    /// Labels where they stood before moving
    pub labels: Vec<Label>,
    pub offsets: Vec<PlacementOffset>,
    pub motion: MotionPlan,
}

impl LayoutReport {
    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Where the label of `marker_index` ends up once its move has played
    pub fn settled_label(&self, marker_index: usize) -> Option<Rect> {
        let label = self.labels.get(marker_index)?;
        let rect = match self.offsets.iter().find(|o| o.marker_index == marker_index) {
            Some(offset) => label.rect.translated(offset.dx, offset.dy),
            None => label.rect,
        };
        Some(rect)
    }
}

/// Runs the whole chain for a page: pad, split, rebuild, locate, align, plan
pub struct LayoutPass<'a, S: TextSurface> {
    surface: &'a mut S,
}

impl<'a, S: TextSurface> LayoutPass<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        Self { surface }
    }

    pub fn run(&mut self, page: &Page, viewport_width: f32) -> Result<LayoutReport, LayoutError> {
        let profile = page.profile_for(viewport_width)?;
        let ctx = &profile.context;
        let anchors = page.anchors()?;
        let markers = page.markers();

        let mut splitter = LineSplitter::new(&mut *self.surface);
        let padded = splitter.pad(&page.text, &markers, ctx);
        let lines = splitter.split_padded(&padded.text, ctx);

        let mut paragraph = Paragraph::new(profile.paragraph, ctx.line_height);
        let labels = self.labels_for(profile, &markers_names(page));

        if lines.is_empty() {
            log::debug!("page '{}' has nothing to lay out", page.name);
            return Ok(LayoutReport {
                page: page.name.clone(),
                viewport: viewport_width,
                context: ctx.clone(),
                padded_text: padded.text,
                paragraph,
                lines,
                gaps: Vec::new(),
                gap_boxes: Vec::new(),
                labels,
                offsets: Vec::new(),
                motion: MotionPlan::default(),
            });
        }

        paragraph.rebuild(&lines);
        let gaps = locate(&paragraph.text_content(), &anchors);

        let mut aligner = Aligner::new(&paragraph, &mut *self.surface, ctx);
        let gap_boxes = gaps.iter().filter_map(|gap| aligner.gap_rect(gap)).collect();
        let offsets = aligner.align(
            &gaps,
            &labels,
            ContainerMetrics {
                line_height: ctx.line_height,
            },
        );

        log::info!(
            "page '{}' at {}px: {} lines, {}/{} labels aligned",
            page.name,
            viewport_width,
            lines.len(),
            offsets.len(),
            page.markers.len()
        );

        let motion = MotionPlan::new(&page.motion, lines.len(), &offsets);

        Ok(LayoutReport {
            page: page.name.clone(),
            viewport: viewport_width,
            context: ctx.clone(),
            padded_text: padded.text,
            paragraph,
            lines,
            gaps,
            gap_boxes,
            labels,
            offsets,
            motion,
        })
    }

    /// Lay the label column out the way the page template stacks it
    fn labels_for(&mut self, profile: &Profile, names: &[&str]) -> Vec<Label> {
        let ctx = &profile.context;
        let column = &profile.labels;
        let spacing = column.spacing.unwrap_or(ctx.line_height);

        names
            .iter()
            .enumerate()
            .map(|(row, name)| {
                let width = self.surface.advance(name, ctx);
                let x = match column.align {
                    LabelAlign::Left => column.x,
                    LabelAlign::Right => column.x - width,
                };
                let y = column.y + row as f32 * spacing;
                Label::new(*name, Rect::new(x, y, width, ctx.line_height))
            })
            .collect()
    }
}

fn markers_names(page: &Page) -> Vec<&str> {
    page.markers.iter().map(|m| m.name.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FixedAdvanceSurface;

    const PAGE: &str = r#"
name = "test"
text = "AAAA is a test. BBBB is another test."

[[markers]]
name = "AAAA"
anchor = '^\s+is a test'

[[markers]]
name = "BBBB"
anchor = '\.\s+is another test'

[desktop]
font_size = 10.0
line_height = 20.0
width = 1000.0
paragraph = { x = 100.0, y = 200.0 }
labels = { x = 40.0, y = 100.0 }

[mobile]
font_size = 10.0
line_height = 20.0
width = 0.0
paragraph = { x = 0.0, y = 0.0 }
labels = { x = 300.0, y = 0.0, align = "right" }
"#;

    #[test]
    fn wide_page_aligns_every_label() {
        let page = Page::from_toml(PAGE).unwrap();
        let mut surface = FixedAdvanceSurface::new(1.0);
        let report = LayoutPass::new(&mut surface).run(&page, 1280.0).unwrap();

        assert_eq!(report.lines.len(), 1);
        assert_eq!(report.gaps.len(), 2);
        assert_eq!(report.offsets.len(), 2);

        // gap 0 starts the paragraph, gap 1 starts after "     is a test."
        assert_eq!(report.offsets[0].dx, 60.0);
        assert_eq!(report.offsets[0].dy, 80.0);
        assert_eq!(report.offsets[1].dx, 210.0);
        assert_eq!(report.offsets[1].dy, 60.0);

        assert_eq!(
            report.settled_label(1),
            Some(Rect::new(250.0, 180.0, 40.0, 20.0))
        );
        assert_eq!(report.motion.entrance.len(), 1);
        assert_eq!(report.motion.labels.len(), 2);

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["gaps"][1]["start"], 15);
        assert_eq!(json["lines"][0]["text"], "     is a test.      is another test.");
    }

    #[test]
    fn zero_width_profile_is_a_no_op() {
        let page = Page::from_toml(PAGE).unwrap();
        let mut surface = FixedAdvanceSurface::new(1.0);
        let report = LayoutPass::new(&mut surface).run(&page, 390.0).unwrap();

        assert!(report.lines.is_empty());
        assert!(report.offsets.is_empty());
        assert!(report.paragraph.is_empty());
        assert_eq!(report.labels[0].rect.x, 260.0);
    }

    #[test]
    fn invalid_anchor_aborts_the_pass() {
        let mut page = Page::from_toml(PAGE).unwrap();
        page.markers[1].anchor = "(".to_string();
        let mut surface = FixedAdvanceSurface::new(1.0);

        let err = LayoutPass::new(&mut surface).run(&page, 1280.0).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidAnchor { index: 1, .. }));
    }
}
