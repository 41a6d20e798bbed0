use serde::Serialize;

use crate::fonts::{RenderContext, TextSurface};
use crate::paragraph::Paragraph;
use crate::types::{LocatedMarker, PlacementOffset, Rect};

/// An externally owned element that gets moved over its marker's gap.
/// Labels are never created or destroyed here, only measured against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub name: String,
    /// Current laid-out box
    pub rect: Rect,
    /// Top captured before any move
    pub original_top: f32,
}

impl Label {
    pub fn new(name: impl Into<String>, rect: Rect) -> Self {
        Self {
            name: name.into(),
            rect,
            original_top: rect.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerMetrics {
    pub line_height: f32,
}

/// Computes how far each label has to travel. It reads geometry from the
/// live paragraph, so the paragraph must already be rebuilt.
pub struct Aligner<'a, S: TextSurface> {
    paragraph: &'a Paragraph,
    surface: &'a mut S,
    ctx: &'a RenderContext,
}

impl<'a, S: TextSurface> Aligner<'a, S> {
    pub fn new(paragraph: &'a Paragraph, surface: &'a mut S, ctx: &'a RenderContext) -> Self {
        Self {
            paragraph,
            surface,
            ctx,
        }
    }

    /// Box of a located gap in the live paragraph
    pub fn gap_rect(&mut self, marker: &LocatedMarker) -> Option<Rect> {
        self.paragraph
            .range_rect(marker.range(), &mut *self.surface, self.ctx)
    }

    /// One offset per located marker whose label exists and whose gap can be
    /// found in the live paragraph; anything else is skipped.
    pub fn align(
        &mut self,
        located: &[LocatedMarker],
        labels: &[Label],
        metrics: ContainerMetrics,
    ) -> Vec<PlacementOffset> {
        let mut offsets = Vec::with_capacity(located.len());

        for marker in located {
            let Some(label) = labels.get(marker.marker_index) else {
                log::warn!("no label for marker {}", marker.marker_index);
                continue;
            };

            let Some(gap) = self.gap_rect(marker) else {
                log::warn!(
                    "gap {}..{} of marker {} is outside the paragraph",
                    marker.start,
                    marker.end,
                    marker.marker_index
                );
                continue;
            };

            offsets.push(PlacementOffset {
                marker_index: marker.marker_index,
                dx: gap.x - label.rect.x,
                dy: (gap.y - label.original_top) - metrics.line_height,
            });
        }

        offsets
    }
}
