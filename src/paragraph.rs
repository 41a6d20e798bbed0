use std::ops::Range;

use serde::Serialize;

use crate::fonts::{RenderContext, TextSurface};
use crate::types::{LineFragment, Point, Rect};

/// Inline run of text inside a line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Span {
    pub text: String,
}

/// Line-level wrapper; the unit entrance and exit animations address
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineNode {
    pub span: Span,
}

/// The live, visible paragraph. Every child sits on its own line, one
/// `line_height` below the previous one, and never wraps again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paragraph {
    pub origin: Point,
    pub line_height: f32,
    children: Vec<LineNode>,
}

impl Paragraph {
    pub fn new(origin: Point, line_height: f32) -> Self {
        Self {
            origin,
            line_height,
            children: Vec::new(),
        }
    }

    /// Drop every child and append one line wrapper per fragment
    pub fn rebuild(&mut self, fragments: &[LineFragment]) {
        self.children.clear();
        self.children.extend(fragments.iter().map(|fragment| LineNode {
            span: Span {
                text: fragment.text.clone(),
            },
        }));
    }

    pub fn children(&self) -> &[LineNode] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .map(|child| child.span.text.as_str())
            .collect()
    }

    /// Top of the line box of child `line`
    pub fn line_top(&self, line: usize) -> f32 {
        self.origin.y + line as f32 * self.line_height
    }

    /// Child holding char `position` of the text content, with the char
    /// offset at which that child starts
    pub fn node_at(&self, position: usize) -> Option<(usize, usize)> {
        let mut node_start = 0;
        for (line, child) in self.children.iter().enumerate() {
            let len = child.span.text.chars().count();
            if position >= node_start && position < node_start + len {
                return Some((line, node_start));
            }
            node_start += len;
        }
        None
    }

    /// Bounding box of a char range of the text content. The range is cut
    /// short at the end of the line its start falls on.
    pub fn range_rect<S: TextSurface>(
        &self,
        range: Range<usize>,
        surface: &mut S,
        ctx: &RenderContext,
    ) -> Option<Rect> {
        let (line, node_start) = self.node_at(range.start)?;
        let text = &self.children[line].span.text;
        let len = text.chars().count();

        let start = range.start - node_start;
        let end = (start + range.end.saturating_sub(range.start)).min(len);

        let prefix: String = text.chars().take(start).collect();
        let covered: String = text.chars().skip(start).take(end - start).collect();

        let x = self.origin.x + surface.advance(&prefix, ctx);
        let width = surface.advance(&covered, ctx);

        Some(Rect::new(x, self.line_top(line), width, self.line_height))
    }
}
