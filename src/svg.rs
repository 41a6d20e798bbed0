use crate::pipeline::LayoutReport;
use crate::types::Rect;

const BACKGROUND: &str = "#fdf6e3";
const TEXT: &str = "#586e75";
const LABEL: &str = "#073642";
const DEBUG: &str = "#dc322f";
const MARGIN: f32 = 32.0;

/// What the preview shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewOptions {
    /// Outline every located gap
    pub debug_gaps: bool,
    /// Draw labels where they start instead of where they settle
    pub labels_at_rest: bool,
}

/// XML 1.0 valid char ranges
fn is_valid_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c if is_valid_xml_char(c) => escaped.push(c),
            _ => {}
        }
    }
    escaped
}

/// Renders the settled page (paragraph plus labels) as a standalone SVG
pub struct Preview<'a> {
    report: &'a LayoutReport,
    options: PreviewOptions,
    svg_content: String,
}

impl<'a> Preview<'a> {
    pub fn new(report: &'a LayoutReport, options: PreviewOptions) -> Self {
        Self {
            report,
            options,
            svg_content: String::new(),
        }
    }

    pub fn render(mut self) -> String {
        let report = self.report;
        let ctx = &report.context;
        let mut bottom: f32 = 0.0;

        for (line, child) in report.paragraph.children().iter().enumerate() {
            let top = report.paragraph.line_top(line);
            self.svg_content.push_str(r#"<g class="line">"#);
            self.draw_text_at(
                report.paragraph.origin.x,
                top + ctx.font_size,
                &child.span.text,
                TEXT,
            );
            self.svg_content.push_str("</g>");
            bottom = bottom.max(top + report.paragraph.line_height);
        }

        if self.options.debug_gaps {
            for rect in &report.gap_boxes {
                self.draw_outline(*rect);
            }
        }

        for (index, label) in report.labels.iter().enumerate() {
            let rect = if self.options.labels_at_rest {
                Some(label.rect)
            } else {
                report.settled_label(index)
            };
            let Some(rect) = rect else {
                continue;
            };
            self.draw_text_at(rect.x, rect.y + ctx.font_size, &label.name, LABEL);
            bottom = bottom.max(rect.bottom());
        }

        let width = report.viewport.max(report.paragraph.origin.x + ctx.width);
        self.finalize_svg(width, bottom + MARGIN)
    }

    fn draw_text_at(&mut self, x: f32, y: f32, text: &str, fill: &str) {
        let ctx = &self.report.context;
        self.svg_content.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.2}" font-weight="{}" fill="{}" xml:space="preserve">{}</text>"#,
            x,
            y,
            escape_xml(&ctx.font_family),
            ctx.font_size,
            ctx.font_weight,
            fill,
            escape_xml(text),
        ));
    }

    fn draw_outline(&mut self, rect: Rect) {
        self.svg_content.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="{}" stroke-width="1" />"#,
            rect.x, rect.y, rect.width, rect.height, DEBUG,
        ));
    }

    fn finalize_svg(&self, width: f32, height: f32) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" width="{}" height="{}"><rect width="100%" height="100%" fill="{}" />{}</svg>"#,
            width, height, width, height, BACKGROUND, self.svg_content,
        )
    }
}
