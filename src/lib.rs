//! Measure where a paragraph really wraps, rebuild it as one span per visual
//! line, and work out how far external labels must move to sit over the gaps
//! left by the marker words blanked out of it.

pub mod aligner;
pub mod error;
pub mod fonts;
pub mod locator;
pub mod motion;
pub mod page;
pub mod paragraph;
pub mod pipeline;
pub mod splitter;
pub mod svg;
pub mod types;

pub use aligner::{Aligner, ContainerMetrics, Label};
pub use error::LayoutError;
pub use fonts::{CosmicTextSurface, FixedAdvanceSurface, MeasuredText, RenderContext, TextSurface};
pub use locator::{Anchor, locate};
pub use page::Page;
pub use paragraph::Paragraph;
pub use pipeline::{LayoutPass, LayoutReport};
pub use splitter::{LINE_EPSILON, LineSplitter};
pub use types::{LineFragment, LocatedMarker, Marker, PlacementOffset, Point, Rect};
