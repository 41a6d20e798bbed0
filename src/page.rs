use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::fonts::RenderContext;
use crate::locator::Anchor;
use crate::motion::MotionConfig;
use crate::types::{Marker, Point};

const BUILTIN_PAGES: &[(&str, &str)] = &[("about", include_str!("../pages/about.toml"))];

const BREAKPOINT: f32 = 768.0;

/// Which edge of the label column the labels hang from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelAlign {
    #[default]
    Left,
    Right,
}

/// Where the labels sit before they move: a column starting at `(x, y)`,
/// one label every `spacing` pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelColumn {
    pub x: f32,
    pub y: f32,
    /// Defaults to the profile's line height
    #[serde(default)]
    pub spacing: Option<f32>,
    #[serde(default)]
    pub align: LabelAlign,
}

/// Layout of the page at one viewport class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(flatten)]
    pub context: RenderContext,
    /// Top-left corner of the live paragraph
    pub paragraph: Point,
    pub labels: LabelColumn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub name: String,
    /// Pattern matching the sentence around the blanked marker
    pub anchor: String,
    /// Fixed number of padding spaces instead of a measured one
    #[serde(default)]
    pub padding: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub name: String,
    pub text: String,
    #[serde(default)]
    pub markers: Vec<MarkerSpec>,
    /// Viewports narrower than this use the mobile profile
    #[serde(default = "default_breakpoint")]
    pub breakpoint: f32,
    pub desktop: Profile,
    #[serde(default)]
    pub mobile: Option<Profile>,
    #[serde(default)]
    pub motion: MotionConfig,
}

fn default_breakpoint() -> f32 {
    BREAKPOINT
}

/// Built-in pages are keyed in lower snake case
fn normalize_page_name(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('-', "_")
}

impl Page {
    pub fn from_builtin(name: &str) -> Result<Self, LayoutError> {
        let normalized = normalize_page_name(name);
        let content = BUILTIN_PAGES
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, c)| *c)
            .ok_or_else(|| LayoutError::UnknownPage {
                name: name.to_string(),
                available: Self::list_builtins().join(", "),
            })?;
        Self::from_toml(content)
    }

    pub fn list_builtins() -> Vec<&'static str> {
        BUILTIN_PAGES.iter().map(|(n, _)| *n).collect()
    }

    pub fn from_toml(content: &str) -> Result<Self, LayoutError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> Result<Self, LayoutError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Read a page file. `.yaml`/`.yml` files are YAML; anything else is tried
    /// as TOML first, then as YAML.
    pub fn from_path(path: &Path) -> Result<Self, LayoutError> {
        let content = std::fs::read_to_string(path)?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        );
        if is_yaml {
            return Self::from_yaml(&content);
        }

        match Self::from_toml(&content) {
            Ok(page) => Ok(page),
            Err(toml_err) => Self::from_yaml(&content).map_err(|_| toml_err),
        }
    }

    /// Profile for a viewport `viewport_width` pixels wide
    pub fn profile_for(&self, viewport_width: f32) -> Result<&Profile, LayoutError> {
        if viewport_width >= self.breakpoint {
            return Ok(&self.desktop);
        }
        self.mobile.as_ref().ok_or(LayoutError::MissingProfile {
            viewport: viewport_width,
        })
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.markers
            .iter()
            .enumerate()
            .map(|(index, spec)| Marker {
                index,
                name: spec.name.clone(),
                padding: spec.padding,
            })
            .collect()
    }

    pub fn anchors(&self) -> Result<Vec<Anchor>, LayoutError> {
        self.markers
            .iter()
            .enumerate()
            .map(|(index, spec)| Anchor::new(index, &spec.anchor))
            .collect()
    }
}
