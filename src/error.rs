use thiserror::Error;

/// Errors that abort a whole layout pass. Per-marker failures never show up here,
/// they are logged and the marker is skipped.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("no render profile configured for a {viewport}px wide viewport")]
    /// The viewport selects a profile the page does not define
    MissingProfile { viewport: f32 },

    #[error("anchor for marker {index} (`{pattern}`) is not a valid pattern")]
    /// A marker anchor failed to compile
    InvalidAnchor {
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown built-in page '{name}'. Available: {available}")]
    /// No built-in page with that name
    UnknownPage { name: String, available: String },

    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error("failed to parse page TOML: {0}")]
    /// [toml] failed to parse the page file
    Toml(#[from] toml::de::Error),

    #[error("failed to parse page YAML: {0}")]
    /// [serde_yaml] failed to parse the page file
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    /// [serde_json] failed to encode the report
    Json(#[from] serde_json::Error),
}
