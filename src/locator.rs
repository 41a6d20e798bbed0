use regex::Regex;

use crate::error::LayoutError;
use crate::types::LocatedMarker;

/// Pattern matching the sentence around a marker. Once the marker is blanked
/// out it can only be found by what surrounds it.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub marker_index: usize,
    pattern: Regex,
}

impl Anchor {
    pub fn new(marker_index: usize, pattern: &str) -> Result<Self, LayoutError> {
        let pattern = Regex::new(pattern).map_err(|source| LayoutError::InvalidAnchor {
            index: marker_index,
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            marker_index,
            pattern,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Byte range of the gap: capture group 1 when it took part in the
    /// match, otherwise the first run of white space inside the match
    fn gap(&self, text: &str) -> Option<(usize, usize)> {
        let captures = self.pattern.captures(text)?;
        if let Some(group) = captures.get(1) {
            return Some((group.start(), group.end()));
        }

        let matched = captures.get(0)?;
        let slice = matched.as_str();
        let start = slice.find(char::is_whitespace)?;
        let len = slice[start..]
            .find(|ch: char| !ch.is_whitespace())
            .unwrap_or(slice.len() - start);

        Some((matched.start() + start, matched.start() + start + len))
    }
}

/// Find every anchored gap in `text`. Anchors that do not match are logged and
/// skipped; the remaining markers are still located.
pub fn locate(text: &str, anchors: &[Anchor]) -> Vec<LocatedMarker> {
    let mut located = Vec::with_capacity(anchors.len());

    for anchor in anchors {
        let Some((start, end)) = anchor.gap(text) else {
            log::warn!(
                "anchor `{}` for marker {} not found, label stays put",
                anchor.pattern(),
                anchor.marker_index
            );
            continue;
        };

        if start == end {
            log::warn!(
                "anchor `{}` for marker {} matched an empty gap",
                anchor.pattern(),
                anchor.marker_index
            );
            continue;
        }

        located.push(LocatedMarker {
            start: char_offset(text, start),
            end: char_offset(text, end),
            marker_index: anchor.marker_index,
        });
    }

    located
}

fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}
