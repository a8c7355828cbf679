//! Composite resource IDs
//!
//! Resources whose remote identity spans several keys persist an ID made of
//! ordered segments joined by [`ID_SEPARATOR`], e.g. `my-ns#pulsar-abc123`.

use crate::error::{CloudError, Result};
use std::fmt;

pub const ID_SEPARATOR: &str = "#";

/// Parsed resource ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    segments: Vec<String>,
}

impl ResourceId {
    /// Build an ID from its segments
    pub fn compose<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        let joined = segments.join(ID_SEPARATOR);

        if segments.is_empty() {
            return Err(invalid(&joined, "no segments"));
        }
        for segment in &segments {
            if segment.is_empty() {
                return Err(invalid(&joined, "empty segment"));
            }
            if segment.contains(ID_SEPARATOR) {
                return Err(invalid(
                    &joined,
                    &format!("segment `{}` contains `{}`", segment, ID_SEPARATOR),
                ));
            }
        }

        Ok(Self { segments })
    }

    /// Single-segment ID
    pub fn single(id: impl Into<String>) -> Result<Self> {
        Self::compose([id.into()])
    }

    /// Parse a persisted ID, checking the segment count the type expects
    pub fn parse(raw: &str, expected_segments: usize) -> Result<Self> {
        let segments: Vec<&str> = raw.split(ID_SEPARATOR).collect();
        if segments.len() != expected_segments {
            return Err(invalid(
                raw,
                &format!(
                    "expected {} segment(s) separated by `{}`, got {}",
                    expected_segments,
                    ID_SEPARATOR,
                    segments.len()
                ),
            ));
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid(raw, "empty segment"));
        }

        Ok(Self {
            segments: segments.into_iter().map(str::to_string).collect(),
        })
    }

    pub fn segment(&self, index: usize) -> &str {
        &self.segments[index]
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(ID_SEPARATOR))
    }
}

fn invalid(id: &str, reason: &str) -> CloudError {
    CloudError::InvalidId {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_and_parse() {
        let id = ResourceId::compose(["ns-1", "pulsar-abc"]).unwrap();
        assert_eq!(id.to_string(), "ns-1#pulsar-abc");

        let parsed = ResourceId::parse(&id.to_string(), 2).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.segment(0), "ns-1");
        assert_eq!(parsed.segment(1), "pulsar-abc");
    }

    #[test]
    fn test_parse_wrong_segment_count() {
        let err = ResourceId::parse("only-one", 2).unwrap_err();
        assert!(matches!(err, CloudError::InvalidId { .. }));

        let err = ResourceId::parse("a#b#c", 2).unwrap_err();
        assert!(err.to_string().contains("got 3"));
    }

    #[test]
    fn test_parse_empty_segment() {
        assert!(ResourceId::parse("a#", 2).is_err());
        assert!(ResourceId::parse("", 1).is_err());
    }

    #[test]
    fn test_compose_rejects_separator() {
        assert!(ResourceId::compose(["a#b"]).is_err());
        assert!(ResourceId::compose(Vec::<String>::new()).is_err());
    }
}
