//! Detail references: which movie or show a details request points at.
//!
//! Accepted shapes are `movie/27205`, `tv:1399`, a bare id (treated as a
//! movie), or a watch-page URL such as `https://xprime.tv/watch/1399?type=tv`.
//! URLs also contribute the origin used for anti-hotlinking headers.

use std::fmt;

use url::Url;

use crate::errors::MediaSearchError;
use crate::types::MediaKind;

/// Parsed details request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailReference {
    /// Movie or TV
    pub kind: MediaKind,
    /// Metadata provider id
    pub tmdb_id: u64,
    /// Origin of the page the reference came from, if it was a URL
    pub origin: Option<String>,
}

impl DetailReference {
    /// Builds a reference without an origin.
    pub fn new(kind: MediaKind, tmdb_id: u64) -> Self {
        Self {
            kind,
            tmdb_id,
            origin: None,
        }
    }

    /// Parses any supported reference shape.
    ///
    /// # Errors
    ///
    /// - `MediaSearchError::InvalidReference` - If no numeric provider id can be extracted
    pub fn parse(raw: &str) -> Result<Self, MediaSearchError> {
        let trimmed = raw.trim();
        let invalid = || MediaSearchError::InvalidReference {
            reference: raw.to_string(),
        };

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            let url = Url::parse(trimmed).map_err(|_| invalid())?;
            return Self::from_url(&url).ok_or_else(invalid);
        }

        let segments: Vec<&str> = trimmed
            .split(['/', ':'])
            .filter(|segment| !segment.is_empty())
            .collect();
        let kind = segments
            .iter()
            .find_map(|segment| MediaKind::parse(segment))
            .unwrap_or(MediaKind::Movie);
        let tmdb_id = segments
            .iter()
            .find_map(|segment| leading_number(segment))
            .ok_or_else(invalid)?;

        Ok(Self::new(kind, tmdb_id))
    }

    fn from_url(url: &Url) -> Option<Self> {
        let query_value = |name: &str| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        };

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let kind = query_value("type")
            .and_then(|value| MediaKind::parse(&value))
            .or_else(|| segments.iter().find_map(|segment| MediaKind::parse(segment)))
            .unwrap_or(MediaKind::Movie);

        let tmdb_id = query_value("id")
            .and_then(|value| leading_number(&value))
            .or_else(|| segments.iter().find_map(|segment| leading_number(segment)))?;

        let origin = url.origin();
        Some(Self {
            kind,
            tmdb_id,
            origin: origin.is_tuple().then(|| origin.ascii_serialization()),
        })
    }

    /// Origin for `Referer`/`Origin` headers, falling back to `default_origin`.
    pub fn origin_or<'a>(&'a self, default_origin: &'a str) -> &'a str {
        self.origin.as_deref().unwrap_or(default_origin)
    }
}

impl fmt::Display for DetailReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.tmdb_id)
    }
}

/// Parses the digits a segment starts with, e.g. `1399-game-of-thrones`.
fn leading_number(segment: &str) -> Option<u64> {
    let end = segment
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(segment.len(), |(index, _)| index);
    segment[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_shapes() {
        assert_eq!(
            DetailReference::parse("movie/27205").unwrap(),
            DetailReference::new(MediaKind::Movie, 27205)
        );
        assert_eq!(
            DetailReference::parse("tv:1399").unwrap(),
            DetailReference::new(MediaKind::Tv, 1399)
        );
        assert_eq!(
            DetailReference::parse("/tv/1399-game-of-thrones").unwrap(),
            DetailReference::new(MediaKind::Tv, 1399)
        );
        assert_eq!(
            DetailReference::parse(" 949 ").unwrap(),
            DetailReference::new(MediaKind::Movie, 949)
        );
    }

    #[test]
    fn test_parse_url_uses_query_type_and_origin() {
        let reference = DetailReference::parse("https://xprime.tv/watch/1399?type=tv").unwrap();

        assert_eq!(reference.kind, MediaKind::Tv);
        assert_eq!(reference.tmdb_id, 1399);
        assert_eq!(reference.origin.as_deref(), Some("https://xprime.tv"));
        assert_eq!(reference.origin_or("https://fallback.example"), "https://xprime.tv");
    }

    #[test]
    fn test_parse_url_with_kind_in_path() {
        let reference = DetailReference::parse("https://example.org:8443/tv/66732").unwrap();

        assert_eq!(reference.kind, MediaKind::Tv);
        assert_eq!(reference.tmdb_id, 66732);
        assert_eq!(reference.origin.as_deref(), Some("https://example.org:8443"));
    }

    #[test]
    fn test_parse_rejects_missing_id() {
        for raw in ["", "movie", "tv/", "https://xprime.tv/watch", "abc/def"] {
            assert!(
                matches!(
                    DetailReference::parse(raw),
                    Err(MediaSearchError::InvalidReference { .. })
                ),
                "expected {raw:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_display_is_canonical() {
        let from_url = DetailReference::parse("https://xprime.tv/watch/1399?type=tv").unwrap();
        let from_path = DetailReference::parse("tv:1399").unwrap();

        assert_eq!(from_url.to_string(), "tv/1399");
        assert_eq!(from_url.to_string(), from_path.to_string());
        assert_eq!(from_path.origin_or("https://xprime.tv"), "https://xprime.tv");
    }
}
