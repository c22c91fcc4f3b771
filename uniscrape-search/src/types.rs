//! Data types for the media catalogue.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MediaSearchError;

/// Provider a request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// TMDB metadata with Xprime stream resolution
    #[default]
    Xprime,
}

impl Source {
    /// Wire name of the source.
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Xprime => "xprime",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = MediaSearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xprime" => Ok(Source::Xprime),
            _ => Err(MediaSearchError::UnsupportedSource {
                name: s.to_string(),
            }),
        }
    }
}

/// Media type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Feature film
    Movie,
    /// Episodic series
    Tv,
}

impl MediaKind {
    /// Path segment used by the metadata provider.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }

    /// Parses the kind names providers and links use.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "movie" | "movies" | "film" => Some(MediaKind::Movie),
            "tv" | "show" | "series" => Some(MediaKind::Tv),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single entry of a search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Detail reference to pass to the details endpoint
    pub id: String,
    /// Display title
    pub title: String,
    /// Poster URL, empty when the provider has none
    pub poster: String,
}

/// Movie or show with its season/episode tree.
///
/// Movies carry one synthetic season with one episode so clients can walk
/// both kinds the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDetail {
    /// Canonical detail reference
    pub id: String,
    /// Display title
    pub title: String,
    /// Poster URL, empty when the provider has none
    pub poster: String,
    /// Movie or TV
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Seasons in provider order
    pub seasons: Vec<Season>,
}

/// Season of a show, or the synthetic season of a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    /// Season title
    pub title: String,
    /// Poster URL, empty when the provider has none
    pub poster: String,
    /// Episodes in ascending order
    pub episodes: Vec<Episode>,
}

/// Playable unit addressed by an encoded content identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// Episode title
    pub title: String,
    /// Encoded `ContentIdentifier`, passed verbatim to the streams endpoint
    pub id: String,
}

/// Playable source returned by the stream provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Media URL
    pub url: String,
    /// Quality label such as `1080P`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// Subtitle tracks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<Vec<Subtitle>>,
}

/// Subtitle track attached to a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtitle {
    /// Subtitle file URL
    pub url: String,
    /// Language or track label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}
