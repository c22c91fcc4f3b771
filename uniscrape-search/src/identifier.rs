//! Self-describing content identifiers.
//!
//! An identifier carries everything the stream provider needs (title,
//! year, provider ids, season and episode) so a stream lookup never needs
//! a prior detail lookup. The encoded form is compact JSON with a fixed key
//! order, which makes equal field sets encode to identical strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::types::MediaKind;

/// Identifier decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The string is not a valid encoded identifier.
    #[error("Malformed identifier: {reason}")]
    Malformed {
        /// Why decoding was rejected
        reason: String,
    },
}

/// Address of a movie or a single TV episode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContentIdentifier {
    /// Title of the movie or show
    pub name: String,
    /// Release or air year, empty when unknown
    pub year: String,
    /// Metadata provider id
    pub tmdb_id: u64,
    /// IMDb id when the provider exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    /// Movie or TV
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Season number, TV only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    /// Episode number, TV only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

impl ContentIdentifier {
    /// Identifier of a movie.
    pub fn movie(
        name: impl Into<String>,
        year: impl Into<String>,
        tmdb_id: u64,
        imdb_id: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            year: year.into(),
            tmdb_id,
            imdb_id,
            kind: MediaKind::Movie,
            season: None,
            episode: None,
        }
    }

    /// Identifier of one episode of a show.
    pub fn episode(
        name: impl Into<String>,
        year: impl Into<String>,
        tmdb_id: u64,
        imdb_id: Option<String>,
        season: u32,
        episode: u32,
    ) -> Self {
        Self {
            name: name.into(),
            year: year.into(),
            tmdb_id,
            imdb_id,
            kind: MediaKind::Tv,
            season: Some(season),
            episode: Some(episode),
        }
    }

    /// Canonical string form.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parses and validates an encoded identifier.
    ///
    /// # Errors
    ///
    /// - `IdentifierError::Malformed` - If the string is not an encoded identifier, an
    ///   episode identifier lacks its season/episode or has `episode < 1`, or a movie
    ///   identifier carries season/episode numbers
    pub fn decode(encoded: &str) -> Result<Self, IdentifierError> {
        let identifier: Self =
            serde_json::from_str(encoded.trim()).map_err(|e| IdentifierError::Malformed {
                reason: e.to_string(),
            })?;
        identifier.validate()?;
        Ok(identifier)
    }

    fn validate(&self) -> Result<(), IdentifierError> {
        match self.kind {
            MediaKind::Movie => {
                if self.season.is_some() || self.episode.is_some() {
                    return Err(IdentifierError::Malformed {
                        reason: "movie identifiers cannot carry season or episode".to_string(),
                    });
                }
            }
            MediaKind::Tv => match (self.season, self.episode) {
                (Some(_), Some(episode)) if episode >= 1 => {}
                (Some(_), Some(_)) => {
                    return Err(IdentifierError::Malformed {
                        reason: "episode numbers start at 1".to_string(),
                    });
                }
                _ => {
                    return Err(IdentifierError::Malformed {
                        reason: "episode identifiers need both season and episode".to_string(),
                    });
                }
            },
        }
        Ok(())
    }

    /// Whether this addresses a single TV episode.
    pub fn is_episode(&self) -> bool {
        self.kind == MediaKind::Tv
    }
}

/// Writes the canonical encoding: compact JSON in declaration order with
/// absent optional fields omitted.
impl fmt::Display for ContentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = |value: &str| Value::from(value);

        write!(
            f,
            r#"{{"name":{},"year":{},"tmdbId":{}"#,
            text(&self.name),
            text(&self.year),
            self.tmdb_id
        )?;
        if let Some(imdb_id) = &self.imdb_id {
            write!(f, r#","imdbId":{}"#, text(imdb_id))?;
        }
        write!(f, r#","type":{}"#, text(self.kind.as_str()))?;
        if let Some(season) = self.season {
            write!(f, r#","season":{season}"#)?;
        }
        if let Some(episode) = self.episode {
            write!(f, r#","episode":{episode}"#)?;
        }
        f.write_str("}")
    }
}

impl FromStr for ContentIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
