//! Response shapes of the TMDB-style metadata API.
//!
//! Only the fields the normalizer reads are modelled; everything is
//! optional except ids so partial payloads still parse.

use serde::Deserialize;

/// Page returned by `search/movie` and `search/tv`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    /// Matches in provider relevance order
    #[serde(default)]
    pub results: Vec<SearchItem>,
}

/// One search match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItem {
    /// Provider id
    pub id: u64,
    /// Movie title
    pub title: Option<String>,
    /// Show name
    pub name: Option<String>,
    /// Relative poster path
    pub poster_path: Option<String>,
    /// Relative backdrop path
    pub backdrop_path: Option<String>,
}

impl SearchItem {
    /// Primary title with alternate fallback.
    pub fn display_title(&self) -> String {
        non_empty(&self.title)
            .or_else(|| non_empty(&self.name))
            .unwrap_or_default()
            .to_string()
    }

    /// Poster path with backdrop fallback.
    pub fn artwork_path(&self) -> Option<&str> {
        non_empty(&self.poster_path).or_else(|| non_empty(&self.backdrop_path))
    }
}

/// Movie or show detail payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailPayload {
    /// Provider id
    pub id: u64,
    /// Movie title
    pub title: Option<String>,
    /// Show name
    pub name: Option<String>,
    /// Relative poster path
    pub poster_path: Option<String>,
    /// Movie release date, `YYYY-MM-DD`
    pub release_date: Option<String>,
    /// Movie IMDb id
    pub imdb_id: Option<String>,
    /// Appended external ids (carries the IMDb id for shows)
    pub external_ids: Option<ExternalIds>,
    /// Show seasons, empty for movies
    #[serde(default)]
    pub seasons: Vec<SeasonPayload>,
}

impl DetailPayload {
    /// Title with name fallback.
    pub fn display_title(&self) -> String {
        non_empty(&self.title)
            .or_else(|| non_empty(&self.name))
            .unwrap_or_default()
            .to_string()
    }

    /// IMDb id from the payload root or its external ids.
    pub fn imdb_id(&self) -> Option<String> {
        non_empty(&self.imdb_id)
            .or_else(|| {
                self.external_ids
                    .as_ref()
                    .and_then(|ids| non_empty(&ids.imdb_id))
            })
            .map(str::to_string)
    }
}

/// `external_ids` sub-object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalIds {
    /// IMDb id
    pub imdb_id: Option<String>,
}

/// Season summary inside a show payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonPayload {
    /// Season number, 0 for specials
    pub season_number: u32,
    /// Number of episodes the provider declares
    #[serde(default)]
    pub episode_count: u32,
    /// Season name
    pub name: Option<String>,
    /// First air date, `YYYY-MM-DD`
    pub air_date: Option<String>,
    /// Relative poster path
    pub poster_path: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_item_fallbacks() {
        let item: SearchItem = serde_json::from_value(serde_json::json!({
            "id": 1399,
            "name": "Game of Thrones",
            "poster_path": null,
            "backdrop_path": "/backdrop.jpg"
        }))
        .unwrap();

        assert_eq!(item.display_title(), "Game of Thrones");
        assert_eq!(item.artwork_path(), Some("/backdrop.jpg"));
    }

    #[test]
    fn test_detail_payload_tolerates_missing_fields() {
        let payload: DetailPayload = serde_json::from_value(serde_json::json!({
            "id": 949,
            "title": "Heat",
            "external_ids": {"imdb_id": "tt0113277"}
        }))
        .unwrap();

        assert_eq!(payload.display_title(), "Heat");
        assert_eq!(payload.imdb_id().as_deref(), Some("tt0113277"));
        assert!(payload.seasons.is_empty());
        assert!(payload.release_date.is_none());
    }

    #[test]
    fn test_empty_imdb_id_is_ignored() {
        let payload = DetailPayload {
            id: 1,
            imdb_id: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(payload.imdb_id(), None);
    }
}
