//! Mapping of provider payloads into the catalogue model.
//!
//! Search responses are interleaved show/movie, detail payloads become a
//! season/episode tree whose leaves carry encoded `ContentIdentifier`s.

use regex::Regex;

use crate::errors::MediaSearchError;
use crate::identifier::ContentIdentifier;
use crate::reference::DetailReference;
use crate::tmdb::{DetailPayload, SearchItem, SeasonPayload};
use crate::types::{Episode, MediaDetail, MediaKind, SearchResult, Season};

/// Words the search provider chokes on.
pub const DEFAULT_NOISE_TERMS: &[&str] = &["season"];

/// Strips noise words from user queries before lookup.
#[derive(Debug, Clone)]
pub struct QueryCleaner {
    noise: Option<Regex>,
}

impl QueryCleaner {
    /// Builds a cleaner removing `terms` as whole words, case-insensitively.
    ///
    /// # Errors
    ///
    /// - `MediaSearchError::ProviderError` - If the combined pattern cannot be compiled
    pub fn new(terms: &[&str]) -> Result<Self, MediaSearchError> {
        if terms.is_empty() {
            return Ok(Self { noise: None });
        }

        let alternation = terms
            .iter()
            .map(|term| regex::escape(term))
            .collect::<Vec<_>>()
            .join("|");
        let noise = Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).map_err(|e| {
            MediaSearchError::ProviderError {
                reason: format!("Invalid noise pattern: {e}"),
            }
        })?;

        Ok(Self { noise: Some(noise) })
    }

    /// Removes noise words and collapses whitespace.
    pub fn clean(&self, query: &str) -> String {
        let stripped = match &self.noise {
            Some(noise) => noise.replace_all(query, " "),
            None => query.into(),
        };
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Merges two result lists as `tv[0], movie[0], tv[1], movie[1], ...`.
///
/// Once the shorter list runs out the longer one continues in order.
pub fn interleave<T>(tv: Vec<T>, movies: Vec<T>) -> Vec<T> {
    let mut merged = Vec::with_capacity(tv.len() + movies.len());
    let mut tv = tv.into_iter();
    let mut movies = movies.into_iter();

    loop {
        match (tv.next(), movies.next()) {
            (None, None) => break,
            (show, movie) => {
                merged.extend(show);
                merged.extend(movie);
            }
        }
    }

    merged
}

/// Leading year of a `YYYY-MM-DD` date, or an empty string.
pub fn leading_year(date: Option<&str>) -> String {
    date.and_then(|date| date.split('-').next())
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

/// Converts provider payloads using a fixed image CDN prefix.
#[derive(Debug, Clone)]
pub struct Normalizer {
    image_base_url: String,
}

impl Normalizer {
    /// Creates a normalizer prefixing relative image paths with `image_base_url`.
    pub fn new(image_base_url: impl Into<String>) -> Self {
        Self {
            image_base_url: image_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Absolute image URL for a relative provider path, or empty.
    pub fn image_url(&self, path: Option<&str>) -> String {
        match path.map(str::trim).filter(|p| !p.is_empty()) {
            Some(path) if path.starts_with("http://") || path.starts_with("https://") => {
                path.to_string()
            }
            Some(path) if path.starts_with('/') => format!("{}{}", self.image_base_url, path),
            Some(path) => format!("{}/{}", self.image_base_url, path),
            None => String::new(),
        }
    }

    /// Converts one search match.
    pub fn search_result(&self, item: &SearchItem, kind: MediaKind) -> SearchResult {
        SearchResult {
            id: DetailReference::new(kind, item.id).to_string(),
            title: item.display_title(),
            poster: self.image_url(item.artwork_path()),
        }
    }

    /// Converts both search pages and interleaves them, shows first.
    pub fn search_results(&self, tv: &[SearchItem], movies: &[SearchItem]) -> Vec<SearchResult> {
        let tv = tv
            .iter()
            .map(|item| self.search_result(item, MediaKind::Tv))
            .collect();
        let movies = movies
            .iter()
            .map(|item| self.search_result(item, MediaKind::Movie))
            .collect();
        interleave(tv, movies)
    }

    /// Builds the season/episode tree for a detail payload.
    pub fn media_detail(&self, reference: &DetailReference, payload: &DetailPayload) -> MediaDetail {
        let title = payload.display_title();
        let poster = self.image_url(payload.poster_path.as_deref());

        let seasons = match reference.kind {
            MediaKind::Movie => vec![self.movie_season(&title, &poster, payload)],
            MediaKind::Tv => payload
                .seasons
                .iter()
                .filter(|season| season.season_number != 0)
                .map(|season| self.tv_season(&title, &poster, payload, season))
                .collect(),
        };

        MediaDetail {
            id: reference.to_string(),
            title,
            poster,
            kind: reference.kind,
            seasons,
        }
    }

    fn movie_season(&self, title: &str, poster: &str, payload: &DetailPayload) -> Season {
        let identifier = ContentIdentifier::movie(
            title,
            leading_year(payload.release_date.as_deref()),
            payload.id,
            payload.imdb_id(),
        );

        Season {
            title: "Movie".to_string(),
            poster: poster.to_string(),
            episodes: vec![Episode {
                title: title.to_string(),
                id: identifier.encode(),
            }],
        }
    }

    fn tv_season(
        &self,
        title: &str,
        show_poster: &str,
        payload: &DetailPayload,
        season: &SeasonPayload,
    ) -> Season {
        let year = leading_year(season.air_date.as_deref());
        let imdb_id = payload.imdb_id();

        let episodes = (1..=season.episode_count)
            .map(|episode| Episode {
                title: format!("Episode {episode}"),
                id: ContentIdentifier::episode(
                    title,
                    year.clone(),
                    payload.id,
                    imdb_id.clone(),
                    season.season_number,
                    episode,
                )
                .encode(),
            })
            .collect();

        let season_title = season
            .name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .map_or_else(|| format!("Season {}", season.season_number), str::to_string);
        let poster = match self.image_url(season.poster_path.as_deref()) {
            poster if poster.is_empty() => show_poster.to_string(),
            poster => poster,
        };

        Season {
            title: season_title,
            poster,
            episodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/original";

    fn normalizer() -> Normalizer {
        Normalizer::new(IMAGE_BASE)
    }

    fn show_payload() -> DetailPayload {
        serde_json::from_value(json!({
            "id": 1399,
            "name": "Game of Thrones",
            "poster_path": "/got.jpg",
            "external_ids": {"imdb_id": "tt0944947"},
            "seasons": [
                {"season_number": 0, "episode_count": 14, "name": "Specials", "air_date": "2010-12-05"},
                {"season_number": 1, "episode_count": 2, "name": "Season 1", "air_date": "2011-04-17", "poster_path": "/s1.jpg"},
                {"season_number": 2, "episode_count": 3, "name": "", "air_date": "2012-04-01"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_clean_strips_noise_as_whole_words() {
        let cleaner = QueryCleaner::new(DEFAULT_NOISE_TERMS).unwrap();

        assert_eq!(cleaner.clean("Breaking Bad Season 2"), "Breaking Bad 2");
        assert_eq!(cleaner.clean("SEASON dark"), "dark");
        assert_eq!(cleaner.clean("Seasonal Affairs"), "Seasonal Affairs");
        assert_eq!(cleaner.clean("  the   office  "), "the office");
    }

    #[test]
    fn test_clean_without_terms_only_collapses_whitespace() {
        let cleaner = QueryCleaner::new(&[]).unwrap();
        assert_eq!(cleaner.clean(" season  one "), "season one");
    }

    #[test]
    fn test_interleave_alternates_tv_first() {
        assert_eq!(interleave(vec!["t0", "t1"], vec!["m0"]), vec!["t0", "m0", "t1"]);
        assert_eq!(
            interleave(vec!["t0"], vec!["m0", "m1", "m2"]),
            vec!["t0", "m0", "m1", "m2"]
        );
        assert_eq!(interleave(Vec::<&str>::new(), vec!["m0"]), vec!["m0"]);
        assert!(interleave(Vec::<&str>::new(), Vec::new()).is_empty());
    }

    #[test]
    fn test_leading_year() {
        assert_eq!(leading_year(Some("2010-07-15")), "2010");
        assert_eq!(leading_year(Some("")), "");
        assert_eq!(leading_year(None), "");
    }

    #[test]
    fn test_image_url() {
        let normalizer = Normalizer::new(format!("{IMAGE_BASE}/"));

        assert_eq!(normalizer.image_url(Some("/a.jpg")), format!("{IMAGE_BASE}/a.jpg"));
        assert_eq!(normalizer.image_url(Some("a.jpg")), format!("{IMAGE_BASE}/a.jpg"));
        assert_eq!(normalizer.image_url(Some("")), "");
        assert_eq!(normalizer.image_url(None), "");
    }

    #[test]
    fn test_search_results_interleave_and_fallbacks() {
        let tv: Vec<SearchItem> = serde_json::from_value(json!([
            {"id": 1, "name": "Show A", "poster_path": "/a.jpg"},
            {"id": 2, "name": "Show B", "backdrop_path": "/b-backdrop.jpg"}
        ]))
        .unwrap();
        let movies: Vec<SearchItem> =
            serde_json::from_value(json!([{"id": 10, "title": "Film", "poster_path": null}])).unwrap();

        let results = normalizer().search_results(&tv, &movies);

        assert_eq!(
            results,
            vec![
                SearchResult {
                    id: "tv/1".to_string(),
                    title: "Show A".to_string(),
                    poster: format!("{IMAGE_BASE}/a.jpg"),
                },
                SearchResult {
                    id: "movie/10".to_string(),
                    title: "Film".to_string(),
                    poster: String::new(),
                },
                SearchResult {
                    id: "tv/2".to_string(),
                    title: "Show B".to_string(),
                    poster: format!("{IMAGE_BASE}/b-backdrop.jpg"),
                },
            ]
        );
    }

    #[test]
    fn test_movie_detail_shape() {
        let payload: DetailPayload = serde_json::from_value(json!({
            "id": 27205,
            "title": "Inception",
            "poster_path": "/inception.jpg",
            "release_date": "2010-07-15",
            "imdb_id": "tt1375666"
        }))
        .unwrap();
        let reference = DetailReference::new(MediaKind::Movie, 27205);

        let detail = normalizer().media_detail(&reference, &payload);

        let poster = format!("{IMAGE_BASE}/inception.jpg");
        assert_eq!(
            detail,
            MediaDetail {
                id: "movie/27205".to_string(),
                title: "Inception".to_string(),
                poster: poster.clone(),
                kind: MediaKind::Movie,
                seasons: vec![Season {
                    title: "Movie".to_string(),
                    poster,
                    episodes: vec![Episode {
                        title: "Inception".to_string(),
                        id: r#"{"name":"Inception","year":"2010","tmdbId":27205,"imdbId":"tt1375666","type":"movie"}"#
                            .to_string(),
                    }],
                }],
            }
        );
    }

    #[test]
    fn test_movie_without_release_date_has_empty_year() {
        let payload = DetailPayload {
            id: 5,
            title: Some("Untitled".to_string()),
            release_date: Some(String::new()),
            ..Default::default()
        };
        let detail = normalizer().media_detail(&DetailReference::new(MediaKind::Movie, 5), &payload);

        let id = ContentIdentifier::decode(&detail.seasons[0].episodes[0].id).unwrap();
        assert_eq!(id.year, "");
        assert_eq!(id.imdb_id, None);
        assert_eq!(detail.poster, "");
    }

    #[test]
    fn test_tv_detail_skips_specials() {
        let detail = normalizer().media_detail(&DetailReference::new(MediaKind::Tv, 1399), &show_payload());

        assert_eq!(detail.kind, MediaKind::Tv);
        assert_eq!(detail.seasons.len(), 2);
        assert!(detail.seasons.iter().all(|season| season.title != "Specials"));
        assert_eq!(detail.seasons[0].title, "Season 1");
        assert_eq!(detail.seasons[0].poster, format!("{IMAGE_BASE}/s1.jpg"));
    }

    #[test]
    fn test_tv_detail_synthesizes_episodes() {
        let detail = normalizer().media_detail(&DetailReference::new(MediaKind::Tv, 1399), &show_payload());
        let season_two = &detail.seasons[1];

        assert_eq!(season_two.title, "Season 2");
        assert_eq!(season_two.poster, format!("{IMAGE_BASE}/got.jpg"));
        let titles: Vec<&str> = season_two.episodes.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Episode 1", "Episode 2", "Episode 3"]);

        for (index, episode) in season_two.episodes.iter().enumerate() {
            let id = ContentIdentifier::decode(&episode.id).unwrap();
            assert_eq!(id.season, Some(2));
            assert_eq!(id.episode, Some(index as u32 + 1));
            assert_eq!(id.year, "2012");
            assert_eq!(id.name, "Game of Thrones");
            assert_eq!(id.imdb_id.as_deref(), Some("tt0944947"));
        }
    }

    #[test]
    fn test_tv_season_without_air_date() {
        let payload: DetailPayload = serde_json::from_value(json!({
            "id": 7,
            "name": "New Show",
            "seasons": [{"season_number": 1, "episode_count": 1, "air_date": null}]
        }))
        .unwrap();
        let detail = normalizer().media_detail(&DetailReference::new(MediaKind::Tv, 7), &payload);

        let id = ContentIdentifier::decode(&detail.seasons[0].episodes[0].id).unwrap();
        assert_eq!(id.year, "");
    }
}
