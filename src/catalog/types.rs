use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors returned by a [`CatalogClient`](super::CatalogClient).
///
/// `NotFound` and `NoMatches` are not transport failures: the first marks the
/// end of pagination, the second is the API's way of saying a search matched
/// nothing.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with a non-2xx status other than 404
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    /// Requested page does not exist (past the last page)
    #[error("Page {0} not found")]
    NotFound(u32),
    /// Search term matched no characters
    #[error("No characters match '{0}'")]
    NoMatches(String),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Malformed catalog response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
}

impl CatalogError {
    /// Returns true if this error is transient and the request may be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            CatalogError::Timeout(_) | CatalogError::Network(_) => true,
            CatalogError::HttpStatus(status) => *status >= 500 || *status == 429,
            CatalogError::NotFound(_)
            | CatalogError::NoMatches(_)
            | CatalogError::ResponseTooLarge(_)
            | CatalogError::Decode(_)
            | CatalogError::InvalidBaseUrl(_)
            | CatalogError::InsecureBaseUrl => false,
        }
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// Stable identity of a character in the remote catalog.
pub type CharacterId = u64;

/// Named reference to another catalog resource (origin, last known location).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Place {
    pub name: String,
    pub url: String,
}

/// A character record as returned by the catalog.
///
/// Only `id` carries meaning for the list core; everything else is display
/// data and is treated as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub species: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub origin: Place,
    #[serde(default)]
    pub location: Place,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub episode: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub created: String,
}

impl Character {
    /// Minimal record with only identity and name filled in.
    pub fn new(id: CharacterId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: String::new(),
            species: String::new(),
            kind: String::new(),
            gender: String::new(),
            origin: Place::default(),
            location: Place::default(),
            image: String::new(),
            episode: Vec::new(),
            url: String::new(),
            created: String::new(),
        }
    }
}

/// Pagination metadata attached to every list response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageInfo {
    pub count: u64,
    pub pages: u32,
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// Raw envelope of `/character` responses (both paged and filtered).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPage {
    #[serde(default)]
    pub info: PageInfo,
    #[serde(default)]
    pub results: Vec<Character>,
}

/// A response routed back to the coordinator, tagged with what produced it.
///
/// Browse and search responses are kept apart at the type level so a page can
/// never be merged into search results by accident.
#[derive(Debug)]
pub enum FetchOutcome {
    Browse {
        page: u32,
        generation: u64,
        result: Result<Vec<Character>, CatalogError>,
    },
    Search {
        term: String,
        generation: u64,
        result: Result<Vec<Character>, CatalogError>,
    },
}

impl FetchOutcome {
    pub fn generation(&self) -> u64 {
        match self {
            FetchOutcome::Browse { generation, .. } | FetchOutcome::Search { generation, .. } => {
                *generation
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "info": {"count": 826, "pages": 42, "next": "https://rickandmortyapi.com/api/character?page=2", "prev": null},
        "results": [
            {
                "id": 1,
                "name": "Rick Sanchez",
                "status": "Alive",
                "species": "Human",
                "type": "",
                "gender": "Male",
                "origin": {"name": "Earth (C-137)", "url": "https://rickandmortyapi.com/api/location/1"},
                "location": {"name": "Citadel of Ricks", "url": "https://rickandmortyapi.com/api/location/3"},
                "image": "https://rickandmortyapi.com/api/character/avatar/1.jpeg",
                "episode": ["https://rickandmortyapi.com/api/episode/1"],
                "url": "https://rickandmortyapi.com/api/character/1",
                "created": "2017-11-04T18:48:46.250Z"
            }
        ]
    }"#;

    #[test]
    fn test_decode_api_page() {
        let page: ApiPage = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(page.info.pages, 42);
        assert!(page.info.prev.is_none());
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].id, 1);
        assert_eq!(page.results[0].origin.name, "Earth (C-137)");
        assert_eq!(page.results[0].episode.len(), 1);
    }

    #[test]
    fn test_decode_tolerates_missing_display_fields() {
        let page: ApiPage =
            serde_json::from_str(r#"{"results": [{"id": 7, "name": "Abradolf Lincler"}]}"#)
                .unwrap();
        assert_eq!(page.results[0], Character::new(7, "Abradolf Lincler"));
        assert_eq!(page.info.count, 0);
    }

    #[test]
    fn test_decode_rejects_missing_id() {
        let result: Result<ApiPage, _> =
            serde_json::from_str(r#"{"results": [{"name": "Nobody"}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(CatalogError::Timeout(20).is_retryable());
        assert!(CatalogError::HttpStatus(503).is_retryable());
        assert!(CatalogError::HttpStatus(429).is_retryable());
        assert!(!CatalogError::HttpStatus(400).is_retryable());
        assert!(!CatalogError::NotFound(43).is_retryable());
        assert!(!CatalogError::NoMatches("zzz".into()).is_retryable());
    }

    #[test]
    fn test_outcome_generation() {
        let outcome = FetchOutcome::Search {
            term: "rick".into(),
            generation: 9,
            result: Ok(Vec::new()),
        };
        assert_eq!(outcome.generation(), 9);
    }
}
