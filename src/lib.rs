//! Character list orchestration for a paginated, searchable catalog.
//!
//! The pieces, leaf to root:
//!
//! - [`catalog`] - remote catalog contract and its HTTP client
//! - [`favorites`] - favorites contract, in-memory and SQLite-backed stores
//! - [`scroll`] - scroll position → "load next page" decision
//! - [`search`] - keystroke debounce with distinct-until-changed commits
//! - [`coordinator`] - the state machine tying them together
//! - [`config`] - optional TOML configuration

pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod favorites;
pub mod scroll;
pub mod search;

pub use catalog::{CatalogClient, CatalogError, Character, FetchOutcome, HttpCatalogClient};
pub use config::{Config, ConfigError};
pub use coordinator::{ListCoordinator, ListEntry, ListSettings, ListState, ViewModel};
pub use favorites::{FavoritesDb, FavoritesStore, MemoryFavorites, PersistentFavorites};
pub use scroll::{ScrollMetrics, ScrollSignal};
pub use search::SearchDebouncer;
