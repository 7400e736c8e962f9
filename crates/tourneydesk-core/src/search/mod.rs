//! Universal search across championships, teams, participants and matches.
//!
//! [`SearchIndex`] does the matching: case-insensitive substring search on
//! name and subtitle, merged across the allowed result types and capped.
//! [`SearchBox`] is the dropdown state machine and [`UniversalSearch`] drives
//! it on the runtime with a [`Debouncer`] in front.

pub mod controller;
pub mod debounce;
pub mod engine;
pub mod state;

pub use controller::{RemoteSearchSource, SearchSource, UniversalSearch};
pub use debounce::Debouncer;
pub use engine::{SearchIndex, SearchOptions, SearchResult, SearchResultType};
pub use state::{SearchBox, SearchKey, SearchRequest, SearchState};
