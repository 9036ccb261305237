//! Tracks module: three-layer architecture (domain, repository, service).
//!
//! Reads go through [`TrackQueryService`], writes through
//! [`TrackMutationService`]; both share one [`repository::TrackRepository`].

pub mod domain;
pub mod repository;
pub mod repo;
pub mod query;
pub mod mutation;

pub use mutation::TrackMutationService;
pub use query::TrackQueryService;
