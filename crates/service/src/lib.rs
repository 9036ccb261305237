//! Service layer providing the track/like business operations on top of models.
//! - Separates business logic (identity and ownership checks) from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Storage sits behind `tracks::repository::TrackRepository`, so the services
//!   run against SeaORM in production and an in-memory mock in tests.

pub mod errors;
pub mod identity;
pub mod tracks;
#[cfg(test)]
pub mod test_support;
