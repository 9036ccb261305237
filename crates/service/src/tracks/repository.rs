use async_trait::async_trait;

use super::domain::{Like, LikeFilter, NewTrack, Track, TrackContent, TrackFilter};
use crate::errors::ServiceError;
use crate::identity::UserRef;

/// Repository abstraction for track and like persistence.
///
/// Mirrors the store's capability set: lookup by id, filtered reads,
/// insert, update and delete. Deleting a track removes its likes.
#[async_trait]
pub trait TrackRepository: Send + Sync {
    async fn get_track(&self, id: i32) -> Result<Option<Track>, ServiceError>;
    async fn filter_tracks(&self, filter: &TrackFilter) -> Result<Vec<Track>, ServiceError>;
    async fn insert_track(&self, new: NewTrack) -> Result<Track, ServiceError>;
    /// Overwrites content and refreshes `updated_at`; `NotFound` if the row is gone.
    async fn update_track(&self, id: i32, content: TrackContent) -> Result<Track, ServiceError>;
    async fn delete_track(&self, id: i32) -> Result<bool, ServiceError>;

    async fn filter_likes(&self, filter: &LikeFilter) -> Result<Vec<Like>, ServiceError>;
    async fn insert_like(&self, user: &UserRef, track_id: i32) -> Result<Like, ServiceError>;
    /// Returns the number of rows removed. An unbounded filter is rejected.
    async fn delete_likes(&self, filter: &LikeFilter) -> Result<u64, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::Utc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct State {
        tracks: BTreeMap<i32, Track>, // key: track id
        likes: BTreeMap<i32, Like>,   // key: like id
        last_track_id: i32,
        last_like_id: i32,
    }

    /// No uniqueness on (user, track): like the store without its unique
    /// index, two interleaved toggles can both insert.
    #[derive(Default)]
    pub struct MockTrackRepository {
        state: Mutex<State>,
    }

    impl MockTrackRepository {
        pub fn new() -> Self { Self::default() }

        pub async fn track_count(&self) -> usize { self.state.lock().await.tracks.len() }

        pub async fn like_count(&self) -> usize { self.state.lock().await.likes.len() }
    }

    #[async_trait]
    impl TrackRepository for MockTrackRepository {
        async fn get_track(&self, id: i32) -> Result<Option<Track>, ServiceError> {
            let state = self.state.lock().await;
            Ok(state.tracks.get(&id).cloned())
        }

        async fn filter_tracks(&self, filter: &TrackFilter) -> Result<Vec<Track>, ServiceError> {
            let state = self.state.lock().await;
            Ok(state.tracks.values().filter(|t| filter.matches(t)).cloned().collect())
        }

        async fn insert_track(&self, new: NewTrack) -> Result<Track, ServiceError> {
            let mut state = self.state.lock().await;
            state.last_track_id += 1;
            let now = Utc::now();
            let track = Track {
                id: state.last_track_id,
                title: new.content.title,
                description: new.content.description,
                url: new.content.url,
                created_at: now,
                updated_at: now,
                posted_by: new.posted_by,
            };
            state.tracks.insert(track.id, track.clone());
            Ok(track)
        }

        async fn update_track(&self, id: i32, content: TrackContent) -> Result<Track, ServiceError> {
            let mut state = self.state.lock().await;
            let track = state.tracks.get_mut(&id).ok_or_else(|| ServiceError::not_found("track"))?;
            track.title = content.title;
            track.description = content.description;
            track.url = content.url;
            track.updated_at = Utc::now();
            Ok(track.clone())
        }

        async fn delete_track(&self, id: i32) -> Result<bool, ServiceError> {
            let mut state = self.state.lock().await;
            let removed = state.tracks.remove(&id).is_some();
            if removed {
                state.likes.retain(|_, l| l.track_id != id);
            }
            Ok(removed)
        }

        async fn filter_likes(&self, filter: &LikeFilter) -> Result<Vec<Like>, ServiceError> {
            let state = self.state.lock().await;
            Ok(state.likes.values().filter(|l| filter.matches(l)).cloned().collect())
        }

        async fn insert_like(&self, user: &UserRef, track_id: i32) -> Result<Like, ServiceError> {
            let mut state = self.state.lock().await;
            if !state.tracks.contains_key(&track_id) {
                return Err(ServiceError::Db(format!("like references missing track {}", track_id)));
            }
            state.last_like_id += 1;
            let like = Like { id: state.last_like_id, user: Some(user.clone()), track_id };
            state.likes.insert(like.id, like.clone());
            Ok(like)
        }

        async fn delete_likes(&self, filter: &LikeFilter) -> Result<u64, ServiceError> {
            if filter.is_unbounded() {
                return Err(ServiceError::Validation("refusing to delete every like".into()));
            }
            let mut state = self.state.lock().await;
            let before = state.likes.len();
            state.likes.retain(|_, l| !filter.matches(l));
            Ok((before - state.likes.len()) as u64)
        }
    }
}
