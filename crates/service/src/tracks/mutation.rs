use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::domain::{LikeFilter, LikeState, LikeToggle, NewTrack, Track, TrackInput};
use super::repository::TrackRepository;
use crate::errors::ServiceError;
use crate::identity::Caller;

pub const MSG_LOGIN_TO_ADD_TRACK: &str = "Log in to add a track";
pub const MSG_NO_PERMISSION_UPDATE: &str = "No permission to update";
pub const MSG_NO_PERMISSION_DELETE: &str = "No permission to delete this Track";
pub const MSG_LOGIN_FIRST: &str = "You must log in first";
pub const MSG_NO_SUCH_TRACK: &str = "No track exists with the given id";

/// Write side: track create/update/delete and like toggling.
/// Identity checks live here; the repository is not aware of callers.
pub struct TrackMutationService<R: TrackRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: TrackRepository + ?Sized> TrackMutationService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    async fn require_track(&self, id: i32) -> Result<Track, ServiceError> {
        self.repo.get_track(id).await?.ok_or_else(|| ServiceError::not_found("track"))
    }

    /// Create a track owned by the caller.
    ///
    /// # Examples
    /// ```
    /// use service::identity::{Caller, UserRef};
    /// use service::tracks::{TrackMutationService, domain::TrackInput, repository::mock::MockTrackRepository};
    /// use std::sync::Arc;
    /// let svc = TrackMutationService::new(Arc::new(MockTrackRepository::new()));
    /// let caller = Caller::User(UserRef { id: uuid::Uuid::new_v4(), username: "alice".into() });
    /// let input = TrackInput { title: Some("Song A".into()), description: None, url: Some("http://x.test/a".into()) };
    /// let track = tokio_test::block_on(svc.create_track(&caller, input)).unwrap();
    /// assert_eq!(track.posted_by.unwrap().username, "alice");
    /// ```
    #[instrument(skip(self, caller, input))]
    pub async fn create_track(&self, caller: &Caller, input: TrackInput) -> Result<Track, ServiceError> {
        let user = caller
            .user()
            .ok_or_else(|| ServiceError::Unauthenticated(MSG_LOGIN_TO_ADD_TRACK.into()))?;
        let content = input.into_content()?;
        let track = self
            .repo
            .insert_track(NewTrack { content, posted_by: Some(user.clone()) })
            .await?;
        info!(track_id = track.id, user_id = %user.id, "track_created");
        Ok(track)
    }

    /// Overwrite title, description and url. The lookup runs before the
    /// ownership check, so a missing id is `NotFound` for every caller.
    #[instrument(skip(self, caller, input))]
    pub async fn update_track(&self, caller: &Caller, track_id: i32, input: TrackInput) -> Result<Track, ServiceError> {
        let track = self.require_track(track_id).await?;
        if !caller.owns(&track) {
            warn!(track_id, "track_update_forbidden");
            return Err(ServiceError::Forbidden(MSG_NO_PERMISSION_UPDATE.into()));
        }
        let content = input.into_content()?;
        let updated = self.repo.update_track(track_id, content).await?;
        info!(track_id, "track_updated");
        Ok(updated)
    }

    /// Delete the track (and its likes); echoes the id back.
    #[instrument(skip(self, caller))]
    pub async fn delete_track(&self, caller: &Caller, track_id: i32) -> Result<i32, ServiceError> {
        let track = self.require_track(track_id).await?;
        if !caller.owns(&track) {
            warn!(track_id, "track_delete_forbidden");
            return Err(ServiceError::Forbidden(MSG_NO_PERMISSION_DELETE.into()));
        }
        if !self.repo.delete_track(track_id).await? {
            // removed by someone else between lookup and delete
            return Err(ServiceError::not_found("track"));
        }
        info!(track_id, "track_deleted");
        Ok(track_id)
    }

    /// Flip the caller's like on a track.
    ///
    /// Read-then-write without a transaction: two concurrent toggles for the
    /// same pair can both see "absent". The SeaORM schema's unique index turns
    /// the losing insert into a `Db` error.
    #[instrument(skip(self, caller))]
    pub async fn toggle_like(&self, caller: &Caller, track_id: i32) -> Result<LikeToggle, ServiceError> {
        let user = caller
            .user()
            .ok_or_else(|| ServiceError::Unauthenticated(MSG_LOGIN_FIRST.into()))?;
        let track = self
            .repo
            .get_track(track_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(MSG_NO_SUCH_TRACK.into()))?;

        let pair = LikeFilter::pair(user.id, track.id);
        let existing = self.repo.filter_likes(&pair).await?;
        let state = if existing.is_empty() {
            self.repo.insert_like(user, track.id).await?;
            LikeState::Liked
        } else {
            let removed = self.repo.delete_likes(&pair).await?;
            debug!(removed, "likes_removed");
            LikeState::NotLiked
        };
        info!(track_id, user_id = %user.id, ?state, "like_toggled");
        Ok(LikeToggle { user: user.clone(), track, state })
    }
}
