use std::sync::Arc;

use tracing::{debug, instrument};

use super::domain::{Like, LikeFilter, Track, TrackFilter};
use super::repository::TrackRepository;
use crate::errors::ServiceError;

/// Read side: track listing with search, single lookup, likes.
pub struct TrackQueryService<R: TrackRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: TrackRepository + ?Sized> TrackQueryService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// All tracks, or those whose title, description, url or owner username
    /// contains `search` (case-insensitive). An empty search lists everything.
    ///
    /// # Examples
    /// ```
    /// use service::tracks::{TrackQueryService, repository::mock::MockTrackRepository};
    /// use std::sync::Arc;
    /// let svc = TrackQueryService::new(Arc::new(MockTrackRepository::new()));
    /// let tracks = tokio_test::block_on(svc.list_tracks(Some("jazz"))).unwrap();
    /// assert!(tracks.is_empty());
    /// ```
    #[instrument(skip(self))]
    pub async fn list_tracks(&self, search: Option<&str>) -> Result<Vec<Track>, ServiceError> {
        let filter = TrackFilter::from_search(search);
        let tracks = self.repo.filter_tracks(&filter).await?;
        debug!(count = tracks.len(), "tracks_listed");
        Ok(tracks)
    }

    #[instrument(skip(self))]
    pub async fn get_track(&self, id: i32) -> Result<Track, ServiceError> {
        self.repo.get_track(id).await?.ok_or_else(|| ServiceError::not_found("track"))
    }

    pub async fn list_likes(&self) -> Result<Vec<Like>, ServiceError> {
        self.repo.filter_likes(&LikeFilter::default()).await
    }

    pub async fn likes_for_track(&self, track_id: i32) -> Result<Vec<Like>, ServiceError> {
        self.repo.filter_likes(&LikeFilter::track(track_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::UserRef;
    use crate::tracks::domain::{NewTrack, TrackContent};
    use crate::tracks::repository::mock::MockTrackRepository;
    use uuid::Uuid;

    async fn seeded() -> (Arc<MockTrackRepository>, Vec<Track>) {
        let repo = Arc::new(MockTrackRepository::new());
        let alice = UserRef { id: Uuid::new_v4(), username: "alice".into() };
        let bob = UserRef { id: Uuid::new_v4(), username: "BobTheBuilder".into() };
        let rows = [
            ("Blue in Green", "modal jazz", "http://x.test/blue", Some(alice.clone())),
            ("Paranoid", "heavy", "http://rock.test/p", Some(bob.clone())),
            ("Untitled", "", "http://x.test/builder-mix", None),
            ("Field recording", "rain", "http://x.test/rain", Some(alice)),
        ];
        let mut out = Vec::new();
        for (title, description, url, owner) in rows {
            let t = repo
                .insert_track(NewTrack {
                    content: TrackContent { title: title.into(), description: description.into(), url: url.into() },
                    posted_by: owner,
                })
                .await
                .unwrap();
            out.push(t);
        }
        (repo, out)
    }

    #[tokio::test]
    async fn list_without_search_returns_all() {
        let (repo, tracks) = seeded().await;
        let svc = TrackQueryService::new(repo);
        assert_eq!(svc.list_tracks(None).await.unwrap().len(), tracks.len());
        assert_eq!(svc.list_tracks(Some("")).await.unwrap().len(), tracks.len());
    }

    #[tokio::test]
    async fn search_matches_any_field() {
        let (repo, tracks) = seeded().await;
        let svc = TrackQueryService::new(repo);

        let by_description = svc.list_tracks(Some("JAZZ")).await.unwrap();
        assert_eq!(by_description.iter().map(|t| t.id).collect::<Vec<_>>(), vec![tracks[0].id]);

        let by_url = svc.list_tracks(Some("rock.test")).await.unwrap();
        assert_eq!(by_url.iter().map(|t| t.id).collect::<Vec<_>>(), vec![tracks[1].id]);

        // "builder" hits bob's username and the url of the ownerless track
        let mut ids: Vec<i32> = svc.list_tracks(Some("builder")).await.unwrap().iter().map(|t| t.id).collect();
        ids.sort();
        assert_eq!(ids, vec![tracks[1].id, tracks[2].id]);

        let by_owner = svc.list_tracks(Some("ALICE")).await.unwrap();
        assert_eq!(by_owner.len(), 2);

        assert!(svc.list_tracks(Some("no such thing")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_track_missing_is_not_found() {
        let (repo, tracks) = seeded().await;
        let svc = TrackQueryService::new(repo);
        assert_eq!(svc.get_track(tracks[3].id).await.unwrap().title, "Field recording");
        assert!(matches!(svc.get_track(999).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn likes_listing_and_per_track() {
        let (repo, tracks) = seeded().await;
        let fan = UserRef { id: Uuid::new_v4(), username: "fan".into() };
        repo.insert_like(&fan, tracks[0].id).await.unwrap();
        repo.insert_like(&fan, tracks[1].id).await.unwrap();

        let svc = TrackQueryService::new(repo);
        assert_eq!(svc.list_likes().await.unwrap().len(), 2);
        let on_first = svc.likes_for_track(tracks[0].id).await.unwrap();
        assert_eq!(on_first.len(), 1);
        assert_eq!(on_first[0].user.as_ref().map(|u| u.username.as_str()), Some("fan"));
        assert!(svc.likes_for_track(tracks[2].id).await.unwrap().is_empty());
    }
}
