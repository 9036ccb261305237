use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::identity::UserRef;

/// Domain track (business view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub posted_by: Option<UserRef>,
}

/// Domain like; the track is referenced by id and resolved on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub id: i32,
    pub user: Option<UserRef>,
    pub track_id: i32,
}

/// Create/update input as received from the API; every field may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

/// Validated track fields. Absent title/description become empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackContent {
    pub title: String,
    pub description: String,
    pub url: String,
}

impl TrackInput {
    pub fn into_content(self) -> Result<TrackContent, ServiceError> {
        let content = TrackContent {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            url: self.url.unwrap_or_default().trim().to_string(),
        };
        models::track::validate(&content.title, &content.url)?;
        Ok(content)
    }
}

#[derive(Debug, Clone)]
pub struct NewTrack {
    pub content: TrackContent,
    pub posted_by: Option<UserRef>,
}

/// Track selection for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackFilter {
    All,
    /// Case-insensitive substring over title, description, url and owner username.
    Search(String),
}

impl TrackFilter {
    pub fn from_search(search: Option<&str>) -> Self {
        match search {
            Some(s) if !s.is_empty() => TrackFilter::Search(s.to_string()),
            _ => TrackFilter::All,
        }
    }

    pub fn matches(&self, track: &Track) -> bool {
        let needle = match self {
            TrackFilter::All => return true,
            TrackFilter::Search(s) => s.to_lowercase(),
        };
        let hit = |field: &str| field.to_lowercase().contains(&needle);
        hit(&track.title)
            || hit(&track.description)
            || hit(&track.url)
            || track.posted_by.as_ref().is_some_and(|u| hit(&u.username))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LikeFilter {
    pub user_id: Option<Uuid>,
    pub track_id: Option<i32>,
}

impl LikeFilter {
    pub fn pair(user_id: Uuid, track_id: i32) -> Self {
        Self { user_id: Some(user_id), track_id: Some(track_id) }
    }

    pub fn track(track_id: i32) -> Self {
        Self { user_id: None, track_id: Some(track_id) }
    }

    pub fn is_unbounded(&self) -> bool { self.user_id.is_none() && self.track_id.is_none() }

    pub fn matches(&self, like: &Like) -> bool {
        let user_ok = match self.user_id {
            None => true,
            Some(uid) => like.user.as_ref().is_some_and(|u| u.id == uid),
        };
        let track_ok = self.track_id.map_or(true, |tid| like.track_id == tid);
        user_ok && track_ok
    }
}

/// Per (user, track) state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LikeState {
    Liked,
    NotLiked,
}

#[derive(Debug, Clone)]
pub struct LikeToggle {
    pub user: UserRef,
    pub track: Track,
    pub state: LikeState,
}
