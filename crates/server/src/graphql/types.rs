use async_graphql::{Context, Object, Result, SimpleObject};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use service::identity::UserRef;
use service::tracks::domain::{Like, Track};

use super::Queries;
use crate::errors::to_graphql_error;

#[derive(SimpleObject, Clone)]
#[graphql(name = "User")]
pub struct UserObject {
    pub id: Uuid,
    pub username: String,
}

impl From<UserRef> for UserObject {
    fn from(u: UserRef) -> Self {
        Self { id: u.id, username: u.username }
    }
}

pub struct TrackObject(pub Track);

#[Object(name = "Track")]
impl TrackObject {
    async fn id(&self) -> i32 {
        self.0.id
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn description(&self) -> &str {
        &self.0.description
    }

    async fn url(&self) -> &str {
        &self.0.url
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn updated_at(&self) -> DateTime<Utc> {
        self.0.updated_at
    }

    async fn posted_by(&self) -> Option<UserObject> {
        self.0.posted_by.clone().map(UserObject::from)
    }

    /// Likes on this track, oldest first.
    async fn likes(&self, ctx: &Context<'_>) -> Result<Vec<LikeObject>> {
        let queries = ctx.data::<Queries>()?;
        let likes = queries.likes_for_track(self.0.id).await.map_err(to_graphql_error)?;
        Ok(likes.into_iter().map(LikeObject).collect())
    }
}

pub struct LikeObject(pub Like);

#[Object(name = "Like")]
impl LikeObject {
    async fn id(&self) -> i32 {
        self.0.id
    }

    async fn user(&self) -> Option<UserObject> {
        self.0.user.clone().map(UserObject::from)
    }

    async fn track(&self, ctx: &Context<'_>) -> Result<TrackObject> {
        let queries = ctx.data::<Queries>()?;
        let track = queries.get_track(self.0.track_id).await.map_err(to_graphql_error)?;
        Ok(TrackObject(track))
    }
}

#[derive(SimpleObject)]
pub struct CreateTrackPayload {
    pub track: TrackObject,
}

#[derive(SimpleObject)]
pub struct UpdateTrackPayload {
    pub track: TrackObject,
}

#[derive(SimpleObject)]
pub struct DeleteTrackPayload {
    pub track_id: i32,
}

/// Result of a like toggle; `liked` is the state after the call.
#[derive(SimpleObject)]
pub struct CreateLikePayload {
    pub user: UserObject,
    pub track: TrackObject,
    pub liked: bool,
}
