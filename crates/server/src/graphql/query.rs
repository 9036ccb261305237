use async_graphql::{Context, Object, Result};

use super::types::{LikeObject, TrackObject};
use super::Queries;
use crate::errors::to_graphql_error;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// All tracks, optionally narrowed by a case-insensitive search over
    /// title, description, url and the poster's username.
    async fn tracks(&self, ctx: &Context<'_>, search: Option<String>) -> Result<Vec<TrackObject>> {
        let queries = ctx.data::<Queries>()?;
        let tracks = queries
            .list_tracks(search.as_deref())
            .await
            .map_err(to_graphql_error)?;
        Ok(tracks.into_iter().map(TrackObject).collect())
    }

    async fn track(&self, ctx: &Context<'_>, id: i32) -> Result<TrackObject> {
        let queries = ctx.data::<Queries>()?;
        let track = queries.get_track(id).await.map_err(to_graphql_error)?;
        Ok(TrackObject(track))
    }

    async fn likes(&self, ctx: &Context<'_>) -> Result<Vec<LikeObject>> {
        let queries = ctx.data::<Queries>()?;
        let likes = queries.list_likes().await.map_err(to_graphql_error)?;
        Ok(likes.into_iter().map(LikeObject).collect())
    }
}
