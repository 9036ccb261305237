use async_graphql::{Context, Object, Result};

use service::tracks::domain::{LikeState, TrackInput};

use super::types::{CreateLikePayload, CreateTrackPayload, DeleteTrackPayload, TrackObject, UpdateTrackPayload};
use super::{caller, Mutations};
use crate::errors::to_graphql_error;

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_track(
        &self,
        ctx: &Context<'_>,
        title: Option<String>,
        description: Option<String>,
        url: Option<String>,
    ) -> Result<CreateTrackPayload> {
        let mutations = ctx.data::<Mutations>()?;
        let input = TrackInput { title, description, url };
        let track = mutations
            .create_track(&caller(ctx), input)
            .await
            .map_err(to_graphql_error)?;
        Ok(CreateTrackPayload { track: TrackObject(track) })
    }

    /// Overwrites all three content fields; omitted ones become empty.
    async fn update_track(
        &self,
        ctx: &Context<'_>,
        track_id: i32,
        title: Option<String>,
        description: Option<String>,
        url: Option<String>,
    ) -> Result<UpdateTrackPayload> {
        let mutations = ctx.data::<Mutations>()?;
        let input = TrackInput { title, description, url };
        let track = mutations
            .update_track(&caller(ctx), track_id, input)
            .await
            .map_err(to_graphql_error)?;
        Ok(UpdateTrackPayload { track: TrackObject(track) })
    }

    async fn delete_track(&self, ctx: &Context<'_>, track_id: i32) -> Result<DeleteTrackPayload> {
        let mutations = ctx.data::<Mutations>()?;
        let track_id = mutations
            .delete_track(&caller(ctx), track_id)
            .await
            .map_err(to_graphql_error)?;
        Ok(DeleteTrackPayload { track_id })
    }

    /// Toggle: likes the track, or removes the like if one exists.
    async fn create_like(&self, ctx: &Context<'_>, track_id: i32) -> Result<CreateLikePayload> {
        let mutations = ctx.data::<Mutations>()?;
        let out = mutations
            .toggle_like(&caller(ctx), track_id)
            .await
            .map_err(to_graphql_error)?;
        Ok(CreateLikePayload {
            user: out.user.into(),
            track: TrackObject(out.track),
            liked: out.state == LikeState::Liked,
        })
    }
}
