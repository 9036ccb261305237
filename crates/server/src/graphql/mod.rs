use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, Schema};

use service::identity::Caller;
use service::tracks::repository::TrackRepository;
use service::tracks::{TrackMutationService, TrackQueryService};

pub mod mutation;
pub mod query;
pub mod types;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

pub type TrackSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;
pub type Queries = TrackQueryService<dyn TrackRepository>;
pub type Mutations = TrackMutationService<dyn TrackRepository>;

/// Both services share one repository handle; swapping storage means
/// passing a different `TrackRepository` here.
pub fn build_schema(repo: Arc<dyn TrackRepository>) -> TrackSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data::<Queries>(TrackQueryService::new(Arc::clone(&repo)))
        .data::<Mutations>(TrackMutationService::new(repo))
        .finish()
}

/// Caller attached to the request; absent means anonymous.
pub(crate) fn caller(ctx: &Context<'_>) -> Caller {
    ctx.data_opt::<Caller>().cloned().unwrap_or_default()
}
