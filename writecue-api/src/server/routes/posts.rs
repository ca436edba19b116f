use crate::server::{Result, ServerError, ServerRouter, json::Json};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;
use writecue_common::model::{
    Id,
    post::{PostMarker, PostView},
};
use writecue_core::interactions::InteractionService;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(get_post)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct GetPostPath {
    id: Id<PostMarker>,
}

async fn get_post(
    GetPostPath { id }: GetPostPath,
    State(interactions): State<Arc<InteractionService>>,
) -> Result<Json<PostView>> {
    let post = interactions.post_view(id).await?;

    Ok(Json(post))
}
