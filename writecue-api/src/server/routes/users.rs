use crate::server::{Result, ServerError, ServerRouter, json::Json};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;
use writecue_common::model::{
    Id,
    user::{UserMarker, UserSummary},
};
use writecue_core::interactions::InteractionService;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(get_user)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{id}", rejection(ServerError))]
struct GetUserPath {
    id: Id<UserMarker>,
}

async fn get_user(
    GetUserPath { id }: GetUserPath,
    State(interactions): State<Arc<InteractionService>>,
) -> Result<Json<UserSummary>> {
    let user = interactions.user_summary(id).await?;

    Ok(Json(user))
}
