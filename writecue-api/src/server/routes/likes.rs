use crate::server::{Result, ServerError, ServerRouter, json::Json};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;
use writecue_common::model::{
    Id,
    post::PostMarker,
    user::{UserMarker, UserSummary},
};
use writecue_core::interactions::InteractionService;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_post(like_post)
        .typed_delete(unlike_post)
        .typed_get(list_likers)
        .typed_get(count_likes)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/likes/user/{user_id}/post/{post_id}", rejection(ServerError))]
struct UserPostLikePath {
    user_id: Id<UserMarker>,
    post_id: Id<PostMarker>,
}

async fn like_post(
    UserPostLikePath { user_id, post_id }: UserPostLikePath,
    State(interactions): State<Arc<InteractionService>>,
) -> Result<StatusCode> {
    interactions.like_post(user_id, post_id).await?;

    Ok(StatusCode::OK)
}

async fn unlike_post(
    UserPostLikePath { user_id, post_id }: UserPostLikePath,
    State(interactions): State<Arc<InteractionService>>,
) -> Result<StatusCode> {
    interactions.unlike_post(user_id, post_id).await?;

    Ok(StatusCode::OK)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/likes/post/{post_id}", rejection(ServerError))]
struct PostLikesPath {
    post_id: Id<PostMarker>,
}

async fn list_likers(
    PostLikesPath { post_id }: PostLikesPath,
    State(interactions): State<Arc<InteractionService>>,
) -> Result<Json<Vec<UserSummary>>> {
    let likers = interactions.list_likers(post_id).await?;

    Ok(Json(likers))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/likes/post/{post_id}/count", rejection(ServerError))]
struct PostLikeCountPath {
    post_id: Id<PostMarker>,
}

async fn count_likes(
    PostLikeCountPath { post_id }: PostLikeCountPath,
    State(interactions): State<Arc<InteractionService>>,
) -> Result<Json<u64>> {
    let count = interactions.count_likes(post_id).await?;

    Ok(Json(count))
}
