use crate::server::{
    Result, ServerError, ServerRouter,
    json::{Created, Json},
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;
use writecue_common::model::{
    Id,
    comment::{Comment, CommentMarker, CommentSummary},
    post::PostMarker,
    user::UserMarker,
};
use writecue_core::interactions::InteractionService;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_post(create_comment)
        .typed_get(get_comment)
        .typed_put(update_comment)
        .typed_delete(delete_comment)
        .typed_get(list_comments)
}

/// Body of comment creation and edits. Content is validated by the service.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct CommentBody {
    content: String,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/comments/user/{user_id}/post/{post_id}", rejection(ServerError))]
struct CreateCommentPath {
    user_id: Id<UserMarker>,
    post_id: Id<PostMarker>,
}

async fn create_comment(
    CreateCommentPath { user_id, post_id }: CreateCommentPath,
    State(interactions): State<Arc<InteractionService>>,
    Json(CommentBody { content }): Json<CommentBody>,
) -> Result<Created<Comment>> {
    let comment = interactions
        .create_comment(content, user_id, post_id)
        .await?;

    Ok(Created {
        location: CommentPath { id: comment.id }.to_string(),
        body: comment,
    })
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/comments/{id}", rejection(ServerError))]
struct CommentPath {
    id: Id<CommentMarker>,
}

async fn get_comment(
    CommentPath { id }: CommentPath,
    State(interactions): State<Arc<InteractionService>>,
) -> Result<Json<Comment>> {
    let comment = interactions.get_comment(id).await?;

    Ok(Json(comment))
}

async fn update_comment(
    CommentPath { id }: CommentPath,
    State(interactions): State<Arc<InteractionService>>,
    Json(CommentBody { content }): Json<CommentBody>,
) -> Result<Json<Comment>> {
    let comment = interactions.update_comment(id, content).await?;

    Ok(Json(comment))
}

async fn delete_comment(
    CommentPath { id }: CommentPath,
    State(interactions): State<Arc<InteractionService>>,
) -> Result<StatusCode> {
    interactions.delete_comment(id).await?;

    Ok(StatusCode::OK)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/comments/post/{post_id}", rejection(ServerError))]
struct PostCommentsPath {
    post_id: Id<PostMarker>,
}

async fn list_comments(
    PostCommentsPath { post_id }: PostCommentsPath,
    State(interactions): State<Arc<InteractionService>>,
) -> Result<Json<Vec<CommentSummary>>> {
    let comments = interactions.list_comments(post_id).await?;

    Ok(Json(comments))
}
