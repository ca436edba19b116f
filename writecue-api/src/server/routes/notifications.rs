use crate::server::{Result, ServerError, ServerRouter, json::Json};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use writecue_common::model::{
    Id,
    notification::{Notification, NotificationMarker},
    user::UserMarker,
};
use writecue_core::notifier::Notifier;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_put(mark_read)
        .typed_put(mark_all_read)
        .typed_get(list_notifications)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/notifications/{id}/mark-read", rejection(ServerError))]
struct MarkReadPath {
    id: Id<NotificationMarker>,
}

async fn mark_read(
    MarkReadPath { id }: MarkReadPath,
    State(notifier): State<Arc<Notifier>>,
) -> Result<StatusCode> {
    notifier.mark_as_read(id).await?;

    Ok(StatusCode::OK)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/notifications/mark-all-read", rejection(ServerError))]
struct MarkAllReadPath();

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkAllReadBody {
    user_id: Id<UserMarker>,
}

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Serialize)]
struct MarkAllReadResponse {
    updated: u64,
}

async fn mark_all_read(
    MarkAllReadPath(): MarkAllReadPath,
    State(notifier): State<Arc<Notifier>>,
    Json(MarkAllReadBody { user_id }): Json<MarkAllReadBody>,
) -> Result<Json<MarkAllReadResponse>> {
    let updated = notifier.mark_all_as_read(user_id).await?;

    Ok(Json(MarkAllReadResponse { updated }))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/notifications/user/{user_id}", rejection(ServerError))]
struct UserNotificationsPath {
    user_id: Id<UserMarker>,
}

async fn list_notifications(
    UserNotificationsPath { user_id }: UserNotificationsPath,
    State(notifier): State<Arc<Notifier>>,
) -> Result<Json<Vec<Notification>>> {
    let notifications = notifier.list_notifications(user_id).await?;

    Ok(Json(notifications))
}
