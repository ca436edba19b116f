//! Ports to the durable stores and to the user/post read side.
//!
//! Adapters report failures as [`StoreError`]; deciding what a missing row
//! means is left to the services.

use crate::error::StoreError;
use async_trait::async_trait;
use writecue_common::model::{
    Id,
    comment::{Comment, CommentContent, CommentMarker, CommentSummary},
    like::Like,
    notification::{NewNotification, Notification, NotificationMarker},
    post::{Post, PostMarker},
    user::{User, UserMarker, UserSummary},
};

pub type StoreResult<T> = Result<T, StoreError>;

/// Read access to accounts and posts, which this engine never writes.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn fetch_user(&self, user_id: Id<UserMarker>) -> StoreResult<Option<User>>;

    async fn user_exists(&self, user_id: Id<UserMarker>) -> StoreResult<bool>;

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> StoreResult<Option<Post>>;

    async fn post_exists(&self, post_id: Id<PostMarker>) -> StoreResult<bool>;
}

#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Records a like together with the author's notification, if any, as one
    /// atomic step. Returns `None` and writes nothing if the user already likes
    /// the post.
    async fn insert_like(
        &self,
        user_id: Id<UserMarker>,
        post_id: Id<PostMarker>,
        notification: Option<&NewNotification>,
    ) -> StoreResult<Option<Like>>;

    /// Returns whether a like was removed.
    async fn delete_like(&self, user_id: Id<UserMarker>, post_id: Id<PostMarker>)
    -> StoreResult<bool>;

    async fn count_likes(&self, post_id: Id<PostMarker>) -> StoreResult<u64>;

    /// Likers in the order their likes were recorded.
    async fn list_likers(&self, post_id: Id<PostMarker>) -> StoreResult<Vec<UserSummary>>;

    /// Records a comment together with the author's notification, if any. Either
    /// both are stored or neither is.
    async fn insert_comment(
        &self,
        user_id: Id<UserMarker>,
        post_id: Id<PostMarker>,
        content: &CommentContent,
        notification: Option<&NewNotification>,
    ) -> StoreResult<Comment>;

    async fn fetch_comment(&self, comment_id: Id<CommentMarker>) -> StoreResult<Option<Comment>>;

    /// Replaces the content and refreshes `updated_at`. `None` if there is no
    /// such comment.
    async fn update_comment(
        &self,
        comment_id: Id<CommentMarker>,
        content: &CommentContent,
    ) -> StoreResult<Option<Comment>>;

    /// Returns whether a comment was removed.
    async fn delete_comment(&self, comment_id: Id<CommentMarker>) -> StoreResult<bool>;

    /// Comments in creation order.
    async fn list_comments(&self, post_id: Id<PostMarker>) -> StoreResult<Vec<CommentSummary>>;

    async fn count_comments(&self, post_id: Id<PostMarker>) -> StoreResult<u64>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, notification: &NewNotification)
    -> StoreResult<Notification>;

    /// Sets the read flag. Returns whether the notification exists; marking an
    /// already read notification still counts as found.
    async fn mark_read(&self, notification_id: Id<NotificationMarker>) -> StoreResult<bool>;

    /// Sets the read flag on every unread notification of the user and
    /// returns how many changed.
    async fn mark_all_read(&self, user_id: Id<UserMarker>) -> StoreResult<u64>;

    /// Newest first.
    async fn list_notifications(&self, user_id: Id<UserMarker>) -> StoreResult<Vec<Notification>>;
}
