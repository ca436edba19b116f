//! [`DbClient`] as the storage behind the interaction engine.

use crate::client::DbClient;
use async_trait::async_trait;
use writecue_common::model::{
    Id,
    comment::{Comment, CommentContent, CommentMarker, CommentSummary},
    like::Like,
    notification::{NewNotification, Notification, NotificationMarker},
    post::{Post, PostMarker},
    user::{User, UserMarker, UserSummary},
};
use writecue_core::store::{Directory, InteractionStore, NotificationStore, StoreResult};

#[async_trait]
impl Directory for DbClient {
    async fn fetch_user(&self, user_id: Id<UserMarker>) -> StoreResult<Option<User>> {
        Ok(DbClient::fetch_user(self, user_id).await?)
    }

    async fn user_exists(&self, user_id: Id<UserMarker>) -> StoreResult<bool> {
        Ok(DbClient::user_exists(self, user_id).await?)
    }

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> StoreResult<Option<Post>> {
        Ok(DbClient::fetch_post(self, post_id).await?)
    }

    async fn post_exists(&self, post_id: Id<PostMarker>) -> StoreResult<bool> {
        Ok(DbClient::post_exists(self, post_id).await?)
    }
}

#[async_trait]
impl InteractionStore for DbClient {
    async fn insert_like(
        &self,
        user_id: Id<UserMarker>,
        post_id: Id<PostMarker>,
        notification: Option<&NewNotification>,
    ) -> StoreResult<Option<Like>> {
        Ok(DbClient::insert_like(self, user_id, post_id, notification).await?)
    }

    async fn delete_like(
        &self,
        user_id: Id<UserMarker>,
        post_id: Id<PostMarker>,
    ) -> StoreResult<bool> {
        Ok(DbClient::delete_like(self, user_id, post_id).await?)
    }

    async fn count_likes(&self, post_id: Id<PostMarker>) -> StoreResult<u64> {
        Ok(DbClient::count_likes(self, post_id).await?)
    }

    async fn list_likers(&self, post_id: Id<PostMarker>) -> StoreResult<Vec<UserSummary>> {
        Ok(DbClient::list_likers(self, post_id).await?)
    }

    async fn insert_comment(
        &self,
        user_id: Id<UserMarker>,
        post_id: Id<PostMarker>,
        content: &CommentContent,
        notification: Option<&NewNotification>,
    ) -> StoreResult<Comment> {
        Ok(DbClient::insert_comment(self, user_id, post_id, content, notification).await?)
    }

    async fn fetch_comment(&self, comment_id: Id<CommentMarker>) -> StoreResult<Option<Comment>> {
        Ok(DbClient::fetch_comment(self, comment_id).await?)
    }

    async fn update_comment(
        &self,
        comment_id: Id<CommentMarker>,
        content: &CommentContent,
    ) -> StoreResult<Option<Comment>> {
        Ok(DbClient::update_comment(self, comment_id, content).await?)
    }

    async fn delete_comment(&self, comment_id: Id<CommentMarker>) -> StoreResult<bool> {
        Ok(DbClient::delete_comment(self, comment_id).await?)
    }

    async fn list_comments(&self, post_id: Id<PostMarker>) -> StoreResult<Vec<CommentSummary>> {
        Ok(DbClient::list_comments(self, post_id).await?)
    }

    async fn count_comments(&self, post_id: Id<PostMarker>) -> StoreResult<u64> {
        Ok(DbClient::count_comments(self, post_id).await?)
    }
}

#[async_trait]
impl NotificationStore for DbClient {
    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> StoreResult<Notification> {
        Ok(DbClient::insert_notification(self, notification).await?)
    }

    async fn mark_read(&self, notification_id: Id<NotificationMarker>) -> StoreResult<bool> {
        Ok(DbClient::mark_read(self, notification_id).await?)
    }

    async fn mark_all_read(&self, user_id: Id<UserMarker>) -> StoreResult<u64> {
        Ok(DbClient::mark_all_read(self, user_id).await?)
    }

    async fn list_notifications(&self, user_id: Id<UserMarker>) -> StoreResult<Vec<Notification>> {
        Ok(DbClient::list_notifications(self, user_id).await?)
    }
}
