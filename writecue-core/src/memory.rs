//! In-memory implementations of every port, for tests.
//!
//! One mutex guards all tables, so each operation is atomic in the same way a
//! single SQL transaction is.

use crate::{
    error::StoreError,
    gateway::{GatewayError, MessagingGateway, TemplatedEmail},
    store::{Directory, InteractionStore, NotificationStore, StoreResult},
};
use async_trait::async_trait;
use std::{
    io,
    sync::{Mutex, MutexGuard, PoisonError},
};
use time::OffsetDateTime;
use writecue_common::model::{
    Id,
    comment::{Comment, CommentContent, CommentMarker, CommentSummary},
    like::Like,
    notification::{NewNotification, Notification, NotificationMarker},
    post::{Post, PostMarker},
    user::{User, UserMarker, UserSummary, Username},
};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    posts: Vec<Post>,
    likes: Vec<Like>,
    comments: Vec<Comment>,
    notifications: Vec<Notification>,
}

impl Tables {
    fn allocate<Marker>(&mut self) -> Id<Marker> {
        self.next_id += 1;
        Id::new(self.next_id)
    }

    fn user(&self, user_id: Id<UserMarker>) -> Option<&User> {
        self.users.iter().find(|user| user.id == user_id)
    }

    fn push_notification(&mut self, notification: &NewNotification) -> Notification {
        let notification = Notification {
            id: self.allocate(),
            receiver_id: notification.receiver_id,
            message: notification.message.clone(),
            kind: notification.kind,
            created_at: OffsetDateTime::now_utc(),
            read: false,
        };
        self.notifications.push(notification.clone());
        notification
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    refuse_notifications: bool,
}

impl MemoryStore {
    /// A store that fails every write involving a notification. Such a write
    /// leaves all tables untouched, like a rolled back transaction.
    #[must_use]
    pub fn refusing_notifications() -> Self {
        Self {
            tables: Mutex::default(),
            refuse_notifications: true,
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_notification_write(&self) -> StoreResult<()> {
        if self.refuse_notifications {
            Err(StoreError::backend(io::Error::other("notification write refused")))
        } else {
            Ok(())
        }
    }

    /// Adds a user with the email `{username}@example.com`.
    ///
    /// # Panics
    /// If `username` is not a valid [`Username`].
    pub fn add_user(&self, username: &str, display_name: &str) -> User {
        let mut tables = self.tables();
        let user = User {
            id: tables.allocate(),
            username: Username::new(username.to_owned()).expect("invalid test username"),
            email: format!("{username}@example.com"),
            display_name: display_name.to_owned(),
            bio: None,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.push(user.clone());
        user
    }

    pub fn add_post(&self, author: &User, title: Option<&str>) -> Post {
        let mut tables = self.tables();
        let now = OffsetDateTime::now_utc();
        let post = Post {
            id: tables.allocate(),
            title: title.map(str::to_owned),
            content: String::new(),
            author: author.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.posts.push(post.clone());
        post
    }

    /// Every stored notification, oldest first.
    #[must_use]
    pub fn all_notifications(&self) -> Vec<Notification> {
        self.tables().notifications.clone()
    }
}

#[async_trait]
impl Directory for MemoryStore {
    async fn fetch_user(&self, user_id: Id<UserMarker>) -> StoreResult<Option<User>> {
        Ok(self.tables().user(user_id).cloned())
    }

    async fn user_exists(&self, user_id: Id<UserMarker>) -> StoreResult<bool> {
        Ok(self.tables().user(user_id).is_some())
    }

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> StoreResult<Option<Post>> {
        Ok(self
            .tables()
            .posts
            .iter()
            .find(|post| post.id == post_id)
            .cloned())
    }

    async fn post_exists(&self, post_id: Id<PostMarker>) -> StoreResult<bool> {
        Ok(self.tables().posts.iter().any(|post| post.id == post_id))
    }
}

#[async_trait]
impl InteractionStore for MemoryStore {
    async fn insert_like(
        &self,
        user_id: Id<UserMarker>,
        post_id: Id<PostMarker>,
        notification: Option<&NewNotification>,
    ) -> StoreResult<Option<Like>> {
        let mut tables = self.tables();
        if tables
            .likes
            .iter()
            .any(|like| like.user_id == user_id && like.post_id == post_id)
        {
            return Ok(None);
        }
        if notification.is_some() {
            self.check_notification_write()?;
        }

        let like = Like {
            id: tables.allocate(),
            user_id,
            post_id,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.likes.push(like.clone());
        if let Some(notification) = notification {
            tables.push_notification(notification);
        }
        Ok(Some(like))
    }

    async fn delete_like(
        &self,
        user_id: Id<UserMarker>,
        post_id: Id<PostMarker>,
    ) -> StoreResult<bool> {
        let mut tables = self.tables();
        let before = tables.likes.len();
        tables
            .likes
            .retain(|like| !(like.user_id == user_id && like.post_id == post_id));
        Ok(tables.likes.len() < before)
    }

    async fn count_likes(&self, post_id: Id<PostMarker>) -> StoreResult<u64> {
        let count = self
            .tables()
            .likes
            .iter()
            .filter(|like| like.post_id == post_id)
            .count();
        Ok(count as u64)
    }

    async fn list_likers(&self, post_id: Id<PostMarker>) -> StoreResult<Vec<UserSummary>> {
        let tables = self.tables();
        let likers = tables
            .likes
            .iter()
            .filter(|like| like.post_id == post_id)
            .filter_map(|like| tables.user(like.user_id))
            .map(User::summary)
            .collect();
        Ok(likers)
    }

    async fn insert_comment(
        &self,
        user_id: Id<UserMarker>,
        post_id: Id<PostMarker>,
        content: &CommentContent,
        notification: Option<&NewNotification>,
    ) -> StoreResult<Comment> {
        if notification.is_some() {
            self.check_notification_write()?;
        }

        let mut tables = self.tables();
        let now = OffsetDateTime::now_utc();
        let comment = Comment {
            id: tables.allocate(),
            user_id,
            post_id,
            content: content.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(comment.clone());
        if let Some(notification) = notification {
            tables.push_notification(notification);
        }
        Ok(comment)
    }

    async fn fetch_comment(&self, comment_id: Id<CommentMarker>) -> StoreResult<Option<Comment>> {
        Ok(self
            .tables()
            .comments
            .iter()
            .find(|comment| comment.id == comment_id)
            .cloned())
    }

    async fn update_comment(
        &self,
        comment_id: Id<CommentMarker>,
        content: &CommentContent,
    ) -> StoreResult<Option<Comment>> {
        let mut tables = self.tables();
        let updated = tables
            .comments
            .iter_mut()
            .find(|comment| comment.id == comment_id)
            .map(|comment| {
                comment.content = content.clone();
                comment.updated_at = OffsetDateTime::now_utc();
                comment.clone()
            });
        Ok(updated)
    }

    async fn delete_comment(&self, comment_id: Id<CommentMarker>) -> StoreResult<bool> {
        let mut tables = self.tables();
        let before = tables.comments.len();
        tables.comments.retain(|comment| comment.id != comment_id);
        Ok(tables.comments.len() < before)
    }

    async fn list_comments(&self, post_id: Id<PostMarker>) -> StoreResult<Vec<CommentSummary>> {
        let tables = self.tables();
        let comments = tables
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .filter_map(|comment| {
                tables.user(comment.user_id).map(|user| CommentSummary {
                    display_name: user.display_name.clone(),
                    content: comment.content.clone(),
                    created_at: comment.created_at,
                })
            })
            .collect();
        Ok(comments)
    }

    async fn count_comments(&self, post_id: Id<PostMarker>) -> StoreResult<u64> {
        let count = self
            .tables()
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .count();
        Ok(count as u64)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> StoreResult<Notification> {
        self.check_notification_write()?;

        Ok(self.tables().push_notification(notification))
    }

    async fn mark_read(&self, notification_id: Id<NotificationMarker>) -> StoreResult<bool> {
        let mut tables = self.tables();
        let found = tables
            .notifications
            .iter_mut()
            .find(|notification| notification.id == notification_id)
            .map(|notification| notification.read = true)
            .is_some();
        Ok(found)
    }

    async fn mark_all_read(&self, user_id: Id<UserMarker>) -> StoreResult<u64> {
        let mut tables = self.tables();
        let mut changed = 0;
        for notification in &mut tables.notifications {
            if notification.receiver_id == user_id && !notification.read {
                notification.read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn list_notifications(&self, user_id: Id<UserMarker>) -> StoreResult<Vec<Notification>> {
        let notifications = self
            .tables()
            .notifications
            .iter()
            .rev()
            .filter(|notification| notification.receiver_id == user_id)
            .cloned()
            .collect();
        Ok(notifications)
    }
}

/// Gateway that keeps every request it receives, and optionally fails them.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<TemplatedEmail>>,
    fail: bool,
}

impl RecordingGateway {
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    #[must_use]
    pub fn sent(&self) -> Vec<TemplatedEmail> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn send_templated_email(&self, email: &TemplatedEmail) -> Result<(), GatewayError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(email.clone());

        if self.fail {
            Err(GatewayError::Rejected(503))
        } else {
            Ok(())
        }
    }
}
