//! Turns interaction and account events into inbox notifications and email
//! requests.
//!
//! A [`Notice`] pairs the notification with the email that follows it. The
//! notification is a durable write whose failure is reported; it is stored
//! either on its own or in the same transaction as the like or comment that
//! caused it. The email goes out only after that write and is best effort.

use crate::{
    error::{Result, ServiceError, require_positive},
    gateway::{MessagingGateway, TemplatedEmail},
    store::{Directory, NotificationStore},
};
use std::{borrow::Cow, sync::Arc};
use tracing::{instrument, warn};
use writecue_common::model::{
    Id,
    notification::{NewNotification, Notification, NotificationKind, NotificationMarker},
    post::{Post, resolve_title},
    user::{User, UserMarker},
};

pub const EXCERPT_THRESHOLD: usize = 100;
pub const EXCERPT_KEPT_CHARS: usize = 97;

const FALLBACK_ACTOR_NAME: &str = "Someone";

/// Shortens a comment for an email preview: content longer than
/// [`EXCERPT_THRESHOLD`] characters is cut to [`EXCERPT_KEPT_CHARS`]
/// characters followed by `...`.
#[must_use]
pub fn comment_excerpt(content: &str) -> Cow<'_, str> {
    if content.chars().count() > EXCERPT_THRESHOLD {
        let kept: String = content.chars().take(EXCERPT_KEPT_CHARS).collect();
        Cow::Owned(kept + "...")
    } else {
        Cow::Borrowed(content)
    }
}

fn or_fallback<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// A notification waiting to be stored, and the email to send once it is.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Notice {
    pub notification: NewNotification,
    pub email: TemplatedEmail,
}

/// The notice for a like on `post`, or `None` when the author liked their own
/// post.
#[must_use]
pub fn post_like_notice(post: &Post, liker: &User) -> Option<Notice> {
    let author = &post.author;
    if author.id == liker.id {
        return None;
    }

    let notification = NewNotification {
        receiver_id: author.id,
        message: format!(
            "{} liked your post: \"{}\"",
            liker.display_name,
            resolve_title(post)
        ),
        kind: NotificationKind::Like,
    };

    let email = TemplatedEmail::new(
        &author.email,
        "New Like on Your Post - WriteCue",
        "like-notification.html",
    )
    .with_variable("username", author.username.get())
    .with_variable(
        "likerName",
        or_fallback(&liker.display_name, FALLBACK_ACTOR_NAME),
    )
    .with_variable("postTitle", resolve_title(post));

    Some(Notice {
        notification,
        email,
    })
}

/// The notice for a comment on `post`, or `None` when the author commented on
/// their own post. Only an excerpt of `content` goes into the email, and none
/// of it into the stored message.
#[must_use]
pub fn post_comment_notice(post: &Post, commenter: &User, content: &str) -> Option<Notice> {
    let author = &post.author;
    if author.id == commenter.id {
        return None;
    }

    let notification = NewNotification {
        receiver_id: author.id,
        message: format!(
            "{} commented on your post: \"{}\"",
            commenter.display_name,
            resolve_title(post)
        ),
        kind: NotificationKind::Comment,
    };

    let email = TemplatedEmail::new(
        &author.email,
        "New Comment on Your Post - WriteCue",
        "comment-notification.html",
    )
    .with_variable("username", author.username.get())
    .with_variable(
        "commenterName",
        or_fallback(&commenter.display_name, FALLBACK_ACTOR_NAME),
    )
    .with_variable("postTitle", resolve_title(post))
    .with_variable("commentExcerpt", comment_excerpt(content));

    Some(Notice {
        notification,
        email,
    })
}

/// A fixed account event: what goes into the inbox and which email follows.
struct AccountEvent {
    kind: NotificationKind,
    message: &'static str,
    subject: &'static str,
    template: &'static str,
}

impl AccountEvent {
    fn notice(&self, user: &User) -> Notice {
        Notice {
            notification: NewNotification {
                receiver_id: user.id,
                message: self.message.to_owned(),
                kind: self.kind,
            },
            email: TemplatedEmail::new(&user.email, self.subject, self.template)
                .with_variable("username", user.username.get()),
        }
    }
}

const REGISTRATION: AccountEvent = AccountEvent {
    kind: NotificationKind::Registration,
    message: "Welcome to WriteCue! Your account has been successfully created.",
    subject: "Welcome to WriteCue!",
    template: "welcome.html",
};

const PASSWORD_CHANGE: AccountEvent = AccountEvent {
    kind: NotificationKind::PasswordChange,
    message: "Your WriteCue password has been successfully changed.",
    subject: "Your WriteCue Password Was Changed",
    template: "password-change.html",
};

const PROFILE_UPDATE: AccountEvent = AccountEvent {
    kind: NotificationKind::ProfileUpdate,
    message: "Your profile has been successfully updated.",
    subject: "Your WriteCue Profile Was Updated",
    template: "profile-update.html",
};

pub struct Notifier {
    directory: Arc<dyn Directory>,
    store: Arc<dyn NotificationStore>,
    gateway: Arc<dyn MessagingGateway>,
}

impl Notifier {
    #[must_use]
    pub fn new(
        directory: Arc<dyn Directory>,
        store: Arc<dyn NotificationStore>,
        gateway: Arc<dyn MessagingGateway>,
    ) -> Self {
        Self {
            directory,
            store,
            gateway,
        }
    }

    /// Tells the post's author about a like that is already stored. Returns
    /// `None` when the author liked their own post.
    #[instrument(skip_all, fields(post_id = %post.id, liker_id = %liker.id))]
    pub async fn notify_post_like(&self, post: &Post, liker: &User) -> Result<Option<Notification>> {
        match post_like_notice(post, liker) {
            Some(notice) => self.publish(&notice).await.map(Some),
            None => Ok(None),
        }
    }

    /// Tells the post's author about a comment that is already stored.
    /// Returns `None` when the author commented on their own post.
    #[instrument(skip_all, fields(post_id = %post.id, commenter_id = %commenter.id))]
    pub async fn notify_post_comment(
        &self,
        post: &Post,
        commenter: &User,
        content: &str,
    ) -> Result<Option<Notification>> {
        match post_comment_notice(post, commenter, content) {
            Some(notice) => self.publish(&notice).await.map(Some),
            None => Ok(None),
        }
    }

    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn notify_user_registration(&self, user: &User) -> Result<Notification> {
        self.publish(&REGISTRATION.notice(user)).await
    }

    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn notify_user_password_change(&self, user: &User) -> Result<Notification> {
        self.publish(&PASSWORD_CHANGE.notice(user)).await
    }

    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn notify_profile_update(&self, user: &User) -> Result<Notification> {
        self.publish(&PROFILE_UPDATE.notice(user)).await
    }

    #[instrument(skip(self))]
    pub async fn mark_as_read(&self, notification_id: Id<NotificationMarker>) -> Result<()> {
        let notification_id = require_positive(notification_id, "notification")?;

        if self.store.mark_read(notification_id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("Notification", "id", notification_id))
        }
    }

    /// Marks every unread notification of the user as read and returns how
    /// many there were.
    #[instrument(skip(self))]
    pub async fn mark_all_as_read(&self, user_id: Id<UserMarker>) -> Result<u64> {
        let user_id = self.require_user(user_id).await?;

        Ok(self.store.mark_all_read(user_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_notifications(&self, user_id: Id<UserMarker>) -> Result<Vec<Notification>> {
        let user_id = self.require_user(user_id).await?;

        Ok(self.store.list_notifications(user_id).await?)
    }

    /// Sends the email of a notice whose notification has been stored. A
    /// failing gateway is logged and otherwise ignored.
    pub async fn deliver(&self, notice: &Notice) {
        let email = &notice.email;
        if let Err(err) = self.gateway.send_templated_email(email).await {
            warn!(
                error = %err,
                to = %email.to,
                template = %email.template,
                "Email delivery failed, notification kept"
            );
        }
    }

    async fn require_user(&self, user_id: Id<UserMarker>) -> Result<Id<UserMarker>> {
        let user_id = require_positive(user_id, "user")?;

        if self.directory.user_exists(user_id).await? {
            Ok(user_id)
        } else {
            Err(ServiceError::not_found("User", "id", user_id))
        }
    }

    async fn publish(&self, notice: &Notice) -> Result<Notification> {
        let notification = self.store.insert_notification(&notice.notification).await?;
        self.deliver(notice).await;

        Ok(notification)
    }
}
