use sqlx::FromRow;
use time::OffsetDateTime;
use writecue_common::model::{
    ModelValidationError,
    comment::{Comment, CommentContent, CommentSummary},
    like::Like,
    notification::Notification,
    post::Post,
    user::{User, UserSummary, Username},
};

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct UserRecord {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct UserSummaryRecord {
    pub display_name: String,
    pub username: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct FullPostRecord {
    pub post_id: i64,
    pub title: Option<String>,
    pub content: String,
    pub post_created_at: OffsetDateTime,
    pub post_updated_at: OffsetDateTime,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub user_created_at: OffsetDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct LikeRecord {
    pub like_id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct CommentRecord {
    pub comment_id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct CommentSummaryRecord {
    pub display_name: String,
    pub content: String,
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct NotificationRecord {
    pub notification_id: i64,
    pub user_id: i64,
    pub message: String,
    pub kind: String,
    pub created_at: OffsetDateTime,
    pub is_read: bool,
}

impl TryFrom<UserRecord> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.user_id.into(),
            username: Username::new(value.username)?,
            email: value.email,
            display_name: value.display_name,
            bio: value.bio,
            created_at: value.created_at,
        })
    }
}

impl TryFrom<UserSummaryRecord> for UserSummary {
    type Error = ModelValidationError;

    fn try_from(value: UserSummaryRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            display_name: value.display_name,
            username: Username::new(value.username)?,
        })
    }
}

impl TryFrom<FullPostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: FullPostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.post_id.into(),
            title: value.title,
            content: value.content,
            author: User {
                id: value.user_id.into(),
                username: Username::new(value.username)?,
                email: value.email,
                display_name: value.display_name,
                bio: value.bio,
                created_at: value.user_created_at,
            },
            created_at: value.post_created_at,
            updated_at: value.post_updated_at,
        })
    }
}

impl From<LikeRecord> for Like {
    fn from(value: LikeRecord) -> Self {
        Self {
            id: value.like_id.into(),
            user_id: value.user_id.into(),
            post_id: value.post_id.into(),
            created_at: value.created_at,
        }
    }
}

impl TryFrom<CommentRecord> for Comment {
    type Error = ModelValidationError;

    fn try_from(value: CommentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.comment_id.into(),
            user_id: value.user_id.into(),
            post_id: value.post_id.into(),
            content: CommentContent::new(value.content)?,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl TryFrom<CommentSummaryRecord> for CommentSummary {
    type Error = ModelValidationError;

    fn try_from(value: CommentSummaryRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            display_name: value.display_name,
            content: CommentContent::new(value.content)?,
            created_at: value.created_at,
        })
    }
}

impl TryFrom<NotificationRecord> for Notification {
    type Error = ModelValidationError;

    fn try_from(value: NotificationRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.notification_id.into(),
            receiver_id: value.user_id.into(),
            message: value.message,
            kind: value.kind.parse()?,
            created_at: value.created_at,
            read: value.is_read,
        })
    }
}
