use crate::record::{
    CommentRecord, CommentSummaryRecord, FullPostRecord, LikeRecord, NotificationRecord,
    UserRecord, UserSummaryRecord,
};
use sqlx::{
    PgExecutor, PgPool, migrate::MigrateError, postgres::PgPoolOptions, query, query_as,
    query_scalar,
};
use thiserror::Error;
use tracing::info;
use writecue_common::model::{
    Id, ModelValidationError,
    comment::{Comment, CommentContent, CommentMarker, CommentSummary},
    like::Like,
    notification::{NewNotification, Notification, NotificationMarker},
    post::{Post, PostMarker},
    user::{User, UserMarker, UserSummary},
};
use writecue_core::error::StoreError;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("Running migrations failed: {0}")]
    Migrate(#[from] MigrateError),
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Data(err) => StoreError::Data(err),
            DbError::Sqlx(err) => StoreError::backend(err),
            DbError::Migrate(err) => StoreError::backend(err),
        }
    }
}

const COMMENT_COLUMNS: &str = "comment_id, user_id, post_id, content, created_at, updated_at";
const NOTIFICATION_COLUMNS: &str = "notification_id, user_id, message, kind, created_at, is_read";

#[derive(Clone, Debug)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");

        Ok(())
    }

    pub async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        let record = query_as::<_, UserRecord>(
            "
            SELECT
                users.user_id,
                users.username,
                users.email,
                users.display_name,
                users.bio,
                users.created_at
            FROM
                users.users
            WHERE
                users.user_id = $1
            ",
        )
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    pub async fn user_exists(&self, user_id: Id<UserMarker>) -> Result<bool> {
        let exists = query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users.users WHERE users.user_id = $1)",
        )
        .bind(user_id.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let record = query_as::<_, FullPostRecord>(
            "
            SELECT
                posts.post_id,
                posts.title,
                posts.content,
                posts.created_at AS post_created_at,
                posts.updated_at AS post_updated_at,
                users.user_id,
                users.username,
                users.email,
                users.display_name,
                users.bio,
                users.created_at AS user_created_at
            FROM
                posts.posts JOIN users.users USING (user_id)
            WHERE
                posts.post_id = $1
            ",
        )
        .bind(post_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }

    pub async fn post_exists(&self, post_id: Id<PostMarker>) -> Result<bool> {
        let exists = query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM posts.posts WHERE posts.post_id = $1)",
        )
        .bind(post_id.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Inserts the like and, in the same transaction, the notification about
    /// it. `None` when the pair already has a like, in which case nothing is
    /// written. The unique index decides, so concurrent duplicates cannot both
    /// succeed.
    pub async fn insert_like(
        &self,
        user_id: Id<UserMarker>,
        post_id: Id<PostMarker>,
        notification: Option<&NewNotification>,
    ) -> Result<Option<Like>> {
        let mut tx = self.pool.begin().await?;

        let record = query_as::<_, LikeRecord>(
            "
            INSERT INTO interactions.likes (user_id, post_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, post_id) DO NOTHING
            RETURNING like_id, user_id, post_id, created_at
            ",
        )
        .bind(user_id.get())
        .bind(post_id.get())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        if let Some(notification) = notification {
            insert_notification(&mut *tx, notification).await?;
        }
        tx.commit().await?;

        Ok(Some(record.into()))
    }

    pub async fn delete_like(
        &self,
        user_id: Id<UserMarker>,
        post_id: Id<PostMarker>,
    ) -> Result<bool> {
        let result = query(
            "
            DELETE FROM interactions.likes
            WHERE likes.user_id = $1 AND likes.post_id = $2
            ",
        )
        .bind(user_id.get())
        .bind(post_id.get())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_likes(&self, post_id: Id<PostMarker>) -> Result<u64> {
        let count = query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM interactions.likes WHERE likes.post_id = $1",
        )
        .bind(post_id.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(count.cast_unsigned())
    }

    pub async fn list_likers(&self, post_id: Id<PostMarker>) -> Result<Vec<UserSummary>> {
        let records = query_as::<_, UserSummaryRecord>(
            "
            SELECT
                users.display_name,
                users.username
            FROM
                interactions.likes JOIN users.users USING (user_id)
            WHERE
                likes.post_id = $1
            ORDER BY
                likes.like_id
            ",
        )
        .bind(post_id.get())
        .fetch_all(&self.pool)
        .await?;

        let likers = records
            .into_iter()
            .map(UserSummary::try_from)
            .collect::<Result<_, _>>()?;
        Ok(likers)
    }

    /// Inserts the comment and, in the same transaction, the notification
    /// about it.
    pub async fn insert_comment(
        &self,
        user_id: Id<UserMarker>,
        post_id: Id<PostMarker>,
        content: &CommentContent,
        notification: Option<&NewNotification>,
    ) -> Result<Comment> {
        let mut tx = self.pool.begin().await?;

        let record = query_as::<_, CommentRecord>(&format!(
            "
            INSERT INTO interactions.comments (user_id, post_id, content)
            VALUES ($1, $2, $3)
            RETURNING {COMMENT_COLUMNS}
            "
        ))
        .bind(user_id.get())
        .bind(post_id.get())
        .bind(content.get())
        .fetch_one(&mut *tx)
        .await?;
        let comment: Comment = record.try_into()?;

        if let Some(notification) = notification {
            insert_notification(&mut *tx, notification).await?;
        }
        tx.commit().await?;

        Ok(comment)
    }

    pub async fn fetch_comment(&self, comment_id: Id<CommentMarker>) -> Result<Option<Comment>> {
        let record = query_as::<_, CommentRecord>(&format!(
            "
            SELECT {COMMENT_COLUMNS}
            FROM interactions.comments
            WHERE comments.comment_id = $1
            "
        ))
        .bind(comment_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let comment = record.map(Comment::try_from).transpose()?;
        Ok(comment)
    }

    pub async fn update_comment(
        &self,
        comment_id: Id<CommentMarker>,
        content: &CommentContent,
    ) -> Result<Option<Comment>> {
        let record = query_as::<_, CommentRecord>(&format!(
            "
            UPDATE interactions.comments
            SET content = $2, updated_at = now()
            WHERE comments.comment_id = $1
            RETURNING {COMMENT_COLUMNS}
            "
        ))
        .bind(comment_id.get())
        .bind(content.get())
        .fetch_optional(&self.pool)
        .await?;

        let comment = record.map(Comment::try_from).transpose()?;
        Ok(comment)
    }

    pub async fn delete_comment(&self, comment_id: Id<CommentMarker>) -> Result<bool> {
        let result = query("DELETE FROM interactions.comments WHERE comments.comment_id = $1")
            .bind(comment_id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_comments(&self, post_id: Id<PostMarker>) -> Result<Vec<CommentSummary>> {
        let records = query_as::<_, CommentSummaryRecord>(
            "
            SELECT
                users.display_name,
                comments.content,
                comments.created_at
            FROM
                interactions.comments JOIN users.users USING (user_id)
            WHERE
                comments.post_id = $1
            ORDER BY
                comments.comment_id
            ",
        )
        .bind(post_id.get())
        .fetch_all(&self.pool)
        .await?;

        let comments = records
            .into_iter()
            .map(CommentSummary::try_from)
            .collect::<Result<_, _>>()?;
        Ok(comments)
    }

    pub async fn count_comments(&self, post_id: Id<PostMarker>) -> Result<u64> {
        let count = query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM interactions.comments WHERE comments.post_id = $1",
        )
        .bind(post_id.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(count.cast_unsigned())
    }

    pub async fn insert_notification(&self, notification: &NewNotification) -> Result<Notification> {
        insert_notification(&self.pool, notification).await
    }

    pub async fn mark_read(&self, notification_id: Id<NotificationMarker>) -> Result<bool> {
        let result = query(
            "
            UPDATE notifications.notifications
            SET is_read = TRUE
            WHERE notifications.notification_id = $1
            ",
        )
        .bind(notification_id.get())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_all_read(&self, user_id: Id<UserMarker>) -> Result<u64> {
        let result = query(
            "
            UPDATE notifications.notifications
            SET is_read = TRUE
            WHERE notifications.user_id = $1 AND NOT notifications.is_read
            ",
        )
        .bind(user_id.get())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn list_notifications(&self, user_id: Id<UserMarker>) -> Result<Vec<Notification>> {
        let records = query_as::<_, NotificationRecord>(&format!(
            "
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications.notifications
            WHERE notifications.user_id = $1
            ORDER BY notifications.notification_id DESC
            "
        ))
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await?;

        let notifications = records
            .into_iter()
            .map(Notification::try_from)
            .collect::<Result<_, _>>()?;
        Ok(notifications)
    }
}

async fn insert_notification<'e>(
    executor: impl PgExecutor<'e>,
    notification: &NewNotification,
) -> Result<Notification> {
    let record = query_as::<_, NotificationRecord>(&format!(
        "
        INSERT INTO notifications.notifications (user_id, message, kind)
        VALUES ($1, $2, $3)
        RETURNING {NOTIFICATION_COLUMNS}
        "
    ))
    .bind(notification.receiver_id.get())
    .bind(&notification.message)
    .bind(notification.kind.as_str())
    .fetch_one(executor)
    .await?;

    Ok(record.try_into()?)
}
