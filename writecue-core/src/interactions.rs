//! Likes and comments on posts.
//!
//! A like or comment is stored in one transaction with the notification for
//! the post's author, so neither exists without the other. The email follows
//! after the commit and may fail without affecting either.

use crate::{
    error::{Result, ServiceError, require_positive},
    notifier::{Notifier, post_comment_notice, post_like_notice},
    store::{Directory, InteractionStore},
};
use std::sync::Arc;
use tracing::instrument;
use writecue_common::model::{
    Id,
    comment::{Comment, CommentContent, CommentMarker, CommentSummary},
    like::Like,
    post::{Post, PostMarker, PostView},
    user::{User, UserMarker, UserSummary},
};

pub struct InteractionService {
    directory: Arc<dyn Directory>,
    store: Arc<dyn InteractionStore>,
    notifier: Arc<Notifier>,
}

impl InteractionService {
    #[must_use]
    pub fn new(
        directory: Arc<dyn Directory>,
        store: Arc<dyn InteractionStore>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            directory,
            store,
            notifier,
        }
    }

    /// Likes a post. Liking a post twice is a conflict; the like has to be
    /// removed first.
    #[instrument(skip(self))]
    pub async fn like_post(&self, user_id: Id<UserMarker>, post_id: Id<PostMarker>) -> Result<Like> {
        let user = self.user(user_id).await?;
        let post = self.post(post_id).await?;

        let notice = post_like_notice(&post, &user);
        let like = self
            .store
            .insert_like(
                user.id,
                post.id,
                notice.as_ref().map(|notice| &notice.notification),
            )
            .await?
            .ok_or_else(|| ServiceError::conflict("You have already liked this post"))?;

        if let Some(notice) = &notice {
            self.notifier.deliver(notice).await;
        }

        Ok(like)
    }

    #[instrument(skip(self))]
    pub async fn unlike_post(&self, user_id: Id<UserMarker>, post_id: Id<PostMarker>) -> Result<()> {
        let user = self.user(user_id).await?;
        let post = self.post(post_id).await?;

        if self.store.delete_like(user.id, post.id).await? {
            Ok(())
        } else {
            Err(ServiceError::bad_request("You have not liked this post"))
        }
    }

    #[instrument(skip(self))]
    pub async fn count_likes(&self, post_id: Id<PostMarker>) -> Result<u64> {
        let post_id = self.require_post(post_id).await?;

        Ok(self.store.count_likes(post_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_likers(&self, post_id: Id<PostMarker>) -> Result<Vec<UserSummary>> {
        let post_id = self.require_post(post_id).await?;

        Ok(self.store.list_likers(post_id).await?)
    }

    #[instrument(skip(self, content))]
    pub async fn create_comment(
        &self,
        content: String,
        user_id: Id<UserMarker>,
        post_id: Id<PostMarker>,
    ) -> Result<Comment> {
        let post_id = require_positive(post_id, "post")?;
        let user_id = require_positive(user_id, "user")?;
        let content = validate_content(content)?;

        let post = self.post(post_id).await?;
        let user = self.user(user_id).await?;

        let notice = post_comment_notice(&post, &user, content.get());
        let comment = self
            .store
            .insert_comment(
                user.id,
                post.id,
                &content,
                notice.as_ref().map(|notice| &notice.notification),
            )
            .await?;

        if let Some(notice) = &notice {
            self.notifier.deliver(notice).await;
        }

        Ok(comment)
    }

    /// Replaces a comment's content. Whoever calls this may edit any comment;
    /// authorship is not checked.
    #[instrument(skip(self, content))]
    pub async fn update_comment(
        &self,
        comment_id: Id<CommentMarker>,
        content: String,
    ) -> Result<Comment> {
        let comment_id = require_positive(comment_id, "comment")?;
        let content = validate_content(content)?;

        self.store
            .update_comment(comment_id, &content)
            .await?
            .ok_or_else(|| ServiceError::not_found("Comment", "id", comment_id))
    }

    #[instrument(skip(self))]
    pub async fn delete_comment(&self, comment_id: Id<CommentMarker>) -> Result<()> {
        let comment_id = require_positive(comment_id, "comment")?;

        if self.store.delete_comment(comment_id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("Comment", "id", comment_id))
        }
    }

    #[instrument(skip(self))]
    pub async fn get_comment(&self, comment_id: Id<CommentMarker>) -> Result<Comment> {
        let comment_id = require_positive(comment_id, "comment")?;

        self.store
            .fetch_comment(comment_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Comment", "id", comment_id))
    }

    #[instrument(skip(self))]
    pub async fn list_comments(&self, post_id: Id<PostMarker>) -> Result<Vec<CommentSummary>> {
        let post_id = self.require_post(post_id).await?;

        Ok(self.store.list_comments(post_id).await?)
    }

    /// A post with its like and comment counts as of now.
    #[instrument(skip(self))]
    pub async fn post_view(&self, post_id: Id<PostMarker>) -> Result<PostView> {
        let post = self.post(post_id).await?;
        let like_count = self.store.count_likes(post.id).await?;
        let comment_count = self.store.count_comments(post.id).await?;

        Ok(PostView {
            post,
            like_count,
            comment_count,
        })
    }

    #[instrument(skip(self))]
    pub async fn user_summary(&self, user_id: Id<UserMarker>) -> Result<UserSummary> {
        Ok(self.user(user_id).await?.into())
    }

    async fn user(&self, user_id: Id<UserMarker>) -> Result<User> {
        let user_id = require_positive(user_id, "user")?;

        self.directory
            .fetch_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", "id", user_id))
    }

    async fn post(&self, post_id: Id<PostMarker>) -> Result<Post> {
        let post_id = require_positive(post_id, "post")?;

        self.directory
            .fetch_post(post_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Post", "id", post_id))
    }

    async fn require_post(&self, post_id: Id<PostMarker>) -> Result<Id<PostMarker>> {
        let post_id = require_positive(post_id, "post")?;

        if self.directory.post_exists(post_id).await? {
            Ok(post_id)
        } else {
            Err(ServiceError::not_found("Post", "id", post_id))
        }
    }
}

fn validate_content(content: String) -> Result<CommentContent> {
    CommentContent::new(content).map_err(|err| ServiceError::bad_request(err.to_string()))
}

#[cfg(test)]
mod tests {
    use crate::{
        error::ServiceError,
        interactions::InteractionService,
        memory::{MemoryStore, RecordingGateway},
        notifier::{Notifier, post_comment_notice, post_like_notice},
    };
    use std::sync::Arc;
    use writecue_common::model::{
        Id,
        comment::COMMENT_CONTENT_MAX_LEN,
        notification::NotificationKind,
        post::Post,
        user::User,
    };

    struct Fixture {
        store: Arc<MemoryStore>,
        gateway: Arc<RecordingGateway>,
        service: InteractionService,
        ada: User,
        grace: User,
        post: Post,
    }

    fn fixture_with(store: MemoryStore, gateway: RecordingGateway) -> Fixture {
        let store = Arc::new(store);
        let gateway = Arc::new(gateway);
        let notifier = Arc::new(Notifier::new(store.clone(), store.clone(), gateway.clone()));
        let service = InteractionService::new(store.clone(), store.clone(), notifier);

        let ada = store.add_user("ada", "Ada Lovelace");
        let grace = store.add_user("grace", "Grace Hopper");
        let post = store.add_post(&ada, Some("Hello"));

        Fixture {
            store,
            gateway,
            service,
            ada,
            grace,
            post,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MemoryStore::default(), RecordingGateway::default())
    }

    #[tokio::test]
    async fn like_unlike_scenario() {
        let Fixture {
            store,
            service,
            ada,
            grace,
            post,
            ..
        } = fixture();

        service.like_post(grace.id, post.id).await.unwrap();
        assert_eq!(service.count_likes(post.id).await.unwrap(), 1);

        let notifications = store.all_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].receiver_id, ada.id);
        assert_eq!(notifications[0].kind, NotificationKind::Like);
        assert!(notifications[0].message.contains("Grace Hopper"));
        assert!(notifications[0].message.contains("Hello"));
        assert!(!notifications[0].read);

        assert!(matches!(
            service.like_post(grace.id, post.id).await,
            Err(ServiceError::Conflict(_))
        ));

        service.unlike_post(grace.id, post.id).await.unwrap();
        assert_eq!(service.count_likes(post.id).await.unwrap(), 0);
        assert_eq!(store.all_notifications().len(), 1);

        service.like_post(ada.id, post.id).await.unwrap();
        assert_eq!(service.count_likes(post.id).await.unwrap(), 1);
        assert_eq!(store.all_notifications().len(), 1);
    }

    #[tokio::test]
    async fn unlike_without_like_is_bad_request() {
        let Fixture {
            service,
            grace,
            post,
            ..
        } = fixture();

        assert!(matches!(
            service.unlike_post(grace.id, post.id).await,
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn like_count_tracks_distinct_likers() {
        let Fixture {
            store,
            service,
            post,
            ..
        } = fixture();
        let likers: Vec<_> = (0..5)
            .map(|n| store.add_user(&format!("reader{n}"), &format!("Reader {n}")))
            .collect();

        for liker in &likers {
            service.like_post(liker.id, post.id).await.unwrap();
        }
        assert_eq!(service.count_likes(post.id).await.unwrap(), 5);

        service.unlike_post(likers[2].id, post.id).await.unwrap();
        assert_eq!(service.count_likes(post.id).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn likers_are_listed_in_like_order_without_private_fields() {
        let Fixture {
            service,
            ada,
            grace,
            post,
            ..
        } = fixture();

        service.like_post(grace.id, post.id).await.unwrap();
        service.like_post(ada.id, post.id).await.unwrap();

        let likers = service.list_likers(post.id).await.unwrap();
        assert_eq!(likers, vec![grace.summary(), ada.summary()]);
    }

    #[tokio::test]
    async fn missing_entities_are_not_found() {
        let Fixture {
            service,
            grace,
            post,
            ..
        } = fixture();

        assert!(matches!(
            service.like_post(Id::new(404), post.id).await,
            Err(ServiceError::NotFound { entity: "User", .. })
        ));
        assert!(matches!(
            service.like_post(grace.id, Id::new(404)).await,
            Err(ServiceError::NotFound { entity: "Post", .. })
        ));
        assert!(matches!(
            service.count_likes(Id::new(404)).await,
            Err(ServiceError::NotFound { entity: "Post", .. })
        ));
        assert!(matches!(
            service.list_comments(Id::new(404)).await,
            Err(ServiceError::NotFound { entity: "Post", .. })
        ));
        assert!(matches!(
            service.get_comment(Id::new(404)).await,
            Err(ServiceError::NotFound { entity: "Comment", .. })
        ));
    }

    #[tokio::test]
    async fn non_positive_ids_are_bad_requests() {
        let Fixture {
            service, grace, ..
        } = fixture();

        assert!(matches!(
            service.like_post(grace.id, Id::new(0)).await,
            Err(ServiceError::BadRequest(_))
        ));
        assert!(matches!(
            service
                .create_comment("hi".to_owned(), Id::new(-1), Id::new(1))
                .await,
            Err(ServiceError::BadRequest(_))
        ));
        assert!(matches!(
            service.delete_comment(Id::new(0)).await,
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn comment_on_foreign_post_notifies_once() {
        let Fixture {
            store,
            gateway,
            service,
            ada,
            grace,
            post,
        } = fixture();

        let comment = service
            .create_comment("Great read".to_owned(), grace.id, post.id)
            .await
            .unwrap();
        assert_eq!(comment.user_id, grace.id);
        assert_eq!(comment.post_id, post.id);
        assert_eq!(comment.content.get(), "Great read");

        let notifications = store.all_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].receiver_id, ada.id);
        assert_eq!(notifications[0].kind, NotificationKind::Comment);
        assert_eq!(gateway.sent()[0].variables["commentExcerpt"], "Great read");
    }

    #[tokio::test]
    async fn own_comment_is_silent() {
        let Fixture {
            store,
            service,
            ada,
            post,
            ..
        } = fixture();

        service
            .create_comment("Author here".to_owned(), ada.id, post.id)
            .await
            .unwrap();

        assert!(store.all_notifications().is_empty());
    }

    #[tokio::test]
    async fn comment_content_is_validated() {
        let Fixture {
            service,
            grace,
            post,
            ..
        } = fixture();

        assert!(matches!(
            service
                .create_comment("   ".to_owned(), grace.id, post.id)
                .await,
            Err(ServiceError::BadRequest(_))
        ));
        assert!(matches!(
            service
                .create_comment("x".repeat(COMMENT_CONTENT_MAX_LEN + 1), grace.id, post.id)
                .await,
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn comments_allow_repeats_and_full_lifecycle() {
        let Fixture {
            service,
            grace,
            post,
            ..
        } = fixture();

        let first = service
            .create_comment("one".to_owned(), grace.id, post.id)
            .await
            .unwrap();
        service
            .create_comment("two".to_owned(), grace.id, post.id)
            .await
            .unwrap();

        let updated = service
            .update_comment(first.id, "one, edited".to_owned())
            .await
            .unwrap();
        assert_eq!(updated.content.get(), "one, edited");
        assert_eq!(updated.created_at, first.created_at);
        assert_eq!(
            service.get_comment(first.id).await.unwrap().content.get(),
            "one, edited"
        );

        let listed = service.list_comments(post.id).await.unwrap();
        let contents: Vec<_> = listed.iter().map(|c| c.content.get()).collect();
        assert_eq!(contents, ["one, edited", "two"]);
        assert!(listed.iter().all(|c| c.display_name == "Grace Hopper"));

        service.delete_comment(first.id).await.unwrap();
        assert!(matches!(
            service.delete_comment(first.id).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            service.update_comment(first.id, "gone".to_owned()).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert_eq!(service.list_comments(post.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_rejects_blank_content() {
        let Fixture {
            service,
            grace,
            post,
            ..
        } = fixture();
        let comment = service
            .create_comment("one".to_owned(), grace.id, post.id)
            .await
            .unwrap();

        assert!(matches!(
            service.update_comment(comment.id, String::new()).await,
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn email_failure_does_not_fail_interactions() {
        let Fixture {
            store,
            service,
            grace,
            post,
            ..
        } = fixture_with(MemoryStore::default(), RecordingGateway::failing());

        service.like_post(grace.id, post.id).await.unwrap();
        service
            .create_comment("still here".to_owned(), grace.id, post.id)
            .await
            .unwrap();

        assert_eq!(service.count_likes(post.id).await.unwrap(), 1);
        assert_eq!(store.all_notifications().len(), 2);
    }

    #[tokio::test]
    async fn failed_notification_write_rolls_back_like() {
        let Fixture {
            store,
            gateway,
            service,
            grace,
            post,
            ..
        } = fixture_with(MemoryStore::refusing_notifications(), RecordingGateway::default());

        assert!(matches!(
            service.like_post(grace.id, post.id).await,
            Err(ServiceError::Store(_))
        ));

        assert_eq!(service.count_likes(post.id).await.unwrap(), 0);
        assert!(store.all_notifications().is_empty());
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn failed_notification_write_rolls_back_comment() {
        let Fixture {
            store,
            gateway,
            service,
            grace,
            post,
            ..
        } = fixture_with(MemoryStore::refusing_notifications(), RecordingGateway::default());

        assert!(matches!(
            service
                .create_comment("Great read".to_owned(), grace.id, post.id)
                .await,
            Err(ServiceError::Store(_))
        ));

        assert!(service.list_comments(post.id).await.unwrap().is_empty());
        assert!(store.all_notifications().is_empty());
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn own_interactions_write_no_notification() {
        let Fixture {
            service, ada, post, ..
        } = fixture_with(MemoryStore::refusing_notifications(), RecordingGateway::default());

        service.like_post(ada.id, post.id).await.unwrap();
        service
            .create_comment("Author here".to_owned(), ada.id, post.id)
            .await
            .unwrap();

        assert_eq!(service.count_likes(post.id).await.unwrap(), 1);
        assert_eq!(service.list_comments(post.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn post_view_counts_at_read_time() {
        let Fixture {
            service,
            ada,
            grace,
            post,
            ..
        } = fixture();

        service.like_post(grace.id, post.id).await.unwrap();
        service.like_post(ada.id, post.id).await.unwrap();
        service
            .create_comment("hi".to_owned(), grace.id, post.id)
            .await
            .unwrap();

        let view = service.post_view(post.id).await.unwrap();
        assert_eq!(view.post, post);
        assert_eq!(view.like_count, 2);
        assert_eq!(view.comment_count, 1);
    }

    #[tokio::test]
    async fn concurrent_duplicate_likes_yield_one_like() {
        let Fixture {
            service,
            grace,
            post,
            ..
        } = fixture();
        let service = Arc::new(service);
        let (user_id, post_id) = (grace.id, post.id);

        let mut attempts = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            attempts.push(tokio::spawn(async move {
                service.like_post(user_id, post_id).await
            }));
        }

        let mut successes = 0;
        let mut conflicts = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => successes += 1,
                Err(ServiceError::Conflict(_)) => conflicts += 1,
                Err(err) => panic!("unexpected error: {err}"),
            }
        }

        assert_eq!((successes, conflicts), (1, 7));
        assert_eq!(service.count_likes(post.id).await.unwrap(), 1);
    }
}
