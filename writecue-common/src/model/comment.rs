use crate::model::{Id, post::PostMarker, user::UserMarker};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use thiserror::Error;
use time::OffsetDateTime;

pub const COMMENT_CONTENT_MAX_LEN: usize = 1000;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Id<CommentMarker>,
    pub user_id: Id<UserMarker>,
    pub post_id: Id<PostMarker>,
    pub content: CommentContent,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// How a comment appears in the listing under a post.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSummary {
    pub display_name: String,
    pub content: CommentContent,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Comment text: not blank, at most [`COMMENT_CONTENT_MAX_LEN`] characters.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct CommentContent(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum InvalidCommentContentError {
    #[error("Comment content cannot be empty")]
    Blank,
    #[error("Comment content cannot exceed {COMMENT_CONTENT_MAX_LEN} characters, got {0}")]
    TooLong(usize),
}

impl CommentContent {
    pub fn new(content: String) -> Result<Self, InvalidCommentContentError> {
        if content.trim().is_empty() {
            return Err(InvalidCommentContentError::Blank);
        }

        let len = content.chars().count();
        if len > COMMENT_CONTENT_MAX_LEN {
            return Err(InvalidCommentContentError::TooLong(len));
        }

        Ok(Self(content))
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for CommentContent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        CommentContent::new(inner.clone())
            .map_err(|_| Error::invalid_value(Unexpected::Str(&inner), &"CommentContent"))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::comment::{
        COMMENT_CONTENT_MAX_LEN, CommentContent, InvalidCommentContentError,
    };

    #[test]
    fn content_bounds() {
        assert!(CommentContent::new("Nice post".to_owned()).is_ok());
        assert!(CommentContent::new("x".repeat(COMMENT_CONTENT_MAX_LEN)).is_ok());
        assert_eq!(
            CommentContent::new("x".repeat(COMMENT_CONTENT_MAX_LEN + 1)),
            Err(InvalidCommentContentError::TooLong(COMMENT_CONTENT_MAX_LEN + 1))
        );
        assert_eq!(
            CommentContent::new(" \n ".to_owned()),
            Err(InvalidCommentContentError::Blank)
        );
    }

    #[test]
    fn length_counts_characters() {
        assert!(CommentContent::new("é".repeat(COMMENT_CONTENT_MAX_LEN)).is_ok());
    }
}
