use crate::model::{Id, user::User};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const UNTITLED: &str = "Untitled";

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Id<PostMarker>,
    pub title: Option<String>,
    pub content: String,
    pub author: User,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A post together with its interaction counts, which are always counted at
/// read time.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub like_count: u64,
    pub comment_count: u64,
}

/// The title used in notification texts: the post's own title, or
/// [`UNTITLED`] when it has none or only whitespace.
#[must_use]
pub fn resolve_title(post: &Post) -> &str {
    match post.title.as_deref() {
        Some(title) if !title.trim().is_empty() => title,
        _ => UNTITLED,
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{
        post::{Post, UNTITLED, resolve_title},
        user::{User, Username},
    };
    use rstest::rstest;
    use time::macros::datetime;

    fn post_titled(title: Option<&str>) -> Post {
        let author = User {
            id: 1.into(),
            username: Username::new("ada".to_owned()).unwrap(),
            email: "ada@example.com".to_owned(),
            display_name: "Ada".to_owned(),
            bio: None,
            created_at: datetime!(2025-01-01 00:00 UTC),
        };

        Post {
            id: 10.into(),
            title: title.map(str::to_owned),
            content: "body".to_owned(),
            author,
            created_at: datetime!(2025-01-02 00:00 UTC),
            updated_at: datetime!(2025-01-02 00:00 UTC),
        }
    }

    #[rstest]
    #[case(Some("Hello"), "Hello")]
    #[case(None, UNTITLED)]
    #[case(Some(""), UNTITLED)]
    #[case(Some("  \t"), UNTITLED)]
    fn title_resolution(#[case] title: Option<&str>, #[case] expected: &str) {
        assert_eq!(resolve_title(&post_titled(title)), expected);
    }
}
