pub mod comment;
pub mod like;
pub mod notification;
pub mod post;
pub mod user;

use crate::model::{
    comment::InvalidCommentContentError, notification::UnknownNotificationKindError,
    user::InvalidUsernameError,
};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, marker::PhantomData};
use thiserror::Error;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum ModelValidationError {
    #[error(transparent)]
    Username(#[from] InvalidUsernameError),
    #[error(transparent)]
    CommentContent(#[from] InvalidCommentContentError),
    #[error(transparent)]
    NotificationKind(#[from] UnknownNotificationKindError),
}

/// Storage-allocated identifier, typed by the entity it refers to.
///
/// Ids handed out by storage are always positive. Ids coming from callers are
/// not checked on construction; use [`Id::is_positive`] before trusting them.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Id<Marker>(i64, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value, PhantomData)
    }

    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> From<i64> for Id<Marker> {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl<Marker> From<Id<Marker>> for i64 {
    fn from(value: Id<Marker>) -> Self {
        value.get()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Id, user::UserMarker};

    #[test]
    fn id_positivity() {
        assert!(Id::<UserMarker>::new(1).is_positive());
        assert!(!Id::<UserMarker>::new(0).is_positive());
        assert!(!Id::<UserMarker>::new(-7).is_positive());
    }

    #[test]
    fn id_is_transparent_in_json() {
        let id = Id::<UserMarker>::new(42);

        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        assert_eq!(serde_json::from_str::<Id<UserMarker>>("42").unwrap(), id);
    }
}
