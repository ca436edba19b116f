use crate::model::{Id, user::UserMarker};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct NotificationMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Comment,
    Like,
    Follow,
    Registration,
    PasswordChange,
    ProfileUpdate,
}

impl NotificationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Comment => "COMMENT",
            NotificationKind::Like => "LIKE",
            NotificationKind::Follow => "FOLLOW",
            NotificationKind::Registration => "REGISTRATION",
            NotificationKind::PasswordChange => "PASSWORD_CHANGE",
            NotificationKind::ProfileUpdate => "PROFILE_UPDATE",
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("Unknown notification type: {0}")]
pub struct UnknownNotificationKindError(String);

impl FromStr for NotificationKind {
    type Err = UnknownNotificationKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COMMENT" => Ok(NotificationKind::Comment),
            "LIKE" => Ok(NotificationKind::Like),
            "FOLLOW" => Ok(NotificationKind::Follow),
            "REGISTRATION" => Ok(NotificationKind::Registration),
            "PASSWORD_CHANGE" => Ok(NotificationKind::PasswordChange),
            "PROFILE_UPDATE" => Ok(NotificationKind::ProfileUpdate),
            other => Err(UnknownNotificationKindError(other.to_owned())),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Id<NotificationMarker>,
    pub receiver_id: Id<UserMarker>,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(rename = "isRead")]
    pub read: bool,
}

/// A notification about to be recorded. It always starts unread.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct NewNotification {
    pub receiver_id: Id<UserMarker>,
    pub message: String,
    pub kind: NotificationKind,
}

#[cfg(test)]
mod tests {
    use crate::model::notification::NotificationKind;

    #[test]
    fn kind_string_forms_agree() {
        let kinds = [
            NotificationKind::Comment,
            NotificationKind::Like,
            NotificationKind::Follow,
            NotificationKind::Registration,
            NotificationKind::PasswordChange,
            NotificationKind::ProfileUpdate,
        ];

        for kind in kinds {
            assert_eq!(kind.as_str().parse::<NotificationKind>(), Ok(kind));
            assert_eq!(
                serde_json::to_string(&kind).unwrap(),
                format!("\"{}\"", kind.as_str())
            );
        }

        assert!("SHARE".parse::<NotificationKind>().is_err());
    }
}
