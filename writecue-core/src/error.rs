use std::fmt::Display;
use thiserror::Error;
use writecue_common::model::{Id, ModelValidationError};

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

/// Failure of a storage adapter, independent of the backend behind it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("An object in storage was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("Storage backend failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::Backend(Box::new(err))
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} not found with {field}: '{value}'")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl Display) -> Self {
        ServiceError::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ServiceError::BadRequest(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict(message.into())
    }
}

/// Rejects caller-supplied ids that storage could never have handed out.
pub(crate) fn require_positive<Marker: Copy>(id: Id<Marker>, entity: &str) -> Result<Id<Marker>> {
    if id.is_positive() {
        Ok(id)
    } else {
        Err(ServiceError::bad_request(format!("Invalid {entity} ID")))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{ServiceError, require_positive};
    use writecue_common::model::{Id, post::PostMarker};

    #[test]
    fn not_found_message_names_lookup() {
        let err = ServiceError::not_found("Post", "id", 10);

        assert_eq!(err.to_string(), "Post not found with id: '10'");
    }

    #[test]
    fn non_positive_ids_are_bad_requests() {
        assert!(require_positive(Id::<PostMarker>::new(3), "post").is_ok());

        let err = require_positive(Id::<PostMarker>::new(0), "post").unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(ref msg) if msg == "Invalid post ID"));
    }
}
