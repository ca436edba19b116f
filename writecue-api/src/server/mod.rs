use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use json::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;
use writecue_core::{
    error::ServiceError,
    gateway::MessagingGateway,
    interactions::InteractionService,
    notifier::Notifier,
    store::{Directory, InteractionStore, NotificationStore},
};

mod json;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, FromRef)]
pub struct ServerState {
    pub interactions: Arc<InteractionService>,
    pub notifier: Arc<Notifier>,
}

impl ServerState {
    /// Wires the services to one store that backs every port.
    pub fn new<S>(store: Arc<S>, gateway: Arc<dyn MessagingGateway>) -> Self
    where
        S: Directory + InteractionStore + NotificationStore + 'static,
    {
        let notifier = Arc::new(Notifier::new(store.clone(), store.clone(), gateway));
        let interactions = Arc::new(InteractionService::new(
            store.clone(),
            store,
            notifier.clone(),
        ));

        Self {
            interactions,
            notifier,
        }
    }
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Location is not a valid header value: {0:?}")]
    InvalidLocation(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::Service(ServiceError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ServerError::JsonRejection(_) | ServerError::Service(ServiceError::BadRequest(_)) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::Service(ServiceError::Conflict(_)) => StatusCode::CONFLICT,
            ServerError::JsonResponse(_)
            | ServerError::InvalidLocation(_)
            | ServerError::Service(ServiceError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What the client gets to read. Internal failures stay in the logs.
    fn public_message(&self, status: StatusCode) -> String {
        if status.is_server_error() {
            "Internal server error".to_owned()
        } else {
            self.to_string()
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
struct ErrorResponse {
    status: u16,
    error: String,
    message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or_default().to_owned(),
            message: self.public_message(status),
        };
        (status, Json(error_response)).into_response()
    }
}
