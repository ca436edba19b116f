//! JSON bodies in and out of handlers, with failures reported as [`ServerError`].

use crate::server::ServerError;
use axum::{
    Json as AxumJson,
    extract::FromRequest,
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use headers::ContentType;
use serde::Serialize;

/// Request extractor and `200 OK` responder.
///
/// Malformed request bodies become [`ServerError::JsonRejection`], so they get
/// the same error body as every other failure.
#[derive(FromRequest, Debug, Clone, Copy, Default)]
#[from_request(via(AxumJson), rejection(ServerError))]
pub struct Json<T>(pub T);

/// `201 Created` with a `Location` header pointing at the new resource.
#[derive(Debug, Clone, Default)]
pub struct Created<T> {
    pub location: String,
    pub body: T,
}

fn json_response(status: StatusCode, body: &impl Serialize) -> Response {
    match serde_json::to_vec(body) {
        Ok(json) => (status, TypedHeader(ContentType::json()), json).into_response(),
        Err(err) => ServerError::JsonResponse(err).into_response(),
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        json_response(StatusCode::OK, &self.0)
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        let mut response = json_response(StatusCode::CREATED, &self.body);
        if response.status() == StatusCode::CREATED {
            match self.location.parse() {
                Ok(location) => {
                    response.headers_mut().insert(LOCATION, location);
                }
                Err(_) => return ServerError::InvalidLocation(self.location).into_response(),
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use crate::server::json::{Created, Json};
    use axum::{
        body::to_bytes,
        http::{StatusCode, header},
        response::{IntoResponse, Response},
    };
    use serde::{Serialize, Serializer};
    use serde_json::{Value, json};

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("no json form"))
        }
    }

    async fn body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn json_is_ok_with_content_type() {
        let response = Json(json!({ "updated": 2 })).into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body(response).await, json!({ "updated": 2 }));
    }

    #[tokio::test]
    async fn created_carries_location() {
        let response = Created {
            location: "/comments/7".to_owned(),
            body: json!({ "id": 7 }),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "/comments/7");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body(response).await, json!({ "id": 7 }));
    }

    #[tokio::test]
    async fn created_with_invalid_location_is_server_error() {
        let response = Created {
            location: "/comments/\n7".to_owned(),
            body: json!({ "id": 7 }),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    #[tokio::test]
    async fn unserializable_body_is_server_error() {
        let response = Created {
            location: "/comments/7".to_owned(),
            body: Unserializable,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(response).await["message"], "Internal server error");
    }
}
