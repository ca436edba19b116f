//! Delivery of templated emails through an HTTP mail relay.

use async_trait::async_trait;
use serde::Serialize;
use std::{collections::BTreeMap, time::Duration};
use tracing::debug;
use writecue_core::gateway::{GatewayError, MessagingGateway, TemplatedEmail};

const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest<'a> {
    from: &'a str,
    from_name: &'a str,
    to: &'a str,
    subject: &'a str,
    template: &'a str,
    variables: &'a BTreeMap<String, String>,
}

/// Posts every email as JSON to a relay endpoint, which renders the template
/// and hands the result to an SMTP server.
#[derive(Clone, Debug)]
pub struct HttpRelayGateway {
    client: reqwest::Client,
    endpoint: String,
    sender: String,
    sender_name: String,
}

impl HttpRelayGateway {
    pub fn new(endpoint: String, sender: String, sender_name: String) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(RELAY_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint,
            sender,
            sender_name,
        })
    }
}

#[async_trait]
impl MessagingGateway for HttpRelayGateway {
    async fn send_templated_email(&self, email: &TemplatedEmail) -> Result<(), GatewayError> {
        if email.to.trim().is_empty() {
            return Err(GatewayError::MissingRecipient);
        }

        let request = RelayRequest {
            from: &self.sender,
            from_name: &self.sender_name,
            to: &email.to,
            subject: &email.subject,
            template: &email.template,
            variables: &email.variables,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(Box::new(err)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Rejected(status.as_u16()));
        }

        debug!(to = %email.to, template = %email.template, "Relay accepted email");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::mail::HttpRelayGateway;
    use axum::{Router, extract::State, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use writecue_core::gateway::{GatewayError, MessagingGateway, TemplatedEmail};

    type Received = Arc<Mutex<Vec<Value>>>;

    async fn record(State(received): State<Received>, axum::Json(body): axum::Json<Value>) {
        received.lock().unwrap().push(body);
    }

    async fn refuse() -> StatusCode {
        StatusCode::SERVICE_UNAVAILABLE
    }

    async fn spawn_relay(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

        format!("http://{address}/send")
    }

    fn gateway(endpoint: String) -> HttpRelayGateway {
        HttpRelayGateway::new(
            endpoint,
            "noreply@writecue.com".to_owned(),
            "WriteCue".to_owned(),
        )
        .unwrap()
    }

    fn like_email() -> TemplatedEmail {
        TemplatedEmail::new(
            "ada@example.com",
            "New Like on Your Post - WriteCue",
            "like-notification.html",
        )
        .with_variable("likerName", "Grace")
        .with_variable("postTitle", "Hello")
    }

    #[tokio::test]
    async fn relay_receives_sender_and_template() {
        let received = Received::default();
        let router = Router::new()
            .route("/send", post(record))
            .with_state(received.clone());
        let endpoint = spawn_relay(router).await;

        gateway(endpoint)
            .send_templated_email(&like_email())
            .await
            .unwrap();

        let received = received.lock().unwrap();
        assert_eq!(
            received.as_slice(),
            [json!({
                "from": "noreply@writecue.com",
                "fromName": "WriteCue",
                "to": "ada@example.com",
                "subject": "New Like on Your Post - WriteCue",
                "template": "like-notification.html",
                "variables": { "likerName": "Grace", "postTitle": "Hello" },
            })]
        );
    }

    #[tokio::test]
    async fn relay_refusal_reports_status() {
        let endpoint = spawn_relay(Router::new().route("/send", post(refuse))).await;

        let result = gateway(endpoint).send_templated_email(&like_email()).await;

        assert!(matches!(result, Err(GatewayError::Rejected(503))));
    }

    #[tokio::test]
    async fn blank_recipient_is_not_sent() {
        let email = TemplatedEmail::new(" ", "Welcome", "registration.html");

        let result = gateway("http://127.0.0.1:9/send".to_owned())
            .send_templated_email(&email)
            .await;

        assert!(matches!(result, Err(GatewayError::MissingRecipient)));
    }
}
