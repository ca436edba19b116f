//! Outbound email requests.
//!
//! Rendering and transport live behind [`MessagingGateway`]; the engine only
//! names a template and fills in its variables.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct TemplatedEmail {
    pub to: String,
    pub subject: String,
    pub template: String,
    pub variables: BTreeMap<String, String>,
}

impl TemplatedEmail {
    #[must_use]
    pub fn new(to: &str, subject: &str, template: &str) -> Self {
        Self {
            to: to.to_owned(),
            subject: subject.to_owned(),
            template: template.to_owned(),
            variables: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_variable(mut self, name: &str, value: impl Into<String>) -> Self {
        self.variables.insert(name.to_owned(), value.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Email recipient is missing")]
    MissingRecipient,
    #[error("Email relay rejected the request with status {0}")]
    Rejected(u16),
    #[error("Email transport failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send_templated_email(&self, email: &TemplatedEmail) -> Result<(), GatewayError>;
}

/// Gateway that only records the request in the trace output.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct TracingGateway;

#[async_trait]
impl MessagingGateway for TracingGateway {
    async fn send_templated_email(&self, email: &TemplatedEmail) -> Result<(), GatewayError> {
        if email.to.trim().is_empty() {
            return Err(GatewayError::MissingRecipient);
        }

        info!(
            to = %email.to,
            subject = %email.subject,
            template = %email.template,
            variables = ?email.variables,
            "Email requested"
        );

        Ok(())
    }
}
