//! Feedback relay client.
//!
//! The footer form is forwarded to a third-party form relay as JSON
//! `{access_key, name, email, message}`; the relay answers `{success, message}`.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use safe_disposal_core::Email;

use crate::config::FeedbackConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a feedback form was refused before sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidFeedback {
    /// Name, email, or message is blank.
    MissingFields,
    /// The email address does not parse.
    InvalidEmail,
}

/// Errors that can occur when submitting feedback.
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// The form failed validation; nothing was sent.
    #[error("invalid feedback form: {0:?}")]
    Validation(InvalidFeedback),

    /// The relay answered but did not accept the submission.
    #[error("relay rejected submission: {0}")]
    Rejected(String),

    /// The relay could not be reached.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// No relay is configured.
    #[error("feedback relay is not configured")]
    Disabled,
}

/// Footer form fields as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// A form that passed validation.
#[derive(Debug, Clone)]
pub struct ValidFeedback {
    name: String,
    email: Email,
    message: String,
}

impl FeedbackForm {
    /// Check that every field is filled in and the email parses.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::Validation` describing the first problem.
    pub fn validate(&self) -> Result<ValidFeedback, FeedbackError> {
        let name = self.name.trim();
        let message = self.message.trim();
        if name.is_empty() || self.email.trim().is_empty() || message.is_empty() {
            return Err(FeedbackError::Validation(InvalidFeedback::MissingFields));
        }
        let email = Email::parse(&self.email)
            .map_err(|_| FeedbackError::Validation(InvalidFeedback::InvalidEmail))?;

        Ok(ValidFeedback {
            name: name.to_string(),
            email,
            message: message.to_string(),
        })
    }
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    access_key: &'a str,
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the form relay.
#[derive(Clone)]
pub struct FeedbackClient {
    client: reqwest::Client,
    endpoint: Url,
    access_key: SecretString,
}

impl FeedbackClient {
    /// Create a new relay client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &FeedbackConfig) -> Result<Self, FeedbackError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            access_key: config.access_key.clone(),
        })
    }

    /// Forward a validated submission.
    ///
    /// # Errors
    ///
    /// `Rejected` on a non-2xx status or `success: false`; `Network` if the
    /// relay cannot be reached.
    #[tracing::instrument(skip(self, feedback), fields(email_domain = feedback.email.domain()))]
    pub async fn submit(&self, feedback: &ValidFeedback) -> Result<(), FeedbackError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&RelayRequest {
                access_key: self.access_key.expose_secret(),
                name: &feedback.name,
                email: feedback.email.as_str(),
                message: &feedback.message,
            })
            .send()
            .await?;

        let status = response.status();
        let body: Option<RelayResponse> = response.json().await.ok();
        match body {
            Some(RelayResponse { success: true, .. }) if status.is_success() => Ok(()),
            Some(RelayResponse { message, .. }) => Err(FeedbackError::Rejected(
                message.unwrap_or_else(|| status.to_string()),
            )),
            None => Err(FeedbackError::Rejected(status.to_string())),
        }
    }
}

/// Validate `form` and send it through `client`.
///
/// Validation runs first, so a blank form is reported even when the relay is
/// not configured.
///
/// # Errors
///
/// `Validation`, `Disabled` when `client` is `None`, or any error from
/// [`FeedbackClient::submit`].
pub async fn relay(client: Option<&FeedbackClient>, form: &FeedbackForm) -> Result<(), FeedbackError> {
    let feedback = form.validate()?;
    let client = client.ok_or(FeedbackError::Disabled)?;
    client.submit(&feedback).await?;
    tracing::info!("Feedback submitted");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, message: &str) -> FeedbackForm {
        FeedbackForm {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_blank_fields_are_missing() {
        for f in [
            form("", "a@b.org", "hi"),
            form("Ann", "  ", "hi"),
            form("Ann", "a@b.org", "\n\t"),
        ] {
            assert!(matches!(
                f.validate(),
                Err(FeedbackError::Validation(InvalidFeedback::MissingFields))
            ));
        }
    }

    #[test]
    fn test_bad_email_is_invalid() {
        assert!(matches!(
            form("Ann", "not-an-email", "hi").validate(),
            Err(FeedbackError::Validation(InvalidFeedback::InvalidEmail))
        ));
    }

    #[test]
    fn test_valid_form_is_trimmed() {
        let valid = form("  Ann ", "Ann@Example.org", " Thanks! ").validate().unwrap();
        assert_eq!(valid.name, "Ann");
        assert_eq!(valid.email.as_str(), "ann@example.org");
        assert_eq!(valid.message, "Thanks!");
    }

    #[test]
    fn test_request_shape() {
        let json = serde_json::to_value(RelayRequest {
            access_key: "k",
            name: "n",
            email: "e@x.org",
            message: "m",
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"access_key": "k", "name": "n", "email": "e@x.org", "message": "m"})
        );
    }

    #[tokio::test]
    async fn test_relay_validates_before_checking_config() {
        let err = relay(None, &form("", "", "")).await.unwrap_err();
        assert!(matches!(err, FeedbackError::Validation(_)));

        let err = relay(None, &form("Ann", "a@b.org", "hello")).await.unwrap_err();
        assert!(matches!(err, FeedbackError::Disabled));
    }
}
