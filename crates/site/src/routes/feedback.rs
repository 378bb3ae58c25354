//! Footer feedback form handler.

use axum::{Form, extract::State, response::Redirect};
use serde::Deserialize;
use tracing::instrument;

use crate::notice::{self, NoticeKind};
use crate::services::{FeedbackError, FeedbackForm, InvalidFeedback, feedback::relay};
use crate::state::AppState;

/// Feedback fields plus the page to return to.
#[derive(Debug, Deserialize)]
pub struct FeedbackPost {
    #[serde(flatten)]
    pub form: FeedbackForm,
    #[serde(default)]
    pub return_to: Option<String>,
}

/// Relay a feedback message and return to the page it was sent from.
#[instrument(skip_all)]
pub async fn submit(State(state): State<AppState>, Form(post): Form<FeedbackPost>) -> Redirect {
    let return_to = notice::local_path(post.return_to.as_deref());
    let kind = match relay(state.feedback(), &post.form).await {
        Ok(()) => NoticeKind::FeedbackSent,
        Err(e) => notice_for(&e),
    };
    notice::redirect(&return_to, kind)
}

const fn notice_for(error: &FeedbackError) -> NoticeKind {
    match error {
        FeedbackError::Validation(InvalidFeedback::MissingFields) => NoticeKind::FeedbackMissingFields,
        FeedbackError::Validation(InvalidFeedback::InvalidEmail) => NoticeKind::FeedbackInvalidEmail,
        FeedbackError::Rejected(_) => NoticeKind::FeedbackRejected,
        FeedbackError::Network(_) => NoticeKind::FeedbackNetwork,
        FeedbackError::Disabled => NoticeKind::FeedbackUnavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_have_distinct_notices() {
        assert_eq!(
            notice_for(&FeedbackError::Validation(InvalidFeedback::MissingFields)),
            NoticeKind::FeedbackMissingFields
        );
        assert_eq!(
            notice_for(&FeedbackError::Validation(InvalidFeedback::InvalidEmail)),
            NoticeKind::FeedbackInvalidEmail
        );
        assert_eq!(notice_for(&FeedbackError::Disabled), NoticeKind::FeedbackUnavailable);
    }
}
