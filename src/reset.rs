//! Password-reset request from the adventurer login page.
//!
//! The site posts `{"email": ...}` as JSON to [`RESET_ENDPOINT`] and gets back
//! `{"success": bool, "message"?: string}`. This module owns the form side of
//! that exchange: input validation, the single-flight `submitting` flag, and
//! the mapping from outcome to the notice shown to the user. Sending is behind
//! [`ResetTransport`]; the crate ships no HTTP client.
//!
//! There is no retry. A failed request leaves the modal open so the user can
//! submit again.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const RESET_ENDPOINT: &str = "/area-aventureiro/forgot-password/";

pub const MSG_EMAIL_REQUIRED: &str = "Por favor, digite seu e-mail.";
pub const MSG_SENT: &str = "Instruções de recuperação enviadas para seu e-mail!";
pub const MSG_FAILED: &str = "Erro ao enviar instruções. Tente novamente.";

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Failed(String),
    #[error("Invalid response body: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResetResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl ResetResponse {
    pub fn from_json(body: &str) -> Result<Self, TransportError> {
        Ok(serde_json::from_str(body)?)
    }
}

/// Sends a reset request to the server.
pub trait ResetTransport {
    fn send(&self, endpoint: &str, request: &ResetRequest)
    -> Result<ResetResponse, TransportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoticeKind {
    Success,
    Error,
}

/// Toast shown on the login page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn success(text: &str) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.to_string(),
        }
    }

    fn error(text: &str) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.to_string(),
        }
    }
}

/// Outcome of pressing the submit button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Validation failed; nothing is sent.
    Rejected(Notice),
    /// A request is already in flight.
    Busy,
    /// Send this, then call [`ResetForm::finish`].
    Send(ResetRequest),
}

/// State of the "forgot password" modal.
#[derive(Debug, Clone, Default)]
pub struct ResetForm {
    open: bool,
    submitting: bool,
}

impl ResetForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// True while the submit button is disabled.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn submit(&mut self, email: &str) -> Submission {
        if self.submitting {
            return Submission::Busy;
        }
        if email.trim().is_empty() {
            return Submission::Rejected(Notice::error(MSG_EMAIL_REQUIRED));
        }
        self.submitting = true;
        debug!(email, "password reset requested");
        Submission::Send(ResetRequest {
            email: email.to_string(),
        })
    }

    /// Re-enable the form and turn the outcome into a notice.
    pub fn finish(&mut self, result: Result<ResetResponse, TransportError>) -> Notice {
        self.submitting = false;
        match result {
            Ok(response) if response.success => {
                self.close();
                Notice::success(MSG_SENT)
            }
            Ok(response) => {
                let text = response
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| MSG_FAILED.to_string());
                Notice {
                    kind: NoticeKind::Error,
                    text,
                }
            }
            Err(e) => {
                debug!(error = %e, "password reset transport failed");
                Notice::error(MSG_FAILED)
            }
        }
    }

    /// Submit and, when a request is due, send it through `transport`.
    ///
    /// Returns `None` only when a request is already in flight.
    pub fn submit_with(&mut self, email: &str, transport: &impl ResetTransport) -> Option<Notice> {
        match self.submit(email) {
            Submission::Busy => None,
            Submission::Rejected(notice) => Some(notice),
            Submission::Send(request) => {
                let result = transport.send(RESET_ENDPOINT, &request);
                Some(self.finish(result))
            }
        }
    }
}
