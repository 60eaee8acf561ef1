//! User-facing error modeling for command failures.

use std::fmt;

use client_core::{ClientError, RunError, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Service,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Startup,
    Analysis,
    Upload,
    Listing,
    Detail,
    Delete,
}

impl UiErrorContext {
    fn headline(self) -> &'static str {
        match self {
            UiErrorContext::Startup => "Could not start",
            UiErrorContext::Analysis => "Analysis failed",
            UiErrorContext::Upload => "Failed to upload resume",
            UiErrorContext::Listing => "Failed to load list",
            UiErrorContext::Detail => "Failed to load analysis",
            UiErrorContext::Delete => "Failed to delete",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    /// Classifies by the typed client errors in the chain, falling back to
    /// keyword matching on the rendered message.
    pub fn from_error(context: UiErrorContext, err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");
        let category = err
            .chain()
            .find_map(|cause| {
                if let Some(session) = cause.downcast_ref::<SessionError>() {
                    return Some(categorize_session(session));
                }
                if let Some(run) = cause.downcast_ref::<RunError>() {
                    return Some(categorize_run(run));
                }
                cause.downcast_ref::<ClientError>().map(categorize_client)
            })
            .unwrap_or_else(|| categorize_message(&message));
        Self {
            category,
            context,
            message,
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self.category {
            UiErrorCategory::Auth => {
                Some("Session token missing or rejected; set APPLYWISE_ACCESS_TOKEN or pass --token and retry.")
            }
            UiErrorCategory::Transport => {
                Some("Analysis service unreachable; check --api-url and your network, then retry.")
            }
            UiErrorCategory::Service if self.context == UiErrorContext::Analysis => {
                Some("The analysis service could not finish this run; re-run the command to try again.")
            }
            _ => None,
        }
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context.headline(), self.message)?;
        if let Some(hint) = self.hint() {
            write!(f, "\n{hint}")?;
        }
        Ok(())
    }
}

fn categorize_session(err: &SessionError) -> UiErrorCategory {
    match err {
        SessionError::EmptyJobDescription | SessionError::RunActive => UiErrorCategory::Validation,
        SessionError::AnalysisFailed(run) => categorize_run(run),
    }
}

fn categorize_run(err: &RunError) -> UiErrorCategory {
    match err {
        RunError::Remote(client) => categorize_client(client),
        RunError::TimedOut(_) => UiErrorCategory::Transport,
    }
}

fn categorize_client(err: &ClientError) -> UiErrorCategory {
    if err.is_unauthorized() {
        return UiErrorCategory::Auth;
    }
    match err {
        ClientError::Transport(_) => UiErrorCategory::Transport,
        ClientError::InvalidBaseUrl { .. } | ClientError::UnsupportedFile(_) | ClientError::Io { .. } => {
            UiErrorCategory::Validation
        }
        ClientError::Service { status, .. } if (400..500).contains(status) => {
            UiErrorCategory::Validation
        }
        ClientError::Service { .. } | ClientError::Decode(_) => UiErrorCategory::Service,
        ClientError::Credentials { .. } => UiErrorCategory::Auth,
    }
}

fn categorize_message(message: &str) -> UiErrorCategory {
    let lower = message.to_ascii_lowercase();
    if lower.contains("401")
        || lower.contains("403")
        || lower.contains("unauthorized")
        || lower.contains("forbidden")
        || lower.contains("session expired")
        || lower.contains("invalid token")
    {
        UiErrorCategory::Auth
    } else if lower.contains("invalid")
        || lower.contains("missing")
        || lower.contains("malformed")
        || lower.contains("must not be empty")
    {
        UiErrorCategory::Validation
    } else if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection")
        || lower.contains("network")
        || lower.contains("transport")
        || lower.contains("unavailable")
    {
        UiErrorCategory::Transport
    } else {
        UiErrorCategory::Unknown
    }
}
