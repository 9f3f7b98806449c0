//! Flow states, results and per-event outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

use crate::classify::PlatformError;
use crate::redirect::RedirectResponse;

/// Progress of an authentication flow.
///
/// `NotStarted → Loading → {Completed, Failed}`; the last two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FlowState {
    NotStarted,
    Loading,
    Completed,
    Failed,
}

impl FlowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Why a flow failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// Fatal error reported by the hosting view.
    Platform(PlatformError),
    /// The view was dismissed before the flow reached its redirect.
    UserCancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platform(error) => write!(f, "{error}"),
            Self::UserCancelled => f.write_str("user cancelled"),
        }
    }
}

/// Terminal outcome of a flow, produced exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum FlowResult {
    /// Final redirect URL.
    Success(Url),
    Failure(FailureReason),
}

impl FlowResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::Success(url) => Some(url),
            Self::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            Self::Success(_) => None,
            Self::Failure(reason) => Some(reason),
        }
    }

    /// Authorization parameters carried by the final redirect URL.
    pub fn redirect_response(&self) -> Option<RedirectResponse> {
        self.url().map(RedirectResponse::parse)
    }

    /// State the flow ends in when this result is produced.
    pub fn final_state(&self) -> FlowState {
        match self {
            Self::Success(_) => FlowState::Completed,
            Self::Failure(_) => FlowState::Failed,
        }
    }
}

/// Why an event produced no transition or notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SuppressReason {
    /// `start()` has not been called yet.
    NotStarted,
    /// The flow already completed or failed.
    Terminal,
    /// Same URL as the immediately preceding page load.
    DuplicateLoad,
    /// Platform error classified as ignorable.
    IgnorableError,
}

/// What a single event did to the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowStep {
    /// Accepted; state unchanged.
    Unchanged,
    Suppressed(SuppressReason),
    /// The flow reached a terminal state with this event.
    Finished(FlowResult),
}

impl FlowStep {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }

    pub fn result(&self) -> Option<&FlowResult> {
        match self {
            Self::Finished(result) => Some(result),
            _ => None,
        }
    }
}
