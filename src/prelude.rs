//! Convenience re-exports for common use.

pub use crate::classify::{ErrorClassification, ErrorClassifier, PlatformError};
pub use crate::config::FlowConfig;
pub use crate::error::{FlowError, Result};
pub use crate::flow::{
    AuthFlowStateMachine, CallbackSink, FailureReason, FlowResult, FlowSink, FlowState, FlowStep,
};
pub use crate::policy::{NavigationDecision, NavigationPolicy};
pub use crate::redirect::{RedirectMatcher, RedirectResponse, RedirectTarget};
pub use crate::request::AuthorizationRequest;
pub use crate::session::WebAuthSession;
