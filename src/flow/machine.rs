//! The authentication flow state machine.

use std::fmt;

use chrono::Utc;
use url::Url;
use uuid::Uuid;

use crate::classify::{ErrorClassification, ErrorClassifier, PlatformError};
use crate::error::{FlowError, Result};
use crate::redirect::RedirectMatcher;

use super::events::{FlowEvent, FlowEventPayload, FlowId, FlowObserver, TracingObserver};
use super::sink::{FlowSink, NullSink};
use super::state::{FailureReason, FlowResult, FlowState, FlowStep, SuppressReason};

/// Redirect-based authentication flow state.
///
/// All mutation goes through the event methods below. Events are expected
/// in order and one at a time; a multi-threaded host must serialize calls
/// (for example by owning the machine behind a `Mutex`).
///
/// # Example
/// ```
/// use url::Url;
/// use webauth_flow::classify::ErrorClassifier;
/// use webauth_flow::flow::{AuthFlowStateMachine, FlowState};
/// use webauth_flow::redirect::RedirectMatcher;
///
/// let request = Url::parse("https://idp.example.com/authorize")?;
/// let mut flow = AuthFlowStateMachine::new(request, RedirectMatcher::new(), ErrorClassifier::new());
/// flow.start()?;
/// flow.on_redirect_intercepted(&Url::parse("http://localhost/callback?code=abc")?);
/// assert_eq!(flow.state(), FlowState::Completed);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct AuthFlowStateMachine {
    id: FlowId,
    request_url: Url,
    state: FlowState,
    matcher: RedirectMatcher,
    classifier: ErrorClassifier,
    last_loaded: Option<Url>,
    result: Option<FlowResult>,
    sink: Box<dyn FlowSink>,
    observers: Vec<Box<dyn FlowObserver>>,
    seq: u64,
}

impl fmt::Debug for AuthFlowStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthFlowStateMachine")
            .field("id", &self.id)
            .field("request_url", &self.request_url.as_str())
            .field("state", &self.state)
            .field("matcher", &self.matcher)
            .field("classifier", &self.classifier)
            .field("last_loaded", &self.last_loaded.as_ref().map(Url::as_str))
            .field("result", &self.result)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl AuthFlowStateMachine {
    /// Create a flow for `request_url` with a discarding sink and the
    /// [`TracingObserver`] installed.
    pub fn new(request_url: Url, matcher: RedirectMatcher, classifier: ErrorClassifier) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_url,
            state: FlowState::NotStarted,
            matcher,
            classifier,
            last_loaded: None,
            result: None,
            sink: Box::new(NullSink),
            observers: vec![Box::new(TracingObserver)],
            seq: 0,
        }
    }

    pub fn with_sink(mut self, sink: impl FlowSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_observer(mut self, observer: impl FlowObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn id(&self) -> FlowId {
        self.id
    }

    pub fn request_url(&self) -> &Url {
        &self.request_url
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn matcher(&self) -> &RedirectMatcher {
        &self.matcher
    }

    /// `HasCompleted` gate: true once the flow is terminal.
    pub fn has_completed(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn result(&self) -> Option<&FlowResult> {
        self.result.as_ref()
    }

    pub fn last_loaded_url(&self) -> Option<&Url> {
        self.last_loaded.as_ref()
    }

    /// `NotStarted → Loading`.
    pub fn start(&mut self) -> Result<()> {
        if self.state != FlowState::NotStarted {
            return Err(FlowError::InvalidState(format!(
                "flow {} cannot start from state {}",
                self.id, self.state
            )));
        }
        self.state = FlowState::Loading;
        let request_url = self.request_url.clone();
        self.emit(FlowEventPayload::Started { request_url });
        Ok(())
    }

    /// A navigation toward `url` was observed. Progress signal only.
    pub fn on_page_loading(&mut self, url: &Url) -> FlowStep {
        if let Some(reason) = self.gate("page_loading") {
            return FlowStep::Suppressed(reason);
        }
        self.emit(FlowEventPayload::PageLoading { url: url.clone() });
        self.sink.page_loading(url);
        FlowStep::Unchanged
    }

    /// `url` finished loading; completes the flow when it is a redirect target.
    pub fn on_page_loaded(&mut self, url: &Url) -> FlowStep {
        if let Some(reason) = self.gate("page_loaded") {
            return FlowStep::Suppressed(reason);
        }
        if self.last_loaded.as_ref() == Some(url) {
            self.emit(FlowEventPayload::Suppressed {
                event: "page_loaded".to_string(),
                reason: SuppressReason::DuplicateLoad,
            });
            return FlowStep::Suppressed(SuppressReason::DuplicateLoad);
        }
        self.last_loaded = Some(url.clone());
        self.emit(FlowEventPayload::PageLoaded { url: url.clone() });
        self.sink.page_loaded(url);

        match self.matcher.match_url(url) {
            Some(rule) => {
                self.emit(FlowEventPayload::RedirectMatched {
                    url: url.clone(),
                    rule,
                });
                self.finish(FlowResult::Success(url.clone()))
            }
            None => FlowStep::Unchanged,
        }
    }

    /// Short-circuit completion for redirects that are never loaded.
    pub fn on_redirect_intercepted(&mut self, url: &Url) -> FlowStep {
        if let Some(reason) = self.gate("redirect_intercepted") {
            return FlowStep::Suppressed(reason);
        }
        self.emit(FlowEventPayload::RedirectIntercepted { url: url.clone() });
        self.finish(FlowResult::Success(url.clone()))
    }

    /// Platform load error; only fatal errors change state.
    pub fn on_error(&mut self, error: PlatformError) -> FlowStep {
        if let Some(reason) = self.gate("error") {
            return FlowStep::Suppressed(reason);
        }
        match self.classifier.classify(&error) {
            ErrorClassification::Ignorable => {
                self.emit(FlowEventPayload::ErrorIgnored { error });
                FlowStep::Suppressed(SuppressReason::IgnorableError)
            }
            ErrorClassification::Fatal(_) => {
                self.finish(FlowResult::Failure(FailureReason::Platform(error)))
            }
        }
    }

    /// The user closed the view. Also valid before `start()`.
    pub fn dismiss(&mut self) -> FlowStep {
        if self.state.is_terminal() {
            self.emit(FlowEventPayload::Suppressed {
                event: "dismiss".to_string(),
                reason: SuppressReason::Terminal,
            });
            return FlowStep::Suppressed(SuppressReason::Terminal);
        }
        self.emit(FlowEventPayload::Dismissed);
        self.finish(FlowResult::Failure(FailureReason::UserCancelled))
    }

    /// A URL the view reported could not be parsed; recorded, never acted on.
    pub(crate) fn observe_unparsable(&mut self, raw: &str) -> FlowStep {
        if let Some(reason) = self.gate("unparsable_url") {
            return FlowStep::Suppressed(reason);
        }
        self.emit(FlowEventPayload::UnparsableUrl {
            raw: raw.to_string(),
        });
        FlowStep::Unchanged
    }

    fn gate(&mut self, event: &str) -> Option<SuppressReason> {
        let reason = match self.state {
            FlowState::NotStarted => SuppressReason::NotStarted,
            FlowState::Completed | FlowState::Failed => SuppressReason::Terminal,
            FlowState::Loading => return None,
        };
        self.emit(FlowEventPayload::Suppressed {
            event: event.to_string(),
            reason,
        });
        Some(reason)
    }

    fn finish(&mut self, result: FlowResult) -> FlowStep {
        debug_assert!(self.result.is_none(), "flow result produced twice");
        self.state = result.final_state();
        self.result = Some(result.clone());
        self.emit(FlowEventPayload::Finished {
            result: result.clone(),
        });
        self.sink.completed(&result);
        FlowStep::Finished(result)
    }

    fn emit(&mut self, payload: FlowEventPayload) {
        self.seq += 1;
        let event = FlowEvent {
            flow_id: self.id,
            seq: self.seq,
            timestamp: Utc::now(),
            state: self.state,
            payload,
        };
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }
}
