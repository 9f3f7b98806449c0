//! Adapter between a hosting web view and the flow core.
//!
//! The host forwards its native callbacks here and acts on the returned
//! values: the navigation decision, and whether the flow has finished (in
//! which case the view should be closed).

pub mod trace;

pub use trace::{HostEvent, NavigationTrace, ReplayEntry};

use std::fmt;

use url::Url;

use crate::classify::{ErrorClassifier, PlatformError};
use crate::config::FlowConfig;
use crate::error::Result;
use crate::flow::{
    AuthFlowStateMachine, FailureReason, FlowObserver, FlowResult, FlowSink, FlowState, FlowStep,
};
use crate::policy::{NavigationDecision, NavigationPolicy};
use crate::redirect::RedirectMatcher;

/// Receives start/stop signals around page loads.
pub trait ProgressIndicator: Send {
    fn start(&mut self);
    fn stop(&mut self);
}

/// No-op progress indicator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressIndicator for NoProgress {
    fn start(&mut self) {}
    fn stop(&mut self) {}
}

/// One web authentication session: policy, flow state and progress signals.
pub struct WebAuthSession {
    policy: NavigationPolicy,
    flow: AuthFlowStateMachine,
    progress: Box<dyn ProgressIndicator>,
    busy: bool,
}

impl fmt::Debug for WebAuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebAuthSession")
            .field("policy", &self.policy)
            .field("flow", &self.flow)
            .field("busy", &self.busy)
            .finish_non_exhaustive()
    }
}

impl WebAuthSession {
    pub fn new(request_url: Url, matcher: RedirectMatcher, classifier: ErrorClassifier) -> Self {
        Self {
            policy: NavigationPolicy::new(matcher.clone()),
            flow: AuthFlowStateMachine::new(request_url, matcher, classifier),
            progress: Box::new(NoProgress),
            busy: false,
        }
    }

    pub fn from_config(config: &FlowConfig, request_url: Url) -> Result<Self> {
        Ok(Self::new(request_url, config.matcher()?, config.classifier()))
    }

    pub fn with_sink(mut self, sink: impl FlowSink + 'static) -> Self {
        self.flow = self.flow.with_sink(sink);
        self
    }

    pub fn with_observer(mut self, observer: impl FlowObserver + 'static) -> Self {
        self.flow = self.flow.with_observer(observer);
        self
    }

    pub fn with_progress(mut self, progress: impl ProgressIndicator + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn flow(&self) -> &AuthFlowStateMachine {
        &self.flow
    }

    pub fn policy(&self) -> &NavigationPolicy {
        &self.policy
    }

    pub fn state(&self) -> FlowState {
        self.flow.state()
    }

    pub fn result(&self) -> Option<&FlowResult> {
        self.flow.result()
    }

    /// True once the view should be closed.
    pub fn is_finished(&self) -> bool {
        self.flow.has_completed()
    }

    pub fn start(&mut self) -> Result<()> {
        self.flow.start()
    }

    /// The view asks whether it may load `url`.
    pub fn on_navigation_intent(&mut self, url: &str) -> NavigationDecision {
        let decision = self.policy.evaluate(url, &mut self.flow);
        self.settle();
        decision
    }

    pub fn on_load_started(&mut self) {
        if self.flow.state() != FlowState::Loading || self.busy {
            return;
        }
        self.busy = true;
        self.progress.start();
    }

    pub fn on_load_finished(&mut self, url: &str) -> FlowStep {
        self.stop_progress();
        let step = match Url::parse(url) {
            Ok(url) => self.flow.on_page_loaded(&url),
            Err(_) => self.flow.observe_unparsable(url),
        };
        self.settle();
        step
    }

    /// Ignorable errors leave the progress indicator untouched.
    pub fn on_error(&mut self, error: PlatformError) -> FlowStep {
        let step = self.flow.on_error(error);
        if matches!(step, FlowStep::Finished(_)) {
            self.stop_progress();
        }
        step
    }

    /// The user closed the view.
    pub fn dismiss(&mut self) -> FlowStep {
        let step = self.flow.dismiss();
        self.settle();
        step
    }

    /// Apply one recorded host event.
    pub fn apply(&mut self, event: &HostEvent) -> Option<NavigationDecision> {
        match event {
            HostEvent::Navigate { url } => Some(self.on_navigation_intent(url)),
            HostEvent::LoadStarted => {
                self.on_load_started();
                None
            }
            HostEvent::LoadFinished { url } => {
                self.on_load_finished(url);
                None
            }
            HostEvent::Error {
                domain,
                code,
                message,
            } => {
                self.on_error(PlatformError::new(domain.as_str(), *code, message.as_str()));
                None
            }
            HostEvent::Dismiss => {
                self.dismiss();
                None
            }
        }
    }

    /// Apply every event of `trace` in order.
    pub fn replay(&mut self, trace: &NavigationTrace) -> Vec<ReplayEntry> {
        trace
            .events
            .iter()
            .enumerate()
            .map(|(index, event)| {
                let decision = self.apply(event);
                ReplayEntry {
                    index,
                    event: event.clone(),
                    decision,
                    state: self.state(),
                }
            })
            .collect()
    }

    /// User-cancelled results are reported as such rather than as errors.
    pub fn was_cancelled(&self) -> bool {
        matches!(
            self.result(),
            Some(FlowResult::Failure(FailureReason::UserCancelled))
        )
    }

    fn settle(&mut self) {
        if self.flow.has_completed() {
            self.stop_progress();
        }
    }

    fn stop_progress(&mut self) {
        if self.busy {
            self.busy = false;
            self.progress.stop();
        }
    }
}
