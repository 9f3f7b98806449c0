//! Shared test helpers: recording sink, progress indicator and observer.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use url::Url;
use webauth_flow::flow::{FlowEvent, FlowEventPayload, FlowObserver, FlowResult, FlowSink};
use webauth_flow::session::ProgressIndicator;

pub const AUTHORIZE_URL: &str = "https://idp.example.com/authorize";

/// Notification received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    PageLoading(String),
    PageLoaded(String),
    Completed(FlowResult),
}

/// Sink that records every notification; clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.log.lock().expect("sink lock poisoned").clone()
    }

    pub fn completions(&self) -> Vec<FlowResult> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Completed(result) => Some(result),
                _ => None,
            })
            .collect()
    }

    fn push(&self, notification: Notification) {
        self.log.lock().expect("sink lock poisoned").push(notification);
    }
}

impl FlowSink for RecordingSink {
    fn page_loading(&mut self, url: &Url) {
        self.push(Notification::PageLoading(url.to_string()));
    }

    fn page_loaded(&mut self, url: &Url) {
        self.push(Notification::PageLoaded(url.to_string()));
    }

    fn completed(&mut self, result: &FlowResult) {
        self.push(Notification::Completed(result.clone()));
    }
}

/// Progress indicator recording `start` / `stop` calls as `true` / `false`.
#[derive(Clone, Default)]
pub struct RecordingProgress {
    signals: Arc<Mutex<Vec<bool>>>,
}

impl RecordingProgress {
    pub fn signals(&self) -> Vec<bool> {
        self.signals.lock().expect("progress lock poisoned").clone()
    }
}

impl ProgressIndicator for RecordingProgress {
    fn start(&mut self) {
        self.signals.lock().expect("progress lock poisoned").push(true);
    }

    fn stop(&mut self) {
        self.signals.lock().expect("progress lock poisoned").push(false);
    }
}

/// Observer keeping every event payload.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<FlowEvent>>>,
}

impl RecordingObserver {
    pub fn payloads(&self) -> Vec<FlowEventPayload> {
        self.events
            .lock()
            .expect("observer lock poisoned")
            .iter()
            .map(|e| e.payload.clone())
            .collect()
    }

    pub fn events(&self) -> Vec<FlowEvent> {
        self.events.lock().expect("observer lock poisoned").clone()
    }
}

impl FlowObserver for RecordingObserver {
    fn on_event(&self, event: &FlowEvent) {
        self.events
            .lock()
            .expect("observer lock poisoned")
            .push(event.clone());
    }
}

pub fn url(s: &str) -> Url {
    Url::parse(s).expect("valid test url")
}
