//! Tests for the hosting-view adapter: progress signals, dismissal, replay.

mod common;

use std::sync::{Arc, Mutex};
use std::thread;

use common::{url, RecordingProgress, RecordingSink, AUTHORIZE_URL};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use webauth_flow::classify::{ErrorClassifier, PlatformError, URL_ERROR_CANCELLED, URL_ERROR_DOMAIN};
use webauth_flow::config::FlowConfig;
use webauth_flow::flow::{FailureReason, FlowResult, FlowState, FlowStep, SuppressReason};
use webauth_flow::policy::NavigationDecision;
use webauth_flow::redirect::RedirectMatcher;
use webauth_flow::session::{HostEvent, NavigationTrace, WebAuthSession};

fn session_with(sink: &RecordingSink, progress: &RecordingProgress) -> WebAuthSession {
    let mut session = WebAuthSession::new(
        url(AUTHORIZE_URL),
        RedirectMatcher::new(),
        ErrorClassifier::new(),
    )
    .with_sink(sink.clone())
    .with_progress(progress.clone());
    session.start().expect("start");
    session
}

// ---------------------------------------------------------------------------
// Progress indicator
// ---------------------------------------------------------------------------

#[test]
fn progress_follows_load_start_and_finish() {
    let progress = RecordingProgress::default();
    let mut session = session_with(&RecordingSink::new(), &progress);

    session.on_load_started();
    session.on_load_started();
    session.on_load_finished(AUTHORIZE_URL);
    session.on_load_started();
    session.on_load_finished("https://idp.example.com/login");

    assert_eq!(progress.signals(), vec![true, false, true, false]);
}

#[test]
fn progress_waits_for_start() {
    let progress = RecordingProgress::default();
    let mut session = WebAuthSession::new(
        url(AUTHORIZE_URL),
        RedirectMatcher::new(),
        ErrorClassifier::new(),
    )
    .with_progress(progress.clone());

    session.on_load_started();
    assert!(progress.signals().is_empty());
    assert_eq!(session.state(), FlowState::NotStarted);

    session.start().expect("start");
    session.on_load_started();
    assert_eq!(progress.signals(), vec![true]);
}

#[test]
fn ignorable_error_keeps_progress_running() {
    let progress = RecordingProgress::default();
    let mut session = session_with(&RecordingSink::new(), &progress);

    session.on_load_started();
    session.on_error(PlatformError::new(URL_ERROR_DOMAIN, URL_ERROR_CANCELLED, "cancelled"));
    assert_eq!(progress.signals(), vec![true]);

    session.on_error(PlatformError::new("NSURLErrorDomain", -1009, "offline"));
    assert_eq!(progress.signals(), vec![true, false]);
    assert_eq!(session.state(), FlowState::Failed);
}

#[test]
fn intercept_stops_progress_and_blocks_new_loads() {
    let progress = RecordingProgress::default();
    let mut session = session_with(&RecordingSink::new(), &progress);

    session.on_load_started();
    session.on_navigation_intent("http://localhost/cb?code=1");
    session.on_load_started();

    assert_eq!(progress.signals(), vec![true, false]);
}

// ---------------------------------------------------------------------------
// Dismissal
// ---------------------------------------------------------------------------

#[test]
fn dismiss_fails_with_user_cancelled_once() {
    let sink = RecordingSink::new();
    let mut session = session_with(&sink, &RecordingProgress::default());

    let step = session.dismiss();
    assert_eq!(
        step,
        FlowStep::Finished(FlowResult::Failure(FailureReason::UserCancelled))
    );
    assert!(session.was_cancelled());
    assert_eq!(
        session.dismiss(),
        FlowStep::Suppressed(SuppressReason::Terminal)
    );
    assert_eq!(sink.completions().len(), 1);
}

#[test]
fn redirect_before_dismiss_wins() {
    let sink = RecordingSink::new();
    let mut session = session_with(&sink, &RecordingProgress::default());

    session.on_navigation_intent("http://127.0.0.1:7777/cb?code=x");
    session.dismiss();

    assert_eq!(session.state(), FlowState::Completed);
    assert!(!session.was_cancelled());
    assert_eq!(
        sink.completions(),
        vec![FlowResult::Success(url("http://127.0.0.1:7777/cb?code=x"))]
    );
}

#[test]
fn dismiss_before_redirect_wins() {
    let sink = RecordingSink::new();
    let mut session = session_with(&sink, &RecordingProgress::default());

    session.dismiss();
    assert_eq!(
        session.on_navigation_intent("http://localhost/cb?code=x"),
        NavigationDecision::Intercept
    );

    assert_eq!(
        sink.completions(),
        vec![FlowResult::Failure(FailureReason::UserCancelled)]
    );
}

#[test]
fn serialized_access_from_threads_produces_one_result() {
    let sink = RecordingSink::new();
    let session = Arc::new(Mutex::new(session_with(&sink, &RecordingProgress::default())));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                let mut session = session.lock().expect("session lock poisoned");
                if i % 2 == 0 {
                    session.dismiss();
                } else {
                    session.on_navigation_intent(&format!("http://localhost/cb?code={i}"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(sink.completions().len(), 1);
    assert!(session.lock().expect("lock").state().is_terminal());
}

// ---------------------------------------------------------------------------
// Config + replay
// ---------------------------------------------------------------------------

#[test]
fn from_config_uses_configured_targets() {
    let mut config = FlowConfig::default();
    config.redirect.loopback = false;
    config.redirect.schemes.push("com.example.app".to_string());

    let mut session =
        WebAuthSession::from_config(&config, url(AUTHORIZE_URL)).expect("valid config");
    session.start().expect("start");

    assert_eq!(
        session.on_navigation_intent("http://localhost/cb"),
        NavigationDecision::Allow
    );
    assert_eq!(
        session.on_navigation_intent("com.example.app:/cb?code=1"),
        NavigationDecision::Intercept
    );
    assert_eq!(session.state(), FlowState::Completed);
}

#[test]
fn replay_trace_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("trace.json");
    std::fs::write(
        &path,
        r#"{
          "request_url": "https://idp.example.com/authorize",
          "events": [
            { "event": "navigate", "url": "https://idp.example.com/authorize" },
            { "event": "load_started" },
            { "event": "load_finished", "url": "https://idp.example.com/authorize" },
            { "event": "error", "domain": "WebKitErrorDomain", "code": 102 },
            { "event": "navigate", "url": "http://localhost/callback?code=abc" },
            { "event": "dismiss" }
          ]
        }"#,
    )
    .expect("write trace");

    let trace = NavigationTrace::load(&path).expect("load trace");
    let sink = RecordingSink::new();
    let mut session = session_with(&sink, &RecordingProgress::default());
    let entries = session.replay(&trace);

    let decisions: Vec<_> = entries.iter().map(|e| e.decision).collect();
    assert_eq!(
        decisions,
        vec![
            Some(NavigationDecision::Allow),
            None,
            None,
            None,
            Some(NavigationDecision::Intercept),
            None,
        ]
    );
    let states: Vec<_> = entries.iter().map(|e| e.state).collect();
    assert_eq!(
        states,
        vec![
            FlowState::Loading,
            FlowState::Loading,
            FlowState::Loading,
            FlowState::Loading,
            FlowState::Completed,
            FlowState::Completed,
        ]
    );
    assert_eq!(entries[5].event, HostEvent::Dismiss);
    assert_eq!(
        sink.completions(),
        vec![FlowResult::Success(url("http://localhost/callback?code=abc"))]
    );
}

#[test]
fn missing_trace_file_is_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let err = NavigationTrace::load(dir.path().join("absent.json")).expect_err("missing file");
    assert!(matches!(err, webauth_flow::error::FlowError::Io(_)));
}
