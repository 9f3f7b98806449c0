//! Caller-side flow notifications.

use std::fmt;

use url::Url;

use super::state::FlowResult;

/// Caller-owned receiver of flow notifications.
///
/// `page_loading` / `page_loaded` may fire any number of times before the
/// single `completed` call; nothing fires after it.
pub trait FlowSink: Send {
    fn page_loading(&mut self, _url: &Url) {}

    fn page_loaded(&mut self, _url: &Url) {}

    fn completed(&mut self, result: &FlowResult);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FlowSink for NullSink {
    fn completed(&mut self, _result: &FlowResult) {}
}

type UrlCallback = Box<dyn FnMut(&Url) + Send>;

/// Closure-backed sink.
///
/// # Example
/// ```
/// use webauth_flow::flow::CallbackSink;
///
/// let sink = CallbackSink::new(|result| println!("flow finished: {result:?}"))
///     .on_page_loaded(|url| println!("loaded {url}"));
/// ```
pub struct CallbackSink {
    loading: Option<UrlCallback>,
    loaded: Option<UrlCallback>,
    completed: Box<dyn FnMut(&FlowResult) + Send>,
}

impl CallbackSink {
    pub fn new(completed: impl FnMut(&FlowResult) + Send + 'static) -> Self {
        Self {
            loading: None,
            loaded: None,
            completed: Box::new(completed),
        }
    }

    pub fn on_page_loading(mut self, callback: impl FnMut(&Url) + Send + 'static) -> Self {
        self.loading = Some(Box::new(callback));
        self
    }

    pub fn on_page_loaded(mut self, callback: impl FnMut(&Url) + Send + 'static) -> Self {
        self.loaded = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for CallbackSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSink")
            .field("loading", &self.loading.as_ref().map(|_| ".."))
            .field("loaded", &self.loaded.as_ref().map(|_| ".."))
            .finish_non_exhaustive()
    }
}

impl FlowSink for CallbackSink {
    fn page_loading(&mut self, url: &Url) {
        if let Some(callback) = self.loading.as_mut() {
            callback(url);
        }
    }

    fn page_loaded(&mut self, url: &Url) {
        if let Some(callback) = self.loaded.as_mut() {
            callback(url);
        }
    }

    fn completed(&mut self, result: &FlowResult) {
        (self.completed)(result);
    }
}
