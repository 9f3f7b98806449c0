//! webauth-flow: redirect-based web authentication flow core.
//!
//! Everything a web-view OAuth login needs besides the view itself: which
//! URLs may load and which end the flow, flow progress with exactly-once
//! completion, and classification of platform load errors. The hosting view
//! forwards its callbacks to a [`session::WebAuthSession`] and acts on the
//! returned decisions.
//!
//! # Quick Start
//!
//! ```
//! use url::Url;
//! use webauth_flow::prelude::*;
//!
//! # fn example() -> webauth_flow::error::Result<()> {
//! let config = FlowConfig::default();
//! let request = Url::parse("https://idp.example.com/authorize").unwrap();
//! let mut session = WebAuthSession::from_config(&config, request)?;
//! session.start()?;
//!
//! assert_eq!(
//!     session.on_navigation_intent("https://idp.example.com/authorize"),
//!     NavigationDecision::Allow,
//! );
//! assert_eq!(
//!     session.on_navigation_intent("http://localhost/callback?code=abc"),
//!     NavigationDecision::Intercept,
//! );
//! assert_eq!(session.state(), FlowState::Completed);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod flow;
pub mod policy;
pub mod prelude;
pub mod redirect;
pub mod request;
pub mod session;

#[cfg(feature = "cli")]
pub mod cli;
