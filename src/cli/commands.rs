//! CLI command handlers.

use url::Url;

use crate::classify::PlatformError;
use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::session::{NavigationTrace, WebAuthSession};

use super::{ClassifyArgs, ReplayArgs};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Handle `webauth authorize-url`.
pub fn handle_authorize_url(config: &FlowConfig) -> CliResult<()> {
    let request = config.authorization_request()?;
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

/// Handle `webauth classify`.
pub fn handle_classify(config: &FlowConfig, args: &ClassifyArgs) -> CliResult<()> {
    let error = PlatformError::new(args.domain.as_str(), args.code, args.message.as_str());
    let classification = config.classifier().classify(&error);
    println!("{}", serde_json::to_string(&classification)?);
    Ok(())
}

/// Handle `webauth replay`. Returns whether the flow succeeded.
pub fn handle_replay(config: &FlowConfig, args: &ReplayArgs) -> CliResult<bool> {
    let trace = NavigationTrace::load(&args.trace)?;
    let request_url = resolve_request_url(config, args, &trace)?;
    let mut session = WebAuthSession::from_config(config, request_url)?;
    session.start()?;

    for entry in session.replay(&trace) {
        println!("{}", serde_json::to_string(&entry)?);
    }

    match session.result() {
        Some(result) => {
            println!("{}", serde_json::to_string_pretty(result)?);
            Ok(result.is_success())
        }
        None => {
            println!("flow still {} after {} events", session.state(), trace.events.len());
            Ok(false)
        }
    }
}

fn resolve_request_url(
    config: &FlowConfig,
    args: &ReplayArgs,
    trace: &NavigationTrace,
) -> CliResult<Url> {
    let raw = args
        .request_url
        .clone()
        .or_else(|| trace.request_url.clone())
        .or_else(|| config.request.as_ref().map(|r| r.authorize_url.clone()))
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| {
            FlowError::Configuration(
                "no request URL: pass --request-url, set it in the trace, or configure [request]"
                    .to_string(),
            )
        })?;
    let url = Url::parse(&raw).map_err(|e| FlowError::invalid_url(raw.as_str(), e))?;
    Ok(url)
}
