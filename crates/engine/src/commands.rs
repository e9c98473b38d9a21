//! Command registry and built-in launch commands.
//!
//! Commands are registered by name and invoked with JSON input/output.

use crate::context::{AppContext, Delivery, LaunchError};
use crate::intent::LaunchIntent;
use crate::normalize::{MalformedUriPolicy, NormalizeError};
use crate::traits::CapError;
use crate::types::*;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;

/// Signature for all engine commands.
pub type CommandHandler = fn(Value, &AppContext) -> Result<Value, CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Bridge(#[from] CapError),
    #[error("{0}")]
    Other(String),
}

impl CommandError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            CommandError::InvalidInput(_) => ErrorCode::InvalidInput,
            CommandError::Normalize(NormalizeError::MalformedUri { .. }) => ErrorCode::MalformedUri,
            CommandError::Bridge(CapError::Unsupported(_)) => ErrorCode::Unsupported,
            CommandError::Bridge(_) => ErrorCode::BridgeError,
            CommandError::Other(_) => ErrorCode::InternalError,
        }
    }
}

impl From<LaunchError> for CommandError {
    fn from(e: LaunchError) -> Self {
        match e {
            LaunchError::Normalize(e) => CommandError::Normalize(e),
            LaunchError::Bridge(e) => CommandError::Bridge(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub struct CommandRegistry {
    handlers: HashMap<String, CommandHandler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut reg = Self {
            handlers: HashMap::new(),
        };
        // Register built-in commands
        reg.register("ping", cmd_ping);
        reg.register("normalize_intent", cmd_normalize_intent);
        reg.register("launch", cmd_launch);
        reg.register("window_config", cmd_window_config);
        reg
    }

    pub fn register(&mut self, name: &str, handler: CommandHandler) {
        self.handlers.insert(name.to_string(), handler);
    }

    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Execute a command by name and return a full CommandResult.
    pub fn execute(&self, name: &str, args: Value, ctx: &AppContext) -> CommandResult {
        let run_id = new_run_id();
        let start = Instant::now();

        let handler = match self.handlers.get(name) {
            Some(h) => h,
            None => {
                return result_err(
                    "call",
                    name,
                    &run_id,
                    start.elapsed().as_millis() as u64,
                    ErrorCode::InvalidInput,
                    format!("unknown command: {}", name),
                );
            }
        };

        match handler(args, ctx) {
            Ok(data) => {
                let mut r = result_ok("call", name, &run_id, start.elapsed().as_millis() as u64);
                r.data = Some(data);
                r
            }
            Err(e) => result_err(
                "call",
                name,
                &run_id,
                start.elapsed().as_millis() as u64,
                e.error_code(),
                e.to_string(),
            ),
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Built-in commands
// ===========================================================================

/// `ping` – returns { "pong": true }. Proves wiring works.
fn cmd_ping(_args: Value, _ctx: &AppContext) -> Result<Value, CommandError> {
    Ok(serde_json::json!({ "pong": true }))
}

/// `normalize_intent` – run the normalizer without touching the bridge.
///
/// Args: `{ "intent": { "action": "view", "uri": "myapp://x" } | null, "strict": false }`
/// Returns: `{ "intent": {...}, "outcome": { "kind": "rewritten", ... }, "rewritten": true }`
fn cmd_normalize_intent(args: Value, ctx: &AppContext) -> Result<Value, CommandError> {
    let intent = intent_arg(&args)?;
    let policy = match args.get("strict").and_then(|v| v.as_bool()) {
        Some(true) => MalformedUriPolicy::Strict,
        Some(false) => MalformedUriPolicy::PassThrough,
        None => ctx.policy(),
    };

    let normalized = policy.apply(intent)?;
    Ok(serde_json::json!({
        "rewritten": normalized.outcome().is_rewritten(),
        "outcome": normalized.outcome(),
        "intent": normalized.intent(),
    }))
}

/// `launch` – full handoff through the context's bridge.
///
/// Args: `{ "delivery": "create" | "new_intent", "intent": {...} | null }`
/// Returns: the launch report.
fn cmd_launch(args: Value, ctx: &AppContext) -> Result<Value, CommandError> {
    let delivery = match args.get("delivery") {
        None | Some(Value::Null) => Delivery::Create,
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| CommandError::InvalidInput(format!("bad 'delivery': {}", e)))?,
    };
    let intent = intent_arg(&args)?;

    let report = ctx.launch(delivery, intent)?;
    serde_json::to_value(&report).map_err(|e| CommandError::Other(e.to_string()))
}

/// `window_config` – the window chrome requested at startup.
fn cmd_window_config(_args: Value, ctx: &AppContext) -> Result<Value, CommandError> {
    serde_json::to_value(ctx.window()).map_err(|e| CommandError::Other(e.to_string()))
}

/// Read the optional `intent` field. A missing field or `null` is the
/// absent intent.
fn intent_arg(args: &Value) -> Result<Option<LaunchIntent>, CommandError> {
    match args.get("intent") {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| CommandError::InvalidInput(format!("bad 'intent': {}", e))),
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AppContext;

    #[test]
    fn test_ping_command() {
        let ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        let result = reg.execute("ping", serde_json::json!({}), &ctx);
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.data.unwrap()["pong"], true);
    }

    #[test]
    fn test_unknown_command() {
        let ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        let result = reg.execute("nonexistent", serde_json::json!({}), &ctx);
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.error.unwrap().code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_normalize_intent_rewrites() {
        let ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        let result = reg.execute(
            "normalize_intent",
            serde_json::json!({ "intent": { "action": "view", "uri": "myapp://open/profile/42" } }),
            &ctx,
        );
        assert_eq!(result.status, Status::Pass);
        let data = result.data.unwrap();
        assert_eq!(data["rewritten"], true);
        assert_eq!(data["outcome"]["from"], "myapp");
        assert_eq!(data["intent"]["uri"], "https://open/profile/42");
    }

    #[test]
    fn test_normalize_intent_keeps_action_text() {
        let ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        for intent in [
            serde_json::json!({ "action": "android.intent.action.MAIN" }),
            serde_json::json!({ "action": "android.intent.action.VIEW", "uri": "https://example.com/x" }),
            serde_json::json!({ "action": "VIEW" }),
        ] {
            let args = serde_json::json!({ "intent": intent.clone() });
            let data = reg.execute("normalize_intent", args, &ctx).data.unwrap();
            assert_eq!(data["intent"], intent);
        }

        let args = serde_json::json!({
            "intent": { "action": "android.intent.action.VIEW", "uri": "myapp://open" }
        });
        let data = reg.execute("normalize_intent", args, &ctx).data.unwrap();
        assert_eq!(data["intent"]["action"], "android.intent.action.VIEW");
        assert_eq!(data["intent"]["uri"], "https://open");
    }

    #[test]
    fn test_normalize_intent_absent() {
        let ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        let result = reg.execute("normalize_intent", serde_json::json!({}), &ctx);
        assert_eq!(result.status, Status::Pass);
        let data = result.data.unwrap();
        assert_eq!(data["outcome"]["kind"], "no_intent");
        assert!(data["intent"].is_null());
    }

    #[test]
    fn test_normalize_intent_malformed() {
        let ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        let args = serde_json::json!({ "intent": { "action": "view", "uri": "myapp://" } });

        let lenient = reg.execute("normalize_intent", args.clone(), &ctx);
        assert_eq!(lenient.status, Status::Pass);
        let data = lenient.data.unwrap();
        assert_eq!(data["outcome"]["kind"], "passed_through");
        assert_eq!(data["intent"]["uri"], "myapp://");

        let mut strict_args = args;
        strict_args["strict"] = serde_json::json!(true);
        let strict = reg.execute("normalize_intent", strict_args, &ctx);
        assert_eq!(strict.status, Status::Error);
        assert_eq!(strict.error.unwrap().code, ErrorCode::MalformedUri);
    }

    #[test]
    fn test_normalize_intent_bad_uri_is_invalid_input() {
        let ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        let result = reg.execute(
            "normalize_intent",
            serde_json::json!({ "intent": { "action": "view", "uri": "not a uri" } }),
            &ctx,
        );
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.error.unwrap().code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_launch_new_intent() {
        let ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        let result = reg.execute(
            "launch",
            serde_json::json!({
                "delivery": "new_intent",
                "intent": { "action": "view", "uri": "http://example.com/a?b=c#d" }
            }),
            &ctx,
        );
        assert_eq!(result.status, Status::Pass);
        let data = result.data.unwrap();
        assert_eq!(data["delivery"], "new_intent");
        assert_eq!(data["intent"]["uri"], "https://example.com/a?b=c#d");
    }

    #[test]
    fn test_launch_bad_delivery() {
        let ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        let result = reg.execute("launch", serde_json::json!({ "delivery": "resume" }), &ctx);
        assert_eq!(result.error.unwrap().code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_window_config() {
        let ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        let data = reg
            .execute("window_config", serde_json::json!({}), &ctx)
            .data
            .unwrap();
        assert_eq!(data["fullscreen"], true);
        assert_eq!(data["borderless"], true);
    }

    #[test]
    fn test_list_commands() {
        let reg = CommandRegistry::new();
        let names = reg.list();
        assert_eq!(names, vec!["launch", "normalize_intent", "ping", "window_config"]);
    }
}
