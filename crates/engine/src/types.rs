use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Final result JSON – the stable output contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    pub run_id: String,
    pub command: String,
    pub target: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    pub timing_ms: TimingInfo,
    pub env_summary: EnvSummary,
    /// Arbitrary command-specific payload returned on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pass,
    Fail,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "pass",
            Status::Fail => "fail",
            Status::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInput,
    Unsupported,
    MalformedUri,
    BridgeError,
    IoError,
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| format!("{:?}", self));
        f.write_str(&s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimingInfo {
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvSummary {
    pub os: String,
    pub arch: String,
}

impl Default for EnvSummary {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Scenario types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    pub steps: Vec<ScenarioStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub call: String,
    #[serde(default)]
    pub args: serde_json::Value,
    #[serde(default = "default_expect_status")]
    pub expect_status: String,
    /// JSON that must be contained in the step's `data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<serde_json::Value>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_expect_status() -> String {
    "pass".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

// ---------------------------------------------------------------------------
// Scenario result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: Option<String>,
    pub overall_status: Status,
    pub step_results: Vec<CommandResult>,
}

// ---------------------------------------------------------------------------
// Serve / daemon protocol
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonRequest {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CommandResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate a new run ID (UUIDv4).
pub fn new_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Build a successful CommandResult shell (caller fills in data).
pub fn result_ok(command: &str, target: &str, run_id: &str, total_ms: u64) -> CommandResult {
    CommandResult {
        run_id: run_id.to_string(),
        command: command.to_string(),
        target: target.to_string(),
        status: Status::Pass,
        error: None,
        timing_ms: TimingInfo { total: total_ms },
        env_summary: EnvSummary::default(),
        data: None,
    }
}

/// Build an error CommandResult.
pub fn result_err(
    command: &str,
    target: &str,
    run_id: &str,
    total_ms: u64,
    code: ErrorCode,
    message: impl Into<String>,
) -> CommandResult {
    CommandResult {
        run_id: run_id.to_string(),
        command: command.to_string(),
        target: target.to_string(),
        status: Status::Error,
        error: Some(ErrorInfo {
            code,
            message: message.into(),
        }),
        timing_ms: TimingInfo { total: total_ms },
        env_summary: EnvSummary::default(),
        data: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_result_shape() {
        let r = result_err("call", "launch", "r1", 3, ErrorCode::MalformedUri, "bad link");
        assert_eq!(r.status.as_str(), "error");
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(
            v["error"],
            serde_json::json!({ "code": "MALFORMED_URI", "message": "bad link" })
        );
        assert!(v.get("data").is_none());
    }

    #[test]
    fn test_status_names() {
        for (status, name) in [
            (Status::Pass, "pass"),
            (Status::Fail, "fail"),
            (Status::Error, "error"),
        ] {
            assert_eq!(status.as_str(), name);
            assert_eq!(serde_json::to_value(status).unwrap(), name);
        }
    }
}
