//! `shellctl` – headless CLI harness for the deep-link shell engine.
//!
//! Runs the same launch logic that the GUI runs before handing off to the
//! web view, but without a window server.

mod serve;

use clap::{Parser, Subcommand, ValueEnum};
use engine::types::*;
use engine::{AppContext, CommandRegistry, CommandResult};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

// ===========================================================================
// CLI definition
// ===========================================================================

#[derive(Parser)]
#[command(
    name = "shellctl",
    version,
    about = "CLI test harness for the deep-link shell"
)]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a deep link the way the shell does before handoff.
    Normalize {
        /// Deep link URI. Prompted for when omitted on a terminal.
        uri: Option<String>,
        /// Intent action (view, main, or a full android.intent.action.* name).
        #[arg(long, default_value = "view")]
        action: String,
        /// Fail on a malformed rewrite instead of passing the original through.
        #[arg(long)]
        strict: bool,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Invoke a backend command by name with JSON args.
    Call {
        /// Command name (e.g. "ping", "normalize_intent", "launch").
        cmd: String,
        /// JSON args to pass to the command.
        #[arg(long, default_value = "{}")]
        args: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Simulate an OS intent delivery through the full launch path.
    Emit {
        /// Delivery path.
        delivery: DeliveryArg,
        /// Deep link URI carried by the intent.
        uri: Option<String>,
        /// Intent action.
        #[arg(long, default_value = "view")]
        action: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run a scripted scenario from a YAML file.
    RunScenario {
        /// Path to the scenario YAML file.
        file: PathBuf,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Start daemon mode over a Unix socket.
    Serve {
        /// Path for the Unix domain socket.
        #[arg(long)]
        socket: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DeliveryArg {
    /// Cold start (activity creation).
    Create,
    /// New intent for a running instance.
    NewIntent,
}

impl DeliveryArg {
    fn as_str(self) -> &'static str {
        match self {
            DeliveryArg::Create => "create",
            DeliveryArg::NewIntent => "new_intent",
        }
    }
}

#[derive(Serialize)]
struct IntentArgs<'a> {
    action: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    uri: Option<&'a str>,
}

// ===========================================================================
// Main
// ===========================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialise tracing for CLI (structured, no tauri config dependency)
    let builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    let ctx = AppContext::default_platform();
    let registry = CommandRegistry::new();

    match cli.command {
        Commands::Normalize {
            uri,
            action,
            strict,
            json,
        } => cmd_normalize(uri, &action, strict, json, &ctx, &registry),
        Commands::Call { cmd, args, json } => cmd_call(&cmd, &args, json, &ctx, &registry),
        Commands::Emit {
            delivery,
            uri,
            action,
            json,
        } => cmd_emit(delivery, uri.as_deref(), &action, json, &ctx, &registry),
        Commands::RunScenario { file, json } => cmd_run_scenario(&file, json, &ctx, &registry),
        Commands::Serve { socket } => serve::run_daemon(socket, ctx, registry).await,
    }
}

// ===========================================================================
// Subcommand implementations
// ===========================================================================

fn cmd_normalize(
    uri: Option<String>,
    action: &str,
    strict: bool,
    json: bool,
    ctx: &AppContext,
    registry: &CommandRegistry,
) {
    let uri = uri.or_else(prompt_uri);
    let intent = IntentArgs {
        action,
        uri: uri.as_deref(),
    };
    let args = serde_json::json!({ "strict": strict, "intent": intent });
    let result = registry.execute("normalize_intent", args, ctx);
    output_result(&result, json);
}

/// Ask for a deep link when run interactively. Empty input means no URI.
fn prompt_uri() -> Option<String> {
    if !std::io::stdin().is_terminal() {
        return None;
    }
    dialoguer::Input::<String>::new()
        .with_prompt("Deep link URI (empty for none)")
        .allow_empty(true)
        .interact_text()
        .ok()
        .filter(|s| !s.trim().is_empty())
}

fn cmd_call(
    cmd: &str,
    args_str: &str,
    json: bool,
    ctx: &AppContext,
    registry: &CommandRegistry,
) {
    let args: serde_json::Value = match serde_json::from_str(args_str) {
        Ok(v) => v,
        Err(e) => {
            let r = result_err(
                "call",
                cmd,
                &new_run_id(),
                0,
                ErrorCode::InvalidInput,
                format!("invalid JSON args: {}", e),
            );
            output_result(&r, json);
            return;
        }
    };

    let result = registry.execute(cmd, args, ctx);
    output_result(&result, json);
}

fn cmd_emit(
    delivery: DeliveryArg,
    uri: Option<&str>,
    action: &str,
    json: bool,
    ctx: &AppContext,
    registry: &CommandRegistry,
) {
    let intent = IntentArgs { action, uri };
    let args = serde_json::json!({ "delivery": delivery.as_str(), "intent": intent });
    let mut result = registry.execute("launch", args, ctx);
    result.command = "emit".to_string();
    output_result(&result, json);
}

fn cmd_run_scenario(
    file: &Path,
    json: bool,
    ctx: &AppContext,
    registry: &CommandRegistry,
) {
    let yaml = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            let r = result_err(
                "run-scenario",
                &file.display().to_string(),
                &new_run_id(),
                0,
                ErrorCode::IoError,
                format!("cannot read scenario file: {}", e),
            );
            output_result(&r, json);
            return;
        }
    };

    let scenario = match engine::scenario::load_scenario(&yaml) {
        Ok(s) => s,
        Err(e) => {
            let r = result_err(
                "run-scenario",
                &file.display().to_string(),
                &new_run_id(),
                0,
                ErrorCode::InvalidInput,
                e,
            );
            output_result(&r, json);
            return;
        }
    };

    let scenario_result = engine::scenario::run_scenario(&scenario, ctx, registry);

    if json {
        let j = serde_json::to_string_pretty(&scenario_result).unwrap_or_default();
        println!("{}", j);
    } else {
        println!(
            "Scenario: {}",
            scenario_result.name.as_deref().unwrap_or("<unnamed>")
        );
        println!("Overall: {:?}", scenario_result.overall_status);
        for (i, sr) in scenario_result.step_results.iter().enumerate() {
            println!(
                "  Step {}: {} -> {:?} ({}ms)",
                i, sr.target, sr.status, sr.timing_ms.total
            );
        }
    }

    if scenario_result.overall_status == Status::Fail {
        std::process::exit(1);
    }
}

// ===========================================================================
// Output helpers
// ===========================================================================

fn output_result(result: &CommandResult, json: bool) {
    if json {
        let j = serde_json::to_string_pretty(result).unwrap_or_default();
        println!("{}", j);
    } else {
        print_human(result);
    }

    // Exit with non-zero status on error/fail
    match result.status {
        Status::Pass => {}
        Status::Fail => std::process::exit(1),
        Status::Error => std::process::exit(2),
    }
}

fn print_human(r: &CommandResult) {
    let status_icon = match r.status {
        Status::Pass => "PASS",
        Status::Fail => "FAIL",
        Status::Error => "ERROR",
    };

    println!("[{}] {} {}", status_icon, r.command, r.target);
    println!("  run_id: {}", r.run_id);
    println!("  timing: {}ms", r.timing_ms.total);

    if let Some(ref err) = r.error {
        println!("  error:  {} – {}", err.code, err.message);
    }

    if let Some(ref data) = r.data {
        if let Ok(s) = serde_json::to_string_pretty(data) {
            for line in s.lines() {
                println!("  {}", line);
            }
        }
    }

    println!("  env: os={} arch={}", r.env_summary.os, r.env_summary.arch);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_call_and_run_scenario_flags() {
        assert!(Cli::try_parse_from(["shellctl", "call", "ping", "--json"]).is_ok());
        assert!(Cli::try_parse_from(["shellctl", "run-scenario", "s.yaml", "--json"]).is_ok());
        assert!(Cli::try_parse_from(["shellctl", "call", "ping", "--artifacts", "out"]).is_err());
        assert!(Cli::try_parse_from(["shellctl", "run-scenario", "s.yaml", "--artifacts", "out"]).is_err());
    }
}
