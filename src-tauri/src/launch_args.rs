//! Desktop launch intent, read from the process arguments.
//!
//! Windows and Linux start a registered URI handler with the link as a bare
//! argument (`deeplink-shell myapp://open/profile/42`).

use clap::Parser;
use engine::{DeepLink, IntentAction, LaunchIntent};
use std::ffi::OsString;

#[derive(Parser, Debug)]
#[command(name = "deeplink-shell", about = "Deep link shell")]
struct LaunchArgs {
    /// Deep link the shell was opened with.
    uri: Option<String>,

    /// Intent action to report for the link.
    #[arg(long, default_value = "view")]
    action: String,
}

/// Build the launch intent from `std::env::args_os()`.
pub fn intent_from_env() -> Option<LaunchIntent> {
    intent_from_args(std::env::args_os())
}

/// Build the launch intent from an argument list (program name first).
///
/// Never fails: anything that cannot be understood is logged and the shell
/// starts as a plain `main` launch.
pub fn intent_from_args<I, T>(args: I) -> Option<LaunchIntent>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match LaunchArgs::try_parse_from(args) {
        Ok(args) => args,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unrecognised launch arguments");
            return Some(LaunchIntent::main());
        }
    };

    let Some(raw) = args.uri else {
        return Some(LaunchIntent::main());
    };

    match DeepLink::parse(&raw) {
        Ok(uri) => Some(LaunchIntent {
            action: Some(IntentAction::from(args.action)),
            uri: Some(uri),
            ..Default::default()
        }),
        Err(e) => {
            tracing::warn!(error = %e, "launch argument is not a URI, starting without a deep link");
            Some(LaunchIntent::main())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_is_main() {
        assert_eq!(intent_from_args(["deeplink-shell"]), Some(LaunchIntent::main()));
    }

    #[test]
    fn test_bare_uri_is_view() {
        let intent = intent_from_args(["deeplink-shell", "myapp://open/profile/42"]).unwrap();
        assert!(intent.is_view());
        assert_eq!(intent.uri.unwrap().as_str(), "myapp://open/profile/42");
    }

    #[test]
    fn test_explicit_action() {
        let intent = intent_from_args([
            "deeplink-shell",
            "--action",
            "android.intent.action.SEND",
            "myapp://share",
        ])
        .unwrap();
        assert_eq!(
            intent.action,
            Some(IntentAction::Other("android.intent.action.SEND".into()))
        );
    }

    #[test]
    fn test_garbage_never_blocks_startup() {
        assert_eq!(
            intent_from_args(["deeplink-shell", "not a link"]),
            Some(LaunchIntent::main())
        );
        assert_eq!(
            intent_from_args(["deeplink-shell", "--unknown-flag"]),
            Some(LaunchIntent::main())
        );
    }
}
