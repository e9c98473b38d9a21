pub mod bridge;
pub mod config;
pub mod launch_args;
pub mod logging;

use anyhow::Context;
use bridge::{PendingIntent, TauriBridge};
use config::AppConfig;
use engine::{AppContext, Delivery, LaunchIntent};
use tauri::{AppHandle, Manager, RunEvent};

/// The intent the shell was launched (or last re-opened) with, after
/// normalization.
#[tauri::command]
fn get_launch_intent(pending: tauri::State<'_, PendingIntent>) -> Option<LaunchIntent> {
    pending.get()
}

#[tauri::command]
fn get_app_config() -> &'static AppConfig {
    config::get_config()
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging
    logging::init_logging();
    let policy = config::get_config().deep_link.policy();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(PendingIntent::default())
        .invoke_handler(tauri::generate_handler![get_launch_intent, get_app_config])
        .setup(move |app| {
            let bridge = TauriBridge::new(app.handle().clone());
            let ctx = AppContext::new(Box::new(bridge)).with_policy(policy);
            let report = ctx
                .launch(Delivery::Create, launch_args::intent_from_env())
                .context("handing the launch intent to the web view")?;
            tracing::info!(outcome = ?report.outcome, "shell started");
            app.manage(ctx);
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while running tauri application")
        .run(on_run_event);
}

/// Links opened while the app is running arrive as a run event on Apple
/// platforms; they take the new-intent path.
#[cfg(any(target_os = "macos", target_os = "ios"))]
fn on_run_event(app: &AppHandle, event: RunEvent) {
    let RunEvent::Opened { urls } = event else {
        return;
    };
    let Some(ctx) = app.try_state::<AppContext>() else {
        tracing::warn!("link opened before startup finished, dropping");
        return;
    };
    for url in urls {
        let intent = match engine::DeepLink::parse(url.as_str()) {
            Ok(link) => LaunchIntent::view(link),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring opened URL");
                continue;
            }
        };
        if let Err(e) = ctx.launch(Delivery::NewIntent, Some(intent)) {
            tracing::error!(error = %e, "failed to deliver opened link");
        }
    }
}

#[cfg(not(any(target_os = "macos", target_os = "ios")))]
fn on_run_event(_app: &AppHandle, _event: RunEvent) {}
