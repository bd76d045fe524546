mod bootstrap;

use anyhow::Result;
use telemetry_core::error::ViewerError;
use telemetry_core::settings::Settings;
use telemetry_data::review::review_student;
use telemetry_runtime::orchestrator::RefreshOrchestrator;
use telemetry_ui::app::{App, ViewMode};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Proctor View v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Assignment: {}, Device: {}, View: {}, Theme: {}",
        settings.assignment,
        settings.device,
        settings.view,
        settings.theme
    );

    let root = match settings.data_path.clone() {
        Some(path) => {
            if !path.is_dir() {
                return Err(ViewerError::SnapshotRootNotFound(path).into());
            }
            path
        }
        None => bootstrap::discover_snapshot_root().ok_or_else(|| {
            ViewerError::Config("no snapshot root found; pass --data-path explicitly".to_string())
        })?,
    };
    tracing::info!(root = %root.display(), "using snapshot root");

    let use_12h = settings.use_12h();

    match settings.view.as_str() {
        "live" => {
            tracing::info!("Starting live review...");

            let orchestrator = RefreshOrchestrator::new(
                u64::from(settings.refresh_rate),
                root,
                &settings.assignment,
                &settings.device,
            );

            let (rx, handle) = orchestrator.start();

            let app = App::new(
                &settings.theme,
                ViewMode::Report,
                settings.assignment.clone(),
                settings.device.clone(),
                settings.timezone.clone(),
                use_12h,
            );

            // Run the TUI event loop. The loop exits on 'q' / Ctrl+C inside the TUI.
            // We also listen for Ctrl+C at the OS level so that signals received
            // while the terminal is in raw mode are handled cleanly.
            tokio::select! {
                result = app.run_live(rx) => {
                    handle.abort();
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down refresh task");
                    handle.abort();
                }
            }
        }

        "report" | "timeline" => {
            tracing::info!("Running one-shot {} view...", settings.view);

            // Single pass through the review pipeline; no background refresh.
            let result = review_student(&root, &settings.assignment, &settings.device);

            let view_mode = if settings.view == "timeline" {
                ViewMode::Timeline
            } else {
                ViewMode::Report
            };

            let app = App::new(
                &settings.theme,
                view_mode,
                settings.assignment.clone(),
                settings.device.clone(),
                settings.timezone.clone(),
                use_12h,
            );

            app.run_static(result).await?;
        }

        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}
