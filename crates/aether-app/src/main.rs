use std::path::PathBuf;
use std::process::ExitCode;

use aether_app::{AppConfig, AppError, TriggerOutcome, app_version, logging, workflow_from_config};
use aether_upload::load_file;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        eprintln!("usage: aether-app <image-path>");
        return ExitCode::from(2);
    };
    if arg == "--version" {
        println!("aether-app {}", app_version());
        return ExitCode::SUCCESS;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("failed to start runtime: {error}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(PathBuf::from(arg))) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("aether-app: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(path: PathBuf) -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    logging::init_logging(config.log_verbosity)?;
    tracing::info!(
        stage = "startup",
        action = "config",
        endpoint = %config.endpoint,
        timeout_ms = config.request_timeout.map(|timeout| timeout.as_millis() as u64),
        "aether-app {} starting",
        app_version()
    );

    let workflow = workflow_from_config(&config)?;
    let choice = load_file(&path).await?;
    workflow.select_file(Some(choice)).await?;

    if let TriggerOutcome::Succeeded(_) = workflow.trigger().await {
        let report = workflow.open_report()?;
        println!("MISSION ID: {}", report.mission_id);
        println!("GRID REF: {}", report.grid_reference);
        println!("> STATUS: {}", report.status);
        println!("AI CONFIDENCE: {}", report.confidence);
        workflow.wait_for_playback().await;
    }

    let snapshot = workflow.snapshot();
    println!("--- console ---");
    for line in snapshot.ui.console.lines() {
        println!("{line}");
    }
    if snapshot.playback.visible {
        println!("--- ledger ---");
        for line in &snapshot.playback.lines {
            println!("{}", line.text);
        }
    }

    Ok(())
}
