//! Expres application binary - composition root.
//!
//! Ties the pipeline crates together behind a small CLI:
//! 1. Load configuration from TOML
//! 2. Walk the wizard (documentation -> audio -> media) with file-backed ports
//! 3. Encode the draft and send the create-incident request

mod cli;
mod host;

use clap::Parser;

use expres_audio::AudioCaptureController;
use expres_capture::{CaptureActions, FsAssetReader};
use expres_core::config::ExpresConfig;
use expres_core::error::{ExpresError, Result};
use expres_core::types::DraftUpdate;
use expres_submit::{HttpIncidentApi, SubmissionCoordinator, SubmissionOutcome};
use expres_wizard::FlowLauncher;

use cli::{CliArgs, Command, SubmitArgs};
use host::{file_asset, FileGallery, FileRecorder, HostPermissions, NoCamera};

/// Walk the three steps with the given inputs and submit.
///
/// Returns the confirmation message, or `None` if the flow was left before
/// the answer arrived.
async fn run_submit(config: &ExpresConfig, args: &SubmitArgs) -> Result<Option<String>> {
    let mut launcher = FlowLauncher::new();
    let flow = launcher.start_new();
    let session = flow.session().clone();
    tracing::info!(session_id = %session.id(), "Express incident flow started");

    let document = args.document.as_deref().map(file_asset).transpose()?;
    let media = args.media.as_deref().map(file_asset).transpose()?;
    let actions = CaptureActions::new(HostPermissions, NoCamera, FileGallery::new(document, media));

    // Documentation.
    if let Some(ref plate) = args.plate {
        session.set_field(DraftUpdate::PlateText(Some(plate.clone())));
    }
    if args.document.is_some() {
        actions.browse_document(&session).await?;
    }
    flow.sequencer_mut().next()?;

    // Audio.
    if let Some(ref clip) = args.audio {
        let recorder = FileRecorder::new(clip);
        let controller = AudioCaptureController::spawn(recorder, HostPermissions, session.clone());
        controller.start().await?;
        let recorded = controller.stop().await;
        controller.teardown().await?;
        recorded?;
    }
    flow.sequencer_mut().next()?;

    // Media.
    if args.media.is_some() {
        actions.browse_media(&session).await?;
    }
    let user_id = flow.sequencer().finish_gate(args.resolve_user_id())?;

    let coordinator =
        SubmissionCoordinator::new(FsAssetReader::new(), HttpIncidentApi::new(&config.api)?);
    let outcome = coordinator.submit(&session, Some(user_id)).await?;
    launcher.exit();

    Ok(match outcome {
        SubmissionOutcome::Submitted { message } => Some(message),
        SubmissionOutcome::Abandoned => None,
    })
}

/// Configuration as JSON with the session token masked.
fn redacted_config(config: &ExpresConfig) -> Result<String> {
    let mut shown = config.clone();
    if shown.api.bearer_token.is_some() {
        shown.api.bearer_token = Some("********".to_string());
    }
    serde_json::to_string_pretty(&shown).map_err(|e| ExpresError::Serialization(e.to_string()))
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = ExpresConfig::load_or_default(&config_file);

    // Tracing.
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(path = %config_file.display(), "Starting Expres v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::ShowConfig => {
            println!("{}", redacted_config(&config)?);
        }
        Command::Submit(ref submit) => {
            submit.apply_api_overrides(&mut config.api);
            config.validate()?;

            match run_submit(&config, submit).await {
                Ok(Some(message)) => println!("{message}"),
                Ok(None) => tracing::info!("Flow left before the submission finished"),
                Err(e) => {
                    tracing::error!(error = %e, recoverable = e.is_recoverable(), "Submission failed");
                    eprintln!("{}", e.user_message());
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
