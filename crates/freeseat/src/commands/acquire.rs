//! `freeseat acquire` — the full acquisition run

use std::path::Path;

use colored::Colorize;
use freeseat_config::Settings;
use freeseat_core::{AcquisitionEngine, CHECK_SPACING, EngineConfig, RunOutcome, TokioSleeper};
use freeseat_notify::{CompositeRecorder, FileRecorder, WebhookNotifier};

pub async fn run(env_file: Option<&Path>) -> anyhow::Result<()> {
    let settings = Settings::load(env_file)?;
    let (provider, resolver) = super::provider_and_resolver(&settings)?;

    let recorder = CompositeRecorder::new(
        FileRecorder::new(&settings.artifact_dir),
        settings.webhook_url.as_deref().map(WebhookNotifier::new),
    );
    let engine = AcquisitionEngine::with_config(
        provider,
        recorder,
        TokioSleeper,
        EngineConfig {
            check_tries: settings.check_tries,
            check_spacing: CHECK_SPACING,
        },
    );

    // Racing against ctrl-c keeps shutdown clean: the in-flight sleep is
    // dropped and no artifact is touched mid-run.
    let outcome = tokio::select! {
        outcome = engine.run(&resolver) => outcome,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted before a terminal state");
            anyhow::bail!("interrupted");
        }
    };

    match outcome {
        RunOutcome::Satisfied(instance) => {
            println!(
                "{} {} already satisfies the target ({}, {})",
                "✓".green(),
                instance.display_name.bold(),
                instance.shape,
                instance.lifecycle_state,
            );
            Ok(())
        }
        RunOutcome::Succeeded(Some(instance)) => {
            println!(
                "{} launched {} in {} ({})",
                "✓".green(),
                instance.display_name.bold(),
                instance.availability_domain,
                instance.lifecycle_state,
            );
            Ok(())
        }
        RunOutcome::Succeeded(None) => {
            println!(
                "{} launch accepted; the instance was not visible in the listing yet",
                "✓".green(),
            );
            Ok(())
        }
        RunOutcome::Failed(error) => {
            eprintln!("{} acquisition failed: {error}", "✗".red());
            Err(anyhow::Error::new(error).context("acquisition failed"))
        }
    }
}
