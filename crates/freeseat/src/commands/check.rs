//! `freeseat check` — one-shot existence probe

use std::path::Path;

use colored::Colorize;
use freeseat_config::Settings;
use freeseat_core::{
    CHECK_SPACING, DEFAULT_ACCEPTED_STATES, NullRecorder, TargetResolver, TokioSleeper,
    find_satisfying,
};

pub async fn run(env_file: Option<&Path>) -> anyhow::Result<()> {
    let settings = Settings::load(env_file)?;
    let (provider, resolver) = super::provider_and_resolver(&settings)?;

    let target = resolver.resolve(&NullRecorder).await?;
    let found = find_satisfying(
        &provider,
        &target,
        &DEFAULT_ACCEPTED_STATES,
        1,
        CHECK_SPACING,
        &TokioSleeper,
    )
    .await?;

    match found {
        Some(instance) => {
            println!(
                "{} satisfied by {} ({}, {})",
                "✓".green(),
                instance.display_name.bold(),
                instance.id,
                instance.lifecycle_state,
            );
            Ok(())
        }
        None => {
            println!("{} no satisfying {} instance", "✗".red(), target.shape);
            std::process::exit(1);
        }
    }
}
