//! `freeseat resolve` — resolve identifiers and print them

use std::path::Path;

use colored::Colorize;
use freeseat_config::Settings;
use freeseat_core::TargetResolver;
use freeseat_notify::{CompositeRecorder, FileRecorder};

pub async fn run(env_file: Option<&Path>) -> anyhow::Result<()> {
    let settings = Settings::load(env_file)?;
    let (_provider, resolver) = super::provider_and_resolver(&settings)?;

    // The file recorder catches the image-candidate dump gathered during
    // image resolution
    let recorder = CompositeRecorder::new(FileRecorder::new(&settings.artifact_dir), None);
    let target = resolver.resolve(&recorder).await?;

    println!("{}", "Resolved target".bold());
    println!("  shape:        {}", target.shape);
    println!("  count:        {}", target.desired_count);
    println!("  compartment:  {}", target.compartment_id);
    println!("  subnet:       {}", target.subnet_id);
    println!("  image:        {}", target.image_id);
    for domain in &target.availability_domains {
        println!("  ad:           {domain}");
    }
    Ok(())
}
