//! Implementation of the `medrag caption` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::inference::{HttpCaptioner, HttpCaptionerConfig};
use crate::cli::output::{output, CommandOutput};
use crate::domain::ports::Captioner;
use crate::infrastructure::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct CaptionArgs {
    /// Path to the X-ray image
    pub image: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct CaptionOutput {
    pub image: PathBuf,
    pub caption: String,
}

impl CommandOutput for CaptionOutput {
    fn to_human(&self) -> String {
        self.caption.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: CaptionArgs, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let captioner = HttpCaptioner::new(HttpCaptionerConfig::from_config(&config.caption));

    let caption = captioner
        .caption(&args.image)
        .await
        .context("Captioning failed")?;

    output(
        &CaptionOutput {
            image: args.image,
            caption,
        },
        json_mode,
    );
    Ok(())
}
