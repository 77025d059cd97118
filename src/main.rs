use anyhow::{Context, Result};
use clap::Parser;
use std::io;

mod config;
mod driver;
mod error;
mod generation;
mod hub;
mod model;
mod pipeline;

use config::SummarizationRequest;
use model::HubLoader;

/// Summarizes a built-in article with a pretrained T5 model.
/// With no arguments, runs the fixed request.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Hugging Face model id
    #[arg(long, default_value = config::MODEL_ID)]
    model: String,

    /// Model revision (branch, tag or commit)
    #[arg(long, default_value = "main")]
    revision: String,

    /// Minimum summary length in tokens
    #[arg(long, default_value_t = config::MIN_LENGTH)]
    min_length: usize,

    /// Maximum summary length in tokens
    #[arg(long, default_value_t = config::MAX_LENGTH)]
    max_length: usize,

    /// Sample tokens instead of greedy decoding
    #[arg(long, default_value_t = config::DO_SAMPLE)]
    do_sample: bool,

    /// Seed for sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Run on the first CUDA device if one is available
    #[arg(long)]
    cuda: bool,
}

impl Args {
    fn into_request(self) -> SummarizationRequest {
        let defaults = SummarizationRequest::default();
        SummarizationRequest {
            model_id: self.model,
            min_length: self.min_length,
            max_length: self.max_length,
            do_sample: self.do_sample,
            seed: self.seed.unwrap_or(defaults.seed),
            ..defaults
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let device = model::device(args.cuda).context("Failed to select device")?;
    let loader = HubLoader::new(args.revision.clone(), device);
    let request = args.into_request();

    let stdout = io::stdout();
    driver::run(&loader, &request, &mut stdout.lock()).context("Summarization failed")?;

    Ok(())
}
