use std::io::Write;
use std::time::Instant;

use crate::config::{SummarizationRequest, TASK};
use crate::error::Result;
use crate::pipeline::{pipeline, PipelineLoader, Summarizer};

/// Builds the pipeline, summarizes the request's document once and writes the
/// result structure to `out`. Nothing is written if any step fails.
pub fn run<L: PipelineLoader, W: Write>(
    loader: &L,
    request: &SummarizationRequest,
    out: &mut W,
) -> Result<()> {
    request.validate()?;

    let mut summarizer = pipeline(loader, TASK, &request.model_id)?;

    let started = Instant::now();
    let result = summarizer.summarize(&request.document, &request.generation_params())?;
    let summary_chars: usize = result.iter().map(|r| r.summary_text.chars().count()).sum();
    log::info!(
        "Summarized {} chars into {} chars in {:.2?}",
        request.document.chars().count(),
        summary_chars,
        started.elapsed()
    );

    writeln!(out, "{result:?}")?;
    out.flush()?;
    Ok(())
}
