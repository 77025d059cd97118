use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SummarizeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Summarization,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Summarization => "summarization",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = SummarizeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "summarization" => Ok(Task::Summarization),
            other => Err(SummarizeError::UnsupportedTask(other.to_string())),
        }
    }
}

/// Decoding constraints for one call. Lengths are counted in decoder tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationParams {
    pub min_length: usize,
    pub max_length: usize,
    pub do_sample: bool,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRecord {
    pub summary_text: String,
}

/// A loaded summarization capability.
pub trait Summarizer {
    fn summarize(
        &mut self,
        document: &str,
        params: &GenerationParams,
    ) -> Result<Vec<SummaryRecord>>;
}

/// Builds a capability for a task, bound to one pretrained model.
pub trait PipelineLoader {
    type Pipeline: Summarizer;

    fn load(&self, task: Task, model_id: &str) -> Result<Self::Pipeline>;
}

pub fn pipeline<L: PipelineLoader>(
    loader: &L,
    task: &str,
    model_id: &str,
) -> Result<L::Pipeline> {
    let task = task.parse::<Task>()?;
    log::info!("Building {task} pipeline for {model_id}");
    loader.load(task, model_id)
}
