use std::collections::HashMap;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::t5;
use serde::Deserialize;
use tokenizers::Tokenizer;

use crate::error::{Result, SummarizeError};
use crate::generation::{self, StopReason};
use crate::hub::{self, ModelFiles};
use crate::pipeline::{GenerationParams, PipelineLoader, Summarizer, SummaryRecord, Task};

const TOP_K: usize = 50;

/// Per-task generation hints shipped in a model's `config.json`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskParams {
    pub prefix: Option<String>,
    pub no_repeat_ngram_size: Option<usize>,
    pub num_beams: Option<usize>,
}

impl TaskParams {
    /// Beam count the checkpoint asks for that greedy or top-k decoding cannot honour.
    fn ignored_beams(&self) -> Option<usize> {
        self.num_beams.filter(|&n| n > 1)
    }
}

#[derive(Deserialize)]
struct TaskSpecificConfig {
    #[serde(default)]
    task_specific_params: Option<HashMap<String, TaskParams>>,
}

fn task_params(config_json: &str, task: Task) -> Result<TaskParams> {
    let cfg: TaskSpecificConfig = serde_json::from_str(config_json)?;
    Ok(cfg
        .task_specific_params
        .and_then(|mut params| params.remove(task.as_str()))
        .unwrap_or_default())
}

fn sampling(params: &GenerationParams) -> Sampling {
    if params.do_sample {
        Sampling::TopK {
            k: TOP_K,
            temperature: 1.0,
        }
    } else {
        Sampling::ArgMax
    }
}

pub fn device(cuda: bool) -> Result<Device> {
    if cuda {
        let device = Device::cuda_if_available(0)?;
        if device.is_cpu() {
            log::warn!("CUDA requested but not available, running on CPU");
        }
        Ok(device)
    } else {
        Ok(Device::Cpu)
    }
}

/// Encoder-decoder summarizer backed by a T5 checkpoint.
pub struct T5Summarizer {
    model: t5::T5ForConditionalGeneration,
    tokenizer: Tokenizer,
    config: t5::Config,
    task: TaskParams,
    device: Device,
}

impl T5Summarizer {
    pub fn load(files: &ModelFiles, device: &Device) -> Result<Self> {
        let raw = std::fs::read_to_string(&files.config)?;
        let config: t5::Config = serde_json::from_str(&raw)?;
        let task = task_params(&raw, Task::Summarization)?;

        let mut tokenizer =
            Tokenizer::from_file(&files.tokenizer).map_err(SummarizeError::tokenizer)?;
        // The whole document goes to the encoder.
        tokenizer
            .with_truncation(None)
            .map_err(SummarizeError::tokenizer)?;

        log::info!("Loading {} weight file(s) on {:?}", files.weights.len(), device);
        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&files.weights, DType::F32, device)? };

        Self::from_parts(vb, tokenizer, config, task, device)
    }

    fn from_parts(
        vb: VarBuilder,
        tokenizer: Tokenizer,
        config: t5::Config,
        task: TaskParams,
        device: &Device,
    ) -> Result<Self> {
        if let Some(beams) = task.ignored_beams() {
            log::warn!(
                "Model suggests num_beams = {beams}; beam search is not supported, \
                 decoding one hypothesis instead"
            );
        }
        let model = t5::T5ForConditionalGeneration::load(vb, &config)?;

        Ok(Self {
            model,
            tokenizer,
            config,
            task,
            device: device.clone(),
        })
    }

    fn generate(
        &mut self,
        input_ids: &[u32],
        params: &GenerationParams,
    ) -> Result<(Vec<u32>, StopReason)> {
        let input = Tensor::new(input_ids, &self.device)?.unsqueeze(0)?;
        let encoder_output = self.model.encode(&input)?;

        let start = self
            .config
            .decoder_start_token_id
            .unwrap_or(self.config.pad_token_id) as u32;
        let eos = self.config.eos_token_id;
        let ngram = self.task.no_repeat_ngram_size.unwrap_or(0);
        let mut processor = LogitsProcessor::from_sampling(params.seed, sampling(params));
        let mut sequence = vec![start];

        let reason = loop {
            if let Some(reason) = generation::length_exhausted(sequence.len(), params.max_length) {
                break reason;
            }

            let decoder_ids = if sequence.len() == 1 || !self.config.use_cache {
                Tensor::new(sequence.as_slice(), &self.device)?.unsqueeze(0)?
            } else {
                let last = sequence[sequence.len() - 1];
                Tensor::new(&[last], &self.device)?.unsqueeze(0)?
            };
            let logits = self
                .model
                .decode(&decoder_ids, &encoder_output)?
                .squeeze(0)?
                .to_dtype(DType::F32)?;

            let mut logits = logits.to_vec1::<f32>()?;
            generation::suppress_eos(&mut logits, eos, sequence.len(), params.min_length);
            let banned = generation::banned_ngram_tokens(&sequence, ngram);
            generation::mask_tokens(&mut logits, &banned);
            let logits = Tensor::new(logits.as_slice(), &self.device)?;

            let next = processor.sample(&logits)?;
            sequence.push(next);
            if let Some(reason) = generation::hit_eos(next, eos) {
                break reason;
            }
        };

        Ok((sequence, reason))
    }
}

impl Summarizer for T5Summarizer {
    fn summarize(
        &mut self,
        document: &str,
        params: &GenerationParams,
    ) -> Result<Vec<SummaryRecord>> {
        let prefix = self.task.prefix.as_deref().unwrap_or("");
        let encoding = self
            .tokenizer
            .encode(format!("{prefix}{document}"), true)
            .map_err(SummarizeError::tokenizer)?;
        let input_ids = encoding.get_ids().to_vec();

        if params.max_length > input_ids.len() {
            log::warn!(
                "max_length is {} but the input is only {} tokens; consider a smaller max_length",
                params.max_length,
                input_ids.len()
            );
        }

        self.model.clear_kv_cache();
        let generated = self.generate(&input_ids, params);
        self.model.clear_kv_cache();
        let (sequence, reason) = generated?;
        log::debug!("Generated {} tokens, stopped on {:?}", sequence.len(), reason);

        let text = self
            .tokenizer
            .decode(&sequence, true)
            .map_err(SummarizeError::tokenizer)?;

        Ok(vec![SummaryRecord {
            summary_text: text.trim().to_string(),
        }])
    }
}

/// Resolves checkpoints from the Hugging Face hub and loads them with candle.
pub struct HubLoader {
    revision: String,
    device: Device,
}

impl HubLoader {
    pub fn new(revision: impl Into<String>, device: Device) -> Self {
        Self {
            revision: revision.into(),
            device,
        }
    }
}

impl PipelineLoader for HubLoader {
    type Pipeline = T5Summarizer;

    fn load(&self, task: Task, model_id: &str) -> Result<T5Summarizer> {
        match task {
            Task::Summarization => {
                let files = hub::fetch(model_id, &self.revision)?;
                T5Summarizer::load(&files, &self.device)
            }
        }
    }
}
