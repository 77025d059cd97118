use crate::error::{Result, SummarizeError};
use crate::pipeline::GenerationParams;

pub const TASK: &str = "summarization";
pub const MODEL_ID: &str = "Falconsai/text_summarization";
pub const MIN_LENGTH: usize = 300;
pub const MAX_LENGTH: usize = 1000;
pub const DO_SAMPLE: bool = false;

/// The document summarized on every run. Whitespace is significant: the text
/// keeps its leading blank line and trailing newlines.
pub const ARTICLE: &str = include_str!("article.txt");

/// Everything the driver needs for its one call.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarizationRequest {
    pub document: String,
    pub model_id: String,
    pub min_length: usize,
    pub max_length: usize,
    pub do_sample: bool,
    pub seed: u64,
}

impl Default for SummarizationRequest {
    fn default() -> Self {
        Self {
            document: ARTICLE.to_string(),
            model_id: MODEL_ID.to_string(),
            min_length: MIN_LENGTH,
            max_length: MAX_LENGTH,
            do_sample: DO_SAMPLE,
            seed: 299_792_458,
        }
    }
}

impl SummarizationRequest {
    pub fn validate(&self) -> Result<()> {
        if self.min_length > self.max_length {
            return Err(SummarizeError::InvalidLengthBounds {
                min: self.min_length,
                max: self.max_length,
            });
        }
        Ok(())
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            min_length: self.min_length,
            max_length: self.max_length,
            do_sample: self.do_sample,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_literals() {
        let req = SummarizationRequest::default();
        assert_eq!(req.model_id, "Falconsai/text_summarization");
        assert_eq!(req.min_length, 300);
        assert_eq!(req.max_length, 1000);
        assert!(!req.do_sample);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn article_keeps_surrounding_whitespace() {
        assert!(ARTICLE
            .starts_with(" \nProcess Concept\nA process, which is a program in execution. \n"));
        assert!(ARTICLE.ends_with("a set of associated resources.\n\n"));
        assert!(ARTICLE.contains("processor\u{2019}s registers"));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let req = SummarizationRequest {
            min_length: 50,
            max_length: 10,
            ..Default::default()
        };
        match req.validate() {
            Err(SummarizeError::InvalidLengthBounds { min, max }) => {
                assert_eq!((min, max), (50, 10));
            }
            other => panic!("expected InvalidLengthBounds, got {other:?}"),
        }
    }

    #[test]
    fn equal_bounds_are_accepted() {
        let req = SummarizationRequest {
            min_length: 42,
            max_length: 42,
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }
}
