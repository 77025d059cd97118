use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use serde::Deserialize;

use crate::error::Result;

/// Local paths of everything needed to load a model. Files live in the
/// hf-hub cache and are downloaded on first use.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: Vec<PathBuf>,
}

#[derive(Deserialize)]
struct SafetensorsIndex {
    weight_map: HashMap<String, String>,
}

pub fn fetch(model_id: &str, revision: &str) -> Result<ModelFiles> {
    log::info!("Resolving {model_id}@{revision}");
    let api = Api::new()?;
    let repo = api.repo(Repo::with_revision(
        model_id.to_string(),
        RepoType::Model,
        revision.to_string(),
    ));

    let config = repo.get("config.json")?;
    let tokenizer = repo.get("tokenizer.json")?;
    let weights = match repo.get("model.safetensors") {
        Ok(path) => vec![path],
        Err(e) => {
            log::debug!("No single-file weights ({e}), trying sharded index");
            let index = repo.get("model.safetensors.index.json")?;
            let mut shards = Vec::new();
            for name in shard_names(&std::fs::read_to_string(index)?)? {
                shards.push(repo.get(&name)?);
            }
            shards
        }
    };

    log::debug!("Config: {:?}, weights: {:?}", config, weights);
    Ok(ModelFiles {
        config,
        tokenizer,
        weights,
    })
}

/// Distinct shard files referenced by a `model.safetensors.index.json`, in name order.
fn shard_names(index_json: &str) -> Result<BTreeSet<String>> {
    let index: SafetensorsIndex = serde_json::from_str(index_json)?;
    Ok(index.weight_map.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shards_are_deduplicated_and_ordered() {
        let json = r#"{
            "metadata": {"total_size": 1234},
            "weight_map": {
                "decoder.block.0.weight": "model-00002-of-00002.safetensors",
                "encoder.block.0.weight": "model-00001-of-00002.safetensors",
                "shared.weight": "model-00001-of-00002.safetensors"
            }
        }"#;
        let names: Vec<_> = shard_names(json).unwrap().into_iter().collect();
        assert_eq!(
            names,
            vec![
                "model-00001-of-00002.safetensors",
                "model-00002-of-00002.safetensors"
            ]
        );
    }

    #[test]
    fn malformed_index_is_a_config_error() {
        let err = shard_names(r#"{"metadata": {}}"#).unwrap_err();
        assert!(matches!(err, crate::error::SummarizeError::Config(_)));
    }
}
