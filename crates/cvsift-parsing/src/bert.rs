//! BERT token-classification recognizer running on candle.
//!
//! Loads a Hugging Face style model directory:
//!
//! - `config.json` with `hidden_size` and an `id2label` map (`B-PER`, `I-SKILL`, ...)
//! - `tokenizer.json`
//! - `model.safetensors`, or `pytorch_model.bin` as a fallback
//!
//! Weights are expected under the `bert.` and `classifier.` prefixes, as
//! saved by a `BertForTokenClassification` head.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use candle_core::{D, DType, Device, Module, Tensor};
use candle_nn::{Linear, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use serde::Deserialize;
use tokenizers::Tokenizer;

use crate::ner::{Entity, EntityRecognizer, ModelError};
use crate::tagging::{TaggedToken, chunk_lines, decode_bio};

/// Position embeddings of BERT-base models stop here.
const MAX_TOKENS: usize = 512;
/// Text is tagged in line-aligned pieces of roughly this many bytes.
const CHUNK_BYTES: usize = 1_000;

/// The part of `config.json` the classification head needs.
#[derive(Debug, Deserialize)]
struct HeadConfig {
    hidden_size: usize,
    id2label: BTreeMap<String, String>,
}

pub struct BertEntityModel {
    bert: BertModel,
    classifier: Linear,
    tokenizer: Tokenizer,
    labels: Vec<String>,
    device: Device,
}

impl std::fmt::Debug for BertEntityModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BertEntityModel")
            .field("labels", &self.labels)
            .field("device", &self.device)
            .finish()
    }
}

impl BertEntityModel {
    /// Load the model in `dir` onto the CPU.
    pub fn from_dir(dir: &Path) -> Result<Self, ModelError> {
        let device = Device::Cpu;

        let config_path = dir.join("config.json");
        let raw = read_to_string(&config_path)?;
        let head: HeadConfig = serde_json::from_str(&raw).map_err(|source| ModelError::Config {
            path: config_path.clone(),
            source,
        })?;
        let labels = label_list(&head.id2label).map_err(|reason| ModelError::Labels {
            path: config_path.clone(),
            reason,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|source| ModelError::Config {
            path: config_path.clone(),
            source,
        })?;

        let tokenizer_path = dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| ModelError::Tokenizer(format!("{}: {e}", tokenizer_path.display())))?;

        let tensors = load_weights(dir, &device)?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device);
        let bert = BertModel::load(vb.pp("bert"), &config)?;
        let classifier = candle_nn::linear(head.hidden_size, labels.len(), vb.pp("classifier"))?;

        tracing::debug!(path = %dir.display(), labels = labels.len(), "loaded token-classification model");
        Ok(Self {
            bert,
            classifier,
            tokenizer,
            labels,
            device,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Tag every token of one chunk.
    fn tag_chunk(&self, chunk: &str) -> Result<Vec<TaggedToken>, ModelError> {
        let encoding = self
            .tokenizer
            .encode(chunk, true)
            .map_err(|e| ModelError::Tokenizer(e.to_string()))?;
        let n = encoding.get_ids().len().min(MAX_TOKENS);
        if n == 0 {
            return Ok(Vec::new());
        }

        let input_ids = Tensor::new(&encoding.get_ids()[..n], &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.bert.forward(&input_ids, &token_type_ids, None)?;
        let logits = self.classifier.forward(&hidden)?;
        let predictions = logits.squeeze(0)?.argmax(D::Minus1)?.to_vec1::<u32>()?;

        let offsets = encoding.get_offsets();
        let words = encoding.get_word_ids();
        let special = encoding.get_special_tokens_mask();

        Ok(predictions
            .into_iter()
            .enumerate()
            .map(|(i, label)| TaggedToken {
                tag: self
                    .labels
                    .get(label as usize)
                    .cloned()
                    .unwrap_or_else(|| "O".to_string()),
                start: offsets[i].0,
                end: offsets[i].1,
                word: if special[i] == 1 { None } else { words[i] },
            })
            .collect())
    }
}

impl EntityRecognizer for BertEntityModel {
    fn recognize(&self, text: &str) -> Vec<Entity> {
        let mut entities = Vec::new();
        for (offset, chunk) in chunk_lines(text, CHUNK_BYTES) {
            match self.tag_chunk(chunk) {
                Ok(tokens) => entities.extend(decode_bio(chunk, &tokens).into_iter().map(|e| {
                    Entity {
                        start: e.start + offset,
                        end: e.end + offset,
                        ..e
                    }
                })),
                Err(e) => {
                    tracing::warn!(offset, error = %e, "entity tagging failed for chunk");
                }
            }
        }
        entities
    }
}

fn read_to_string(path: &Path) -> Result<String, ModelError> {
    std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_weights(dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>, ModelError> {
    let safetensors = dir.join("model.safetensors");
    if safetensors.exists() {
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let pickle: PathBuf = dir.join("pytorch_model.bin");
    if pickle.exists() {
        return Ok(candle_core::pickle::read_all(&pickle)?.into_iter().collect());
    }
    Err(ModelError::Io {
        path: safetensors,
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no model weights found"),
    })
}

/// Order `id2label` (`{"0": "O", "1": "B-PER", ...}`) by id, requiring the
/// ids to be exactly `0..n`.
fn label_list(id2label: &BTreeMap<String, String>) -> Result<Vec<String>, String> {
    let mut by_id = BTreeMap::new();
    for (id, label) in id2label {
        let id: usize = id
            .parse()
            .map_err(|_| format!("label id {id:?} is not a number"))?;
        by_id.insert(id, label.clone());
    }
    if by_id.is_empty() {
        return Err("id2label is empty".to_string());
    }
    if by_id.keys().copied().ne(0..by_id.len()) {
        return Err("label ids are not contiguous from 0".to_string());
    }
    Ok(by_id.into_values().collect())
}
