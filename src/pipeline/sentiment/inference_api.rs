//! Blocking client for a Hugging Face style text-classification inference API.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::pipeline::ModelParams;
use crate::error::{PipelineError, Result};
use crate::pipeline::sentiment::backend::{Prediction, SentimentBackend};

/// The subset of a model's `config.json` needed to learn its label vocabulary.
#[derive(Debug, Deserialize)]
pub struct HubModelConfig {
    #[serde(default)]
    pub id2label: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a [String],
    options: InferenceOptions,
}

#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    /// All label scores per input.
    Nested(Vec<Vec<Prediction>>),
    /// Top label per input.
    Flat(Vec<Prediction>),
}

/// A model reachable over HTTP. Constructed through [`InferenceApiBackend::load`].
#[derive(Debug)]
pub struct InferenceApiBackend {
    client: Client,
    model_id: String,
    inference_url: String,
    api_token: Option<String>,
    labels: Vec<String>,
}

impl InferenceApiBackend {
    /// Builds the HTTP client and, when `verify_on_load` is set, fetches the
    /// model's `config.json` from the hub. Every failure is `ModelLoad`.
    pub fn load(params: &ModelParams) -> Result<Self> {
        let model_load = |reason: String| PipelineError::ModelLoad {
            model_id: params.model_id.clone(),
            reason,
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(params.timeout_secs))
            .build()
            .map_err(|e| model_load(format!("failed to build HTTP client: {}", e)))?;

        let api_token = params
            .api_token_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|token| !token.trim().is_empty());

        let mut backend = InferenceApiBackend {
            client,
            model_id: params.model_id.clone(),
            inference_url: format!(
                "{}/{}",
                params.endpoint.trim_end_matches('/'),
                params.model_id
            ),
            api_token,
            labels: Vec::new(),
        };

        if params.verify_on_load {
            let config_url = format!(
                "{}/{}/resolve/main/config.json",
                params.hub_url.trim_end_matches('/'),
                params.model_id
            );
            debug!(url = %config_url, "Fetching model config");
            let response = backend
                .authorize(backend.client.get(&config_url))
                .send()
                .map_err(|e| model_load(format!("request to {} failed: {}", config_url, e)))?;
            let status = response.status();
            if !status.is_success() {
                return Err(model_load(format!("HTTP {} fetching {}", status, config_url)));
            }
            let body = response
                .text()
                .map_err(|e| model_load(format!("failed to read {}: {}", config_url, e)))?;
            let config: HubModelConfig = serde_json::from_str(&body)
                .map_err(|e| model_load(format!("invalid config.json: {}", e)))?;
            if config.id2label.is_empty() {
                return Err(model_load(
                    "config.json declares no id2label; not a classification model".to_string(),
                ));
            }
            backend.labels = config.id2label.into_values().collect();
        }

        info!(
            model_id = %backend.model_id,
            url = %backend.inference_url,
            labels = ?backend.labels,
            "Sentiment model ready"
        );
        Ok(backend)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl SentimentBackend for InferenceApiBackend {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn predict_batch(&self, texts: &[String]) -> Result<Vec<Prediction>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let request = InferenceRequest {
            inputs: texts,
            options: InferenceOptions {
                wait_for_model: true,
            },
        };
        let response = self
            .authorize(self.client.post(&self.inference_url))
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(PipelineError::InferenceError(format!(
                "HTTP {} from {}: {}",
                status,
                self.inference_url,
                body.chars().take(200).collect::<String>()
            )));
        }
        parse_predictions(&body, texts.len())
    }

    fn known_labels(&self) -> Vec<String> {
        self.labels.clone()
    }
}

/// Decodes an inference response into one top prediction per input.
pub fn parse_predictions(body: &str, expected: usize) -> Result<Vec<Prediction>> {
    let response: InferenceResponse = serde_json::from_str(body).map_err(|e| {
        PipelineError::InferenceError(format!("unrecognised inference response: {}", e))
    })?;

    let predictions = match response {
        InferenceResponse::Flat(predictions) => predictions,
        InferenceResponse::Nested(per_input) => per_input
            .into_iter()
            .map(|scores| {
                scores
                    .into_iter()
                    .max_by(|a, b| a.score.total_cmp(&b.score))
                    .ok_or_else(|| {
                        PipelineError::InferenceError("empty score list for an input".to_string())
                    })
            })
            .collect::<Result<Vec<_>>>()?,
    };

    if predictions.len() != expected {
        return Err(PipelineError::InferenceError(format!(
            "model returned {} predictions for {} inputs",
            predictions.len(),
            expected
        )));
    }
    Ok(predictions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_picks_top_label() {
        let body = r#"[
            [{"label":"LABEL_0","score":0.1},{"label":"LABEL_2","score":0.8},{"label":"LABEL_1","score":0.1}],
            [{"label":"LABEL_0","score":0.9},{"label":"LABEL_1","score":0.05}]
        ]"#;
        let predictions = parse_predictions(body, 2).unwrap();
        assert_eq!(predictions[0].label, "LABEL_2");
        assert_eq!(predictions[1].label, "LABEL_0");
    }

    #[test]
    fn test_parse_flat_shape() {
        let body = r#"[{"label":"LABEL_1","score":0.7}]"#;
        let predictions = parse_predictions(body, 1).unwrap();
        assert_eq!(
            predictions,
            vec![Prediction {
                label: "LABEL_1".to_string(),
                score: 0.7
            }]
        );
    }

    #[test]
    fn test_parse_rejects_length_mismatch_and_errors() {
        let body = r#"[{"label":"LABEL_1","score":0.7}]"#;
        assert!(matches!(
            parse_predictions(body, 2),
            Err(PipelineError::InferenceError(_))
        ));
        assert!(matches!(
            parse_predictions(r#"{"error":"Model is loading"}"#, 1),
            Err(PipelineError::InferenceError(_))
        ));
        assert!(matches!(
            parse_predictions("[[]]", 1),
            Err(PipelineError::InferenceError(_))
        ));
    }

    #[test]
    fn test_load_failure_is_model_load_error() {
        let params = ModelParams {
            model_id: "some/model".to_string(),
            hub_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            api_token_env: None,
            ..ModelParams::default()
        };
        match InferenceApiBackend::load(&params) {
            Err(PipelineError::ModelLoad { model_id, .. }) => assert_eq!(model_id, "some/model"),
            other => panic!("Expected ModelLoad, got {:?}", other),
        }
    }

    #[test]
    fn test_load_without_verification_builds_url() {
        let params = ModelParams {
            model_id: "org/model".to_string(),
            endpoint: "http://localhost:8080/models/".to_string(),
            verify_on_load: false,
            api_token_env: None,
            ..ModelParams::default()
        };
        let backend = InferenceApiBackend::load(&params).unwrap();
        assert_eq!(backend.inference_url, "http://localhost:8080/models/org/model");
        assert_eq!(backend.model_id(), "org/model");
        assert!(backend.known_labels().is_empty());
    }
}
