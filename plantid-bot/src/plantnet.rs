use crate::traits::Identifier;
use crate::types::{BotError, Candidate, HttpConfig, IdentificationResult, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://my-api.plantnet.org";

/// Client for the PlantNet identification API.
pub struct PlantNetClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuccessPayload {
    best_match: String,
    #[serde(default)]
    results: Vec<ResultEntry>,
}

#[derive(Deserialize)]
struct ResultEntry {
    score: f64,
    species: Species,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Species {
    scientific_name_without_author: String,
    #[serde(default)]
    common_names: Vec<String>,
}

impl PlantNetClient {
    pub fn new(base_url: &str, api_key: String, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: http.build_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

impl From<SuccessPayload> for IdentificationResult {
    fn from(payload: SuccessPayload) -> Self {
        IdentificationResult {
            best_match: payload.best_match,
            candidates: payload
                .results
                .into_iter()
                .map(|entry| Candidate {
                    common_name: entry.species.common_names.into_iter().next(),
                    scientific_name: entry.species.scientific_name_without_author,
                    score: entry.score,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl Identifier for PlantNetClient {
    async fn identify(&self, image_url: &str) -> Result<IdentificationResult> {
        debug!("Identifying {}", image_url);

        let response = self
            .client
            .get(format!("{}/v2/identify/all", self.base_url))
            .query(&[
                ("api-key", self.api_key.as_str()),
                ("images", image_url),
                ("organs", "auto"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let payload = parse_identify_body(status.as_u16(), &body)?;
        debug!(best_match = %payload.best_match, results = payload.results.len(), "Identification succeeded");
        Ok(payload.into())
    }
}

// The service reports failures as a normal JSON body carrying `statusCode`,
// regardless of the HTTP status. The presence of that key alone decides the
// shape; its value and the message are read leniently.
fn parse_identify_body(http_status: u16, body: &str) -> Result<SuccessPayload> {
    let value: Value = serde_json::from_str(body).map_err(|e| BotError::Api {
        status: http_status,
        message: format!("unrecognised identification response: {}", e),
    })?;

    if let Some(code) = value.get("statusCode") {
        let status_code = code
            .as_u64()
            .and_then(|n| u16::try_from(n).ok())
            .or_else(|| code.as_str().and_then(|s| s.trim().parse().ok()))
            .unwrap_or(http_status);
        let message = ["message", "error"]
            .iter()
            .filter_map(|key| value.get(*key))
            .find(|v| !v.is_null())
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| "no message".to_string());

        warn!(status_code, "Identification unavailable: {}", message);
        return Err(BotError::IdentificationUnavailable {
            status_code,
            message,
        });
    }

    serde_json::from_value(value).map_err(|e| BotError::Api {
        status: http_status,
        message: format!("unrecognised identification response: {}", e),
    })
}
