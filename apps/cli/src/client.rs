//! HTTP client for `POST /api/recommend-materials`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Serialize)]
struct RecommendRequest<'a> {
    description: &'a str,
    additional_requirements: Option<&'a str>,
}

/// One table row as returned by the API. Property order follows the response body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Material {
    pub name: String,
    pub properties: Map<String, Value>,
    pub application: String,
    pub rationale: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationResult {
    pub product_description: String,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub recommendations: String,
    pub pdf_path: Option<String>,
    pub alt_materials: Option<String>,
    pub manufacturing_considerations: Option<String>,
    pub cost_considerations: Option<String>,
}

impl RecommendationResult {
    /// Optional text sections present in the response, with their display titles.
    pub fn extra_sections(&self) -> Vec<(&'static str, &str)> {
        [
            ("Alternative Materials", &self.alt_materials),
            ("Manufacturing Considerations", &self.manufacturing_considerations),
            ("Cost Considerations", &self.cost_considerations),
        ]
        .into_iter()
        .filter_map(|(title, text)| {
            text.as_deref()
                .filter(|t| !t.trim().is_empty())
                .map(|t| (title, t))
        })
        .collect()
    }
}

/// Either the decoded result or the raw non-200 response.
pub enum Outcome {
    Success(RecommendationResult),
    Failure { status: u16, body: String },
}

pub struct ApiClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint(base_url),
        }
    }

    pub async fn recommend(
        &self,
        description: &str,
        additional_requirements: Option<&str>,
    ) -> Result<Outcome> {
        debug!("POST {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RecommendRequest {
                description,
                additional_requirements,
            })
            .send()
            .await
            .with_context(|| format!("Could not reach the MaterialMind API at {}", self.endpoint))?;

        let status = response.status();
        let body = response.text().await.context("Failed to read response body")?;

        if status != reqwest::StatusCode::OK {
            return Ok(Outcome::Failure {
                status: status.as_u16(),
                body,
            });
        }

        let result = serde_json::from_str(&body).context("Unexpected response format")?;
        Ok(Outcome::Success(result))
    }
}

fn endpoint(base_url: &str) -> String {
    format!("{}/api/recommend-materials", base_url.trim_end_matches('/'))
}
