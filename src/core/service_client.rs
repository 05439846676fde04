// src/core/service_client.rs
//! HTTP client for the hosted functions (currently only `analyze-cv`).

use std::time::Duration;
use tracing::{error, info, trace};

use crate::error::InvocationError;
use crate::types::{AnalyzeCvRequest, AnalyzeCvResponse, CvAnalysis};

pub const ANALYZE_CV_FUNCTION: &str = "analyze-cv";

#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl ServiceClient {
    pub fn new(base_url: impl Into<String>, timeout_seconds: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn function_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    /// POST a JSON payload to a named function and decode its JSON reply.
    pub async fn invoke<T, R>(&self, name: &str, payload: &T) -> Result<R, InvocationError>
    where
        T: serde::Serialize + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let url = self.function_url(name);
        trace!("Invoking function {} at {}", name, url);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|source| InvocationError::Transport {
                function: name.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| InvocationError::Transport {
                function: name.to_string(),
                source,
            })?;

        if !status.is_success() {
            error!("Function {} failed with {}: {}", name, status, body);
            return Err(InvocationError::Status {
                function: name.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| InvocationError::MalformedResponse {
            function: name.to_string(),
            reason: format!("{} (body: {})", e, body),
        })
    }

    /// Ask the analysis function to read the CV at `file_url`.
    pub async fn analyze_cv(&self, file_url: &str) -> Result<CvAnalysis, InvocationError> {
        info!("Requesting CV analysis for {}", file_url);

        let request = AnalyzeCvRequest {
            file_url: file_url.to_string(),
        };
        let response: AnalyzeCvResponse = self.invoke(ANALYZE_CV_FUNCTION, &request).await?;

        match (response.analysis, response.error) {
            (Some(analysis), _) => CvAnalysis::parse(&analysis),
            (None, Some(reason)) => Err(InvocationError::MalformedResponse {
                function: ANALYZE_CV_FUNCTION.to_string(),
                reason,
            }),
            (None, None) => Err(InvocationError::MalformedResponse {
                function: ANALYZE_CV_FUNCTION.to_string(),
                reason: "missing `analysis` field".to_string(),
            }),
        }
    }
}
