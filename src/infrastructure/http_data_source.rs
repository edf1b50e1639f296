// Experiment server client over the JSON HTTP API
use crate::application::data_source::{ExperimentDataSource, GraphDataEntry, MetricSourceQuery};
use crate::domain::catalog::CatalogPayload;
use crate::domain::mapping::SeriesRequest;
use crate::domain::view::DefaultView;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const SUCCESS: &str = "Success";

#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: reqwest::Client,
    base_url: String,
}

/// Response wrapper used by the data endpoints
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct MetricListResponse {
    #[serde(default)]
    metrics: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ExperimentListResponse {
    result: String,
    #[serde(default)]
    experiments: Vec<String>,
}

impl HttpDataSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.url(path))
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", path))?;

        Self::decode(path, response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", path))?;

        let envelope: Envelope<T> = Self::decode(path, response).await?;
        unwrap_envelope(envelope)
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{} failed with status {}: {}", path, status, body);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {}", path))
    }
}

/// The server reports failures in-band; anything but "Success" carries the reason
fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T> {
    if envelope.result != SUCCESS {
        anyhow::bail!("{}", envelope.result);
    }
    envelope
        .data
        .context("Server reported success without a data field")
}

#[async_trait]
impl ExperimentDataSource for HttpDataSource {
    async fn fetch_metric_list(&self) -> Result<Vec<String>> {
        let response: MetricListResponse = self.get("/api/metrics").await?;
        Ok(response.metrics)
    }

    async fn fetch_experiment_list(&self) -> Result<Vec<String>> {
        let response: ExperimentListResponse = self.get("/api/experiments").await?;
        if response.result != SUCCESS {
            anyhow::bail!("{}", response.result);
        }
        Ok(response.experiments)
    }

    async fn fetch_default_view(&self) -> Result<DefaultView> {
        self.get("/api/default").await
    }

    async fn fetch_metric_data_sources(&self, query: &MetricSourceQuery) -> Result<CatalogPayload> {
        self.post("/api/metrics/get/", query).await
    }

    async fn fetch_graph_data(&self, requests: &[SeriesRequest]) -> Result<Vec<GraphDataEntry>> {
        self.post("/api/graph/", requests).await
    }
}
