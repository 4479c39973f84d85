//! Inference client for a local Ollama server.
//!
//! Unary request/response only: no streaming, no retries.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Sampling options sent with every generate call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateOptions {
    pub num_predict: u32,
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerateOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Anything that can turn a prompt into a reply.
pub trait ReplyModel {
    fn generate(&self, model: &str, prompt: &str, options: &GenerateOptions) -> Result<String>;
}

/// Blocking client for the Ollama HTTP API.
pub struct OllamaClient {
    endpoint: String,
    http_client: reqwest::blocking::Client,
}

impl OllamaClient {
    /// Create a client for the server at `endpoint`, e.g. `http://localhost:11434`.
    pub fn new(endpoint: &str) -> Result<Self> {
        let http_client = reqwest::blocking::Client::builder()
            .user_agent(concat!("k14t/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(300))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Poll `/api/tags` until the server answers or `timeout` passes.
    pub fn wait_for_server(&self, timeout: Duration) -> bool {
        let url = format!("{}/api/tags", self.endpoint);
        let start = Instant::now();

        while start.elapsed() < timeout {
            match self
                .http_client
                .get(&url)
                .timeout(Duration::from_secs(2))
                .send()
            {
                Ok(response) if response.status().is_success() => return true,
                Ok(response) => debug!(status = %response.status(), "server not ready"),
                Err(e) => debug!(error = %e, "server not reachable yet"),
            }
            std::thread::sleep(Duration::from_secs(1));
        }
        false
    }
}

impl ReplyModel for OllamaClient {
    fn generate(&self, model: &str, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let url = format!("{}/api/generate", self.endpoint);
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
            options,
        };

        let started = Instant::now();
        let response: GenerateResponse = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .with_context(|| format!("failed to reach {url}"))?
            .error_for_status()
            .with_context(|| format!("model {model} returned an error"))?
            .json()
            .context("malformed generate response")?;

        info!(
            model,
            infer_ms = started.elapsed().as_millis() as u64,
            "reply generated"
        );
        Ok(response.response.trim().to_string())
    }
}
