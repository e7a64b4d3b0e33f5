//! HTTP client for a Compiler Explorer server

use super::{CompileBackend, CompileRequest, CompileResponse, CompilerInfo};
use crate::error::CetError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Bytes of a bad response body echoed back in errors
pub const BODY_PREVIEW_LIMIT: usize = 500;

/// Timeouts for the underlying HTTP client
#[derive(Debug, Clone, Copy)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}

fn map_http_error(error: reqwest::Error) -> CetError {
    if error.is_timeout() {
        CetError::RequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        CetError::RequestFailed(format!("Connection error: {}", error))
    } else {
        CetError::RequestFailed(format!("HTTP error: {}", error))
    }
}

/// First `limit` bytes of `body`, cut back to a char boundary.
pub fn body_preview(body: &str, limit: usize) -> &str {
    if body.len() <= limit {
        return body;
    }
    let mut end = limit;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

fn parse_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, CetError> {
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(CetError::HttpStatus {
            status: status.as_u16(),
            preview: body_preview(body, BODY_PREVIEW_LIMIT).to_string(),
        }),
        Err(e) => Err(CetError::InvalidResponse {
            message: e.to_string(),
            preview: body_preview(body, BODY_PREVIEW_LIMIT).to_string(),
        }),
    }
}

/// Compiler Explorer REST client
pub struct ExplorerClient {
    client: Client,
    base_url: String,
}

impl ExplorerClient {
    pub fn new(base_url: &str, settings: HttpSettings) -> Result<Self, CetError> {
        let client = Client::builder()
            .no_proxy()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| CetError::RequestFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn compile_url(&self, compiler: &str) -> String {
        format!("{}/api/compiler/{}/compile", self.base_url, compiler)
    }

    pub fn compilers_url(&self, language: &str) -> String {
        format!("{}/api/compilers/{}", self.base_url, language)
    }

    async fn read_body(response: reqwest::Response) -> Result<(StatusCode, String), CetError> {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CetError::RequestFailed(format!("failed to read response: {}", e)))?;
        Ok((status, String::from_utf8_lossy(&bytes).into_owned()))
    }
}

#[async_trait]
impl CompileBackend for ExplorerClient {
    async fn compile(
        &self,
        compiler: &str,
        request: &CompileRequest,
    ) -> Result<CompileResponse, CetError> {
        let url = self.compile_url(compiler);
        debug!(url = %url, files = request.files.len(), "Sending compile request");
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(map_http_error)?;

        let (status, body) = Self::read_body(response).await?;
        let result: CompileResponse = parse_body(status, &body)?;

        info!(
            compiler = %compiler,
            status = status.as_u16(),
            code = result.code,
            asm_lines = result.asm.len(),
            stderr_lines = result.stderr.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Compile request completed"
        );
        Ok(result)
    }

    async fn list_compilers(&self, language: &str) -> Result<Vec<CompilerInfo>, CetError> {
        let url = self.compilers_url(language);
        debug!(url = %url, "Listing compilers");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_http_error)?;

        let (status, body) = Self::read_body(response).await?;
        parse_body(status, &body)
    }

    fn server(&self) -> &str {
        &self.base_url
    }
}
