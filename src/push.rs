//! Push API client.
//!
//! A batch is delivered in three calls: ask for a file container, upload
//! the `addOrUpdate` body to the returned location, then tell the source to
//! ingest that file.

use crate::config::CoveoConfig;
use crate::diagnostics::{Diagnostic, PushStep};
use crate::document::PreparedDocument;
use crate::error::{CoveoError, Result};
use crate::http::check;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Upload location handed out by `POST .../files`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContainer {
    pub upload_uri: String,
    pub file_id: String,
    /// Headers the upload `PUT` must carry.
    #[serde(default)]
    pub required_headers: BTreeMap<String, String>,
}

impl FileContainer {
    fn header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.required_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| CoveoError::Protocol(format!("invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| CoveoError::Protocol(format!("invalid value for header '{}': {}", name, e)))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchPayload<'a> {
    add_or_update: &'a [PreparedDocument],
}

/// Client for one organization's push source.
#[derive(Clone)]
pub struct PushClient {
    client: Client,
    base: String,
    organization_id: String,
    source_id: String,
    api_key: String,
}

impl PushClient {
    /// Create a push client; a fresh HTTP session per call site.
    pub fn new(config: &CoveoConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base: config.push_api_base(),
            organization_id: config.organization_id.clone(),
            source_id: config.source_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn files_endpoint(&self) -> String {
        format!(
            "{}/push/v1/organizations/{}/files",
            self.base, self.organization_id
        )
    }

    fn batch_endpoint(&self) -> String {
        format!(
            "{}/push/v1/organizations/{}/sources/{}/documents/batch",
            self.base, self.organization_id, self.source_id
        )
    }

    /// Push one batch. Non-success statuses come back as diagnostics;
    /// transport failures are errors.
    ///
    /// Without a file container there is nothing to upload or commit, so the
    /// remaining steps are skipped. A failed upload is still committed.
    pub async fn push_batch(
        &self,
        batch: usize,
        documents: &[PreparedDocument],
    ) -> Result<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();

        let response = self
            .client
            .post(self.files_endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let container: FileContainer = match check(response).await? {
            Ok(response) => {
                let body = response.text().await?;
                serde_json::from_str(&body).map_err(|e| {
                    CoveoError::Protocol(format!("unreadable file container response: {}", e))
                })?
            }
            Err((status, body)) => {
                diagnostics.push(record(batch, PushStep::FileContainer, status, body));
                return Ok(diagnostics);
            }
        };

        debug!(batch, file_id = %container.file_id, documents = documents.len(), "uploading batch");

        let response = self
            .client
            .put(&container.upload_uri)
            .headers(container.header_map()?)
            .json(&BatchPayload {
                add_or_update: documents,
            })
            .send()
            .await?;

        if let Err((status, body)) = check(response).await? {
            diagnostics.push(record(batch, PushStep::Upload, status, body));
        }

        let response = self
            .client
            .put(self.batch_endpoint())
            .query(&[("fileId", container.file_id.as_str())])
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        if let Err((status, body)) = check(response).await? {
            diagnostics.push(record(batch, PushStep::Commit, status, body));
        }

        Ok(diagnostics)
    }
}

fn record(batch: usize, step: PushStep, status: u16, body: String) -> Diagnostic {
    let diagnostic = Diagnostic::Push {
        batch,
        step,
        status,
        body,
    };
    warn!("{}", diagnostic);
    diagnostic
}
