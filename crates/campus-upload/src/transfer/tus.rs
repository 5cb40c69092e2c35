//! tus 1.0.0 client: creation (POST), chunked PATCH and HEAD-based resume.

use std::future::Future;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use campus_core::constants::TUS_VERSION;
use reqwest::{header, RequestBuilder, Response, Url};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::chunk::ChunkReader;
use super::{
    TransferClient, TransferError, TransferEvent, TransferHandle, TransferOptions,
    TransferRequest,
};

const OFFSET_CONTENT_TYPE: &str = "application/offset+octet-stream";

/// Encode `Upload-Metadata`: comma-separated `key base64(value)` pairs.
///
/// Keys with an empty value are sent bare.
pub fn encode_metadata(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            if value.is_empty() {
                key.clone()
            } else {
                format!("{} {}", key, STANDARD.encode(value))
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn header_u64(response: &Response, name: &'static str) -> Result<u64, TransferError> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or(TransferError::MissingHeader(name))
}

async fn expect_success(response: Response) -> Result<Response, TransferError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransferError::UnexpectedStatus {
        status: status.as_u16(),
        body,
    })
}

/// Resolve a possibly relative `Location` against the creation endpoint.
fn resolve_location(endpoint: &str, location: &str) -> Result<String, TransferError> {
    let base = Url::parse(endpoint).map_err(|e| TransferError::InvalidUrl(e.to_string()))?;
    base.join(location)
        .map(|url| url.to_string())
        .map_err(|e| TransferError::InvalidUrl(e.to_string()))
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, TransferError>>,
) -> Result<T, TransferError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TransferError::Cancelled),
        result = fut => result,
    }
}

async fn backoff(cancel: &CancellationToken, delay: Duration) -> Result<(), TransferError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TransferError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

/// HTTP client speaking the tus resumable-upload protocol.
#[derive(Clone)]
pub struct TusClient {
    http: reqwest::Client,
}

impl TusClient {
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransferError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
        })
    }

    fn with_headers(&self, request: RequestBuilder, options: &TransferOptions) -> RequestBuilder {
        options
            .headers
            .iter()
            .fold(request.header("Tus-Resumable", TUS_VERSION), |req, (k, v)| {
                req.header(k.as_str(), v.as_str())
            })
    }

    /// POST to the endpoint and return the absolute upload URL.
    async fn create(&self, options: &TransferOptions, length: u64) -> Result<String, TransferError> {
        let mut request = self
            .with_headers(self.http.post(&options.endpoint), options)
            .header("Upload-Length", length.to_string());
        if !options.metadata.is_empty() {
            request = request.header("Upload-Metadata", encode_metadata(&options.metadata));
        }

        let response = expect_success(request.send().await?).await?;
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(TransferError::MissingHeader("Location"))?;
        resolve_location(&options.endpoint, location)
    }

    /// HEAD the upload URL and return the server's current offset.
    async fn fetch_offset(&self, url: &str, options: &TransferOptions) -> Result<u64, TransferError> {
        let request = self
            .with_headers(self.http.head(url), options)
            .header(header::CACHE_CONTROL, "no-store");
        let response = expect_success(request.send().await?).await?;
        header_u64(&response, "upload-offset")
    }

    /// PATCH one chunk at `offset` and return the offset the server reports.
    async fn patch_chunk(
        &self,
        url: &str,
        offset: u64,
        data: &[u8],
        options: &TransferOptions,
    ) -> Result<u64, TransferError> {
        let request = self
            .with_headers(self.http.patch(url), options)
            .header("Upload-Offset", offset.to_string())
            .header(header::CONTENT_TYPE, OFFSET_CONTENT_TYPE)
            .body(data.to_vec());
        let response = expect_success(request.send().await?).await?;
        header_u64(&response, "upload-offset")
    }

    async fn with_retries<T, F, Fut>(
        &self,
        delays: &[Duration],
        cancel: &CancellationToken,
        mut op: F,
    ) -> Result<T, TransferError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransferError>>,
    {
        let mut attempt = 0;
        loop {
            match cancellable(cancel, op()).await {
                Err(e) if e.is_retryable() && attempt < delays.len() => {
                    warn!(attempt = attempt + 1, error = %e, "Transfer request failed, retrying");
                    backoff(cancel, delays[attempt]).await?;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Run a whole transfer, reporting to `events`. Returns the upload URL.
    pub async fn upload(
        &self,
        request: &TransferRequest,
        events: &mpsc::Sender<TransferEvent>,
        cancel: &CancellationToken,
    ) -> Result<String, TransferError> {
        let options = &request.options;
        let transfer_id = request.transfer_id;
        let mut reader = ChunkReader::open(&request.source.path, options.chunk_size).await?;
        let total = reader.file_size();

        let (upload_url, mut offset) = match &options.resume_url {
            Some(url) => {
                let offset = self
                    .with_retries(&options.retry_delays, cancel, || {
                        self.fetch_offset(url, options)
                    })
                    .await?;
                info!(transfer_id, offset, total, "Resuming upload");
                (url.clone(), offset)
            }
            None => {
                let url = self
                    .with_retries(&options.retry_delays, cancel, || self.create(options, total))
                    .await?;
                info!(transfer_id, upload_url = %url, total, "Upload created");
                let _ = events
                    .send(TransferEvent::Created {
                        transfer_id,
                        upload_url: url.clone(),
                    })
                    .await;
                (url, 0)
            }
        };

        if offset > total {
            return Err(TransferError::OffsetMismatch {
                expected: total,
                actual: offset,
            });
        }
        if offset > 0 {
            let _ = events
                .send(TransferEvent::Progress {
                    transfer_id,
                    bytes_sent: offset,
                    bytes_total: total,
                })
                .await;
        }

        let mut attempt = 0;
        while offset < total {
            reader.seek_to(offset).await?;
            let chunk = reader.next_chunk().await?.ok_or(TransferError::Truncated {
                offset,
                size: total,
            })?;

            match cancellable(cancel, self.patch_chunk(&upload_url, offset, &chunk, options)).await
            {
                Ok(server_offset) => {
                    // The server's offset wins over what we sent.
                    if server_offset <= offset || server_offset > total {
                        return Err(TransferError::OffsetMismatch {
                            expected: offset,
                            actual: server_offset,
                        });
                    }
                    attempt = 0;
                    offset = server_offset;
                    debug!(transfer_id, offset, total, "Chunk acknowledged");
                    let _ = events
                        .send(TransferEvent::Progress {
                            transfer_id,
                            bytes_sent: offset,
                            bytes_total: total,
                        })
                        .await;
                }
                Err(e) if e.is_retryable() && attempt < options.retry_delays.len() => {
                    warn!(transfer_id, attempt = attempt + 1, error = %e, "Chunk failed, retrying");
                    backoff(cancel, options.retry_delays[attempt]).await?;
                    attempt += 1;
                    offset = cancellable(cancel, self.fetch_offset(&upload_url, options)).await?;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(upload_url)
    }
}

impl TransferClient for TusClient {
    fn start(
        &self,
        request: TransferRequest,
        events: mpsc::Sender<TransferEvent>,
    ) -> TransferHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let client = self.clone();
        let transfer_id = request.transfer_id;

        tokio::spawn(async move {
            if token.is_cancelled() {
                return;
            }
            let result = client.upload(&request, &events, &token).await;
            if token.is_cancelled() {
                debug!(transfer_id, "Transfer cancelled");
                return;
            }
            let event = match result {
                Ok(upload_url) => {
                    info!(transfer_id, upload_url = %upload_url, "Upload completed");
                    TransferEvent::Success {
                        transfer_id,
                        upload_url,
                    }
                }
                Err(e) => {
                    warn!(transfer_id, error = %e, "Upload failed");
                    TransferEvent::Error {
                        transfer_id,
                        message: e.to_string(),
                    }
                }
            };
            let _ = events.send(event).await;
        });

        TransferHandle::new(transfer_id, cancel)
    }
}
