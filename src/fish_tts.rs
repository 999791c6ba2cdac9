/// Module `fish_tts` - Text-to-Speech (TTS) through the Fish Audio API.
///
/// # Overview
/// Sends the text and voice model to `POST /v1/tts` and streams the MP3 body
/// straight to disk, chunk by chunk, in the order the server delivers it.
///
/// # Dependencies
/// - `reqwest`: HTTP client, with the `stream` feature for `bytes_stream`.
/// - `futures`: `StreamExt` to drain the body.
/// - `serde`: serializes the request body.
///
/// # Error Handling
/// Everything surfaces as `ApiError`; a non-success status carries the body text.
///
use crate::ApiError;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use log::{debug, info};
use reqwest::Client;
use serde::Serialize;
use std::path::Path;
use tokio::io::AsyncWriteExt;

const ENDPOINT: &str = "/v1/tts";

/// Secrets read once at startup and handed to every synthesis call.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub model_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("model_id", &self.model_id)
            .finish()
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Mp3,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Latency {
    Normal,
    Balanced,
}

impl std::fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ResponseFormat::Mp3 => write!(f, "mp3"),
        }
    }
}

impl std::fmt::Display for Latency {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Latency::Normal => write!(f, "normal"),
            Latency::Balanced => write!(f, "balanced"),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct Request {
    pub text: String,
    pub format: ResponseFormat,
    pub mp3_bitrate: u32,
    pub chunk_length: u32,
    pub normalize: bool,
    pub latency: Latency,
}

// Wire body: the request plus the voice model from the credentials.
#[derive(Serialize)]
struct Body<'a> {
    #[serde(flatten)]
    request: &'a Request,
    reference_id: &'a str,
}

/// Send the synthesis request. The returned response still holds the unread audio body.
pub async fn tts(
    client: &Client,
    base_url: &str,
    credentials: &Credentials,
    request: &Request,
) -> Result<reqwest::Response, ApiError> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), ENDPOINT);
    debug!(
        "TTS request to {} with model {} ({} chars, {} @ {}kbps)",
        url,
        credentials.model_id,
        request.text.chars().count(),
        request.format,
        request.mp3_bitrate
    );

    let response = client
        .post(&url)
        .bearer_auth(&credentials.api_key)
        .json(&Body {
            request,
            reference_id: &credentials.model_id,
        })
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Api {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response)
}

/// Append every chunk of `stream` to `path` in arrival order.
///
/// The file is only created once the first non-empty chunk arrives, so an empty
/// body leaves nothing on disk. The handle is flushed and closed before this
/// returns, on success and on error. Returns the number of bytes written.
pub async fn write_chunks<S, E>(stream: S, path: &Path) -> Result<u64, ApiError>
where
    S: Stream<Item = Result<Bytes, E>>,
    ApiError: From<E>,
{
    futures::pin_mut!(stream);
    let mut file: Option<tokio::fs::File> = None;

    let drained: Result<(u64, usize), ApiError> = async {
        let mut written: u64 = 0;
        let mut chunks: usize = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if chunk.is_empty() {
                continue;
            }
            if file.is_none() {
                file = Some(tokio::fs::File::create(path).await?);
            }
            if let Some(out) = file.as_mut() {
                out.write_all(&chunk).await?;
            }
            written += chunk.len() as u64;
            chunks += 1;
        }
        Ok::<_, ApiError>((written, chunks))
    }
    .await;

    // Close on every path; a pending write must land before the caller moves on.
    let closed = match file.take() {
        Some(mut out) => match out.flush().await {
            Ok(()) => out.sync_all().await,
            Err(e) => Err(e),
        },
        None => Ok(()),
    };

    let (written, chunks) = drained?;
    closed?;

    debug!("Wrote {} bytes in {} chunks to {}", written, chunks, path.display());
    Ok(written)
}

/// Synthesize `request` and stream the audio into `path`.
pub async fn tts_to_file(
    client: &Client,
    base_url: &str,
    credentials: &Credentials,
    request: &Request,
    path: &Path,
) -> Result<u64, ApiError> {
    let response = tts(client, base_url, credentials, request).await?;
    let written = write_chunks(response.bytes_stream(), path).await?;
    info!("Synthesized {} bytes of {} into {}", written, request.format, path.display());
    Ok(written)
}
