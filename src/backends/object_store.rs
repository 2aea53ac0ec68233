//! Object store backend speaking the S3-compatible path-style HTTP API.
//!
//! The blob lives at `{endpoint}/{bucket}/{key}`. Reads are a plain `GET`,
//! writes a `PUT` of the whole encoded list held in memory.
//!
//! # Missing Objects
//!
//! S3 answers a `GET` for a key that does not exist with `404` and an XML
//! error body whose `<Code>` is `NoSuchKey`. That is reported as `Ok(None)`.
//! Every other `404` is a real error: a `NoSuchBucket` code, or a body that
//! is not an S3 error document at all (a wrong endpoint prefix, a proxy
//! route miss). Starting from an empty list in those cases would silently
//! overwrite the real one on save.
//!
//! # Authentication
//!
//! Requests optionally carry a bearer token. Request signing is left to a
//! fronting proxy or to pre-authorized buckets.

use super::{Backend, BackendError};
use crate::utils::truncate_for_log;
use itertools::Itertools;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

const NO_SUCH_KEY: &str = "NoSuchKey";

/// A [`Backend`] storing the blob as one object in an S3-compatible bucket.
#[derive(Debug, Clone)]
pub struct ObjectStoreBackend {
    client: Client,
    object_url: Url,
    bucket: String,
    key: String,
    token: Option<String>,
}

impl ObjectStoreBackend {
    /// Build a backend for `bucket`/`key` behind `endpoint`.
    ///
    /// Each `/`-separated segment of the key is percent-encoded, so keys like
    /// `journals/articles 2021.json` are addressed correctly.
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client; its timeouts bound every request
    /// * `endpoint` - Base URL of the object store, optionally with a path prefix
    /// * `bucket` - Bucket name, a single path segment
    /// * `key` - Object key; a leading `/` is ignored
    /// * `token` - Optional bearer token sent with every request
    ///
    /// # Returns
    ///
    /// The backend, or [`BackendError::InvalidAddress`] if the endpoint,
    /// bucket, or key cannot form an object URL.
    pub fn new(
        client: Client,
        endpoint: &Url,
        bucket: impl Into<String>,
        key: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self, BackendError> {
        let bucket = bucket.into();
        let key = key.into();
        let object_url = object_url(endpoint, &bucket, &key)?;

        Ok(Self {
            client,
            object_url,
            bucket,
            key,
            token,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn object_url(endpoint: &Url, bucket: &str, key: &str) -> Result<Url, BackendError> {
    let invalid = |reason: &str| BackendError::InvalidAddress {
        address: format!("{endpoint} {bucket}/{key}"),
        reason: reason.to_string(),
    };

    if endpoint.cannot_be_a_base() {
        return Err(invalid("endpoint cannot be a base URL"));
    }
    if bucket.is_empty() || bucket.contains('/') {
        return Err(invalid("bucket must be a single non-empty path segment"));
    }
    let key = key.trim_start_matches('/');
    if key.is_empty() {
        return Err(invalid("object key is empty"));
    }

    let path = std::iter::once(bucket)
        .chain(key.split('/'))
        .map(urlencoding::encode)
        .join("/");

    let base = endpoint.as_str().trim_end_matches('/');
    Url::parse(&format!("{base}/{path}")).map_err(|e| invalid(&e.to_string()))
}

/// The fields of an S3 XML error body that matter here.
#[derive(Debug, Default, PartialEq, Eq)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Pull `<Code>` and `<Message>` out of an S3 error document.
///
/// Anything that is not such a document yields an empty [`ErrorBody`].
fn parse_error_body(body: &str) -> ErrorBody {
    let mut reader = Reader::from_str(body);
    let mut parsed = ErrorBody::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let field = match e.name().as_ref() {
                    b"Code" => &mut parsed.code,
                    b"Message" => &mut parsed.message,
                    _ => continue,
                };
                if let Ok(text) = reader.read_text(e.name()) {
                    let text = text.trim();
                    if !text.is_empty() {
                        *field = Some(text.to_string());
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    parsed
}

async fn status_error(response: reqwest::Response) -> BackendError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed = parse_error_body(&body);
    let message = parsed
        .message
        .unwrap_or_else(|| truncate_for_log(body.trim(), 200));

    BackendError::Status {
        status,
        code: parsed.code,
        message,
    }
}

impl Backend for ObjectStoreBackend {
    fn address(&self) -> String {
        format!("{}/{}", self.bucket, self.key)
    }

    #[instrument(level = "debug", skip_all, fields(bucket = %self.bucket, key = %self.key))]
    async fn read(&self) -> Result<Option<Vec<u8>>, BackendError> {
        let response = self
            .authorize(self.client.get(self.object_url.clone()))
            .send()
            .await?;

        if response.status().is_success() {
            let bytes = response.bytes().await?;
            debug!(bytes = bytes.len(), "Fetched article object");
            return Ok(Some(bytes.to_vec()));
        }

        let error = status_error(response).await;
        match &error {
            BackendError::Status { status, code, .. }
                if *status == StatusCode::NOT_FOUND && code.as_deref() == Some(NO_SUCH_KEY) =>
            {
                debug!("Article object does not exist yet");
                Ok(None)
            }
            _ => {
                warn!(error = %error, "Fetching article object failed");
                Err(error)
            }
        }
    }

    #[instrument(level = "debug", skip_all, fields(bucket = %self.bucket, key = %self.key, bytes = bytes.len()))]
    async fn write(&self, bytes: Vec<u8>) -> Result<(), BackendError> {
        let response = self
            .authorize(self.client.put(self.object_url.clone()))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(bytes)
            .send()
            .await?;

        if response.status().is_success() {
            debug!("Uploaded article object");
            return Ok(());
        }

        let error = status_error(response).await;
        warn!(error = %error, "Uploading article object failed");
        Err(error)
    }
}
