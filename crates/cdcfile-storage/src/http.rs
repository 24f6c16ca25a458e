use std::future::Future;

use bytes::Bytes;
use cdcfile_model::{FileRecord, LocationRecord};

use crate::error::{Result, StorageError};
use crate::fetcher::{BlobFetcher, file_name_for};

/// Response of a single GET against blob storage.
#[derive(Clone, Debug, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Asynchronous HTTP client abstraction.
///
/// Implementations follow redirects and apply their own timeouts. Any
/// response that arrives, whatever its status, is `Ok`; only failures to get
/// a response at all are errors.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(&self, url: &str) -> impl Future<Output = std::result::Result<HttpResponse, Self::Error>> + Send;
}

/// Serves `http://` and `https://` locations from a blob container.
pub struct HttpBlobFetcher<C: HttpClient> {
    client: C,
}

impl<C: HttpClient> HttpBlobFetcher<C> {
    pub fn new(client: C) -> Self { Self { client } }
}

impl<C: HttpClient> BlobFetcher for HttpBlobFetcher<C> {
    async fn fetch(&self, location: &LocationRecord) -> Result<Option<FileRecord>> {
        if !matches!(location.scheme(), "http" | "https") {
            return Err(StorageError::UnsupportedScheme {
                scheme: location.scheme().to_string(),
                location: location.to_string(),
            });
        }

        tracing::debug!(%location, "requesting blob");

        let response = self
            .client
            .get(location.url().as_str())
            .await
            .map_err(|e| StorageError::Transport {
                location: location.to_string(),
                source: Box::new(e),
            })?;

        match response.status {
            404 => {
                tracing::warn!(%location, "blob does not exist");
                Ok(None)
            }
            200..=299 => {
                let content_type = match response.content_type {
                    Some(content_type) if !content_type.trim().is_empty() => content_type,
                    _ => {
                        tracing::warn!(%location, "no content type on blob, using default");
                        String::new()
                    }
                };
                let file = FileRecord::new(content_type, response.body).with_file_name(file_name_for(location));
                tracing::info!(%location, %file, "downloaded blob");
                Ok(Some(file))
            }
            status => Err(StorageError::HttpStatus {
                location: location.to_string(),
                status,
            }),
        }
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use super::*;

    /// Production HTTP client implementation using reqwest.
    #[derive(Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new(timeout: Option<Duration>) -> std::result::Result<Self, reqwest::Error> {
            let mut builder = reqwest::Client::builder();
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            Ok(Self {
                client: builder.build()?,
            })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn get(&self, url: &str) -> std::result::Result<HttpResponse, Self::Error> {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            let body = if status.is_success() {
                response.bytes().await?
            } else {
                Bytes::new()
            };

            Ok(HttpResponse {
                status: status.as_u16(),
                content_type,
                body,
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct MockError(String);

    impl std::fmt::Display for MockError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
    }

    impl std::error::Error for MockError {}

    #[derive(Default)]
    struct MockHttpClient {
        responses: HashMap<String, HttpResponse>,
        requested: Mutex<Vec<String>>,
    }

    impl MockHttpClient {
        fn respond(mut self, url: &str, response: HttpResponse) -> Self {
            self.responses.insert(url.to_string(), response);
            self
        }
    }

    impl HttpClient for MockHttpClient {
        type Error = MockError;

        async fn get(&self, url: &str) -> std::result::Result<HttpResponse, Self::Error> {
            self.requested.lock().unwrap().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| MockError(format!("connection refused: {url}")))
        }
    }

    fn ok(content_type: Option<&str>, body: &'static [u8]) -> HttpResponse {
        HttpResponse {
            status: 200,
            content_type: content_type.map(str::to_string),
            body: Bytes::from_static(body),
        }
    }

    #[tokio::test]
    async fn success_builds_file_record() {
        let url = "https://blobs.example/reports/1234/doc1.pdf";
        let fetcher = HttpBlobFetcher::new(MockHttpClient::default().respond(url, ok(Some("application/pdf"), b"%PDF")));

        let file = fetcher.fetch(&LocationRecord::parse(url).unwrap()).await.unwrap().unwrap();
        assert_eq!(file.file_name(), Some("doc1.pdf"));
        assert_eq!(file.content_type(), "application/pdf");
        assert_eq!(&file.content_bytes()[..], b"%PDF");
    }

    #[tokio::test]
    async fn missing_content_type_defaults() {
        let url = "https://blobs.example/a.bin";
        let fetcher = HttpBlobFetcher::new(MockHttpClient::default().respond(url, ok(Some(""), b"x")));
        let file = fetcher.fetch(&LocationRecord::parse(url).unwrap()).await.unwrap().unwrap();
        assert_eq!(file.content_type(), "application/octet-stream");
    }

    #[tokio::test]
    async fn not_found_is_none() {
        let url = "https://blobs.example/gone.pdf";
        let response = HttpResponse {
            status: 404,
            ..HttpResponse::default()
        };
        let fetcher = HttpBlobFetcher::new(MockHttpClient::default().respond(url, response));
        assert!(fetcher.fetch(&LocationRecord::parse(url).unwrap()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn server_error_is_an_error() {
        let url = "https://blobs.example/broken.pdf";
        let response = HttpResponse {
            status: 503,
            ..HttpResponse::default()
        };
        let fetcher = HttpBlobFetcher::new(MockHttpClient::default().respond(url, response));
        let result = fetcher.fetch(&LocationRecord::parse(url).unwrap()).await;
        assert!(matches!(result, Err(StorageError::HttpStatus { status: 503, .. })));
    }

    #[tokio::test]
    async fn transport_failure_is_an_error() {
        let fetcher = HttpBlobFetcher::new(MockHttpClient::default());
        let result = fetcher.fetch(&LocationRecord::parse("https://blobs.example/x.pdf").unwrap()).await;
        assert!(matches!(result, Err(StorageError::Transport { .. })));
    }

    #[tokio::test]
    async fn file_location_is_unsupported() {
        let client = MockHttpClient::default();
        let fetcher = HttpBlobFetcher::new(client);
        let result = fetcher.fetch(&LocationRecord::parse("file:///tmp/x.pdf").unwrap()).await;
        assert!(matches!(result, Err(StorageError::UnsupportedScheme { .. })));
        assert!(fetcher.client.requested.lock().unwrap().is_empty());
    }
}
