//! HTTP client for the file-server API.
//!
//! Endpoints, all below the configured base URL:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list      | `GET /file?path=<key>` returning `{ "items": [...] }` |
//! | download  | `GET /file?path=<key>&download=true` |
//! | upload    | `POST /file?path=<key>`, multipart field `file` |
//! | move      | `PUT /file?path=<key>&dest=<key>` |
//! | delete    | `DELETE /file?path=<key>` |
//!
//! Any non-success status is an error carrying the status text.

use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Url};
use tokio::time::timeout;
use tracing::{debug, info};

use super::FileApi;
use crate::config::ClientConfig;
use crate::error::{BrowseError, Result};
use crate::fs::{Entry, ListResponse};
use crate::http::HttpClient;
use crate::path::RemotePath;
use crate::progress::{ProgressCallback, TransferProgress};
use crate::upload::{ChunkStream, PendingUpload};

/// File-server API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
    config: ClientConfig,
    endpoint: Url,
}

impl ApiClient {
    /// Create a client from configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = match &config.proxy {
            Some(proxy) => HttpClient::with_proxy(proxy)?,
            None => HttpClient::new(),
        };
        let endpoint = file_endpoint(&config.base_url)?;
        Ok(Self {
            http,
            config,
            endpoint,
        })
    }

    /// Create a client for the server at `base_url` with default settings.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Self::new(ClientConfig::new(base_url))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn file_url(&self, params: &[(&str, &str)]) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().extend_pairs(params);
        url
    }
}

fn file_endpoint(base_url: &str) -> Result<Url> {
    let raw = format!("{}/file", base_url.trim_end_matches('/'));
    Url::parse(&raw).map_err(|e| BrowseError::InvalidUrl(format!("{}: {}", base_url, e)))
}

/// Wrap `chunks` as a request body, reporting progress each time the
/// transport pulls a piece.
fn progress_body(
    chunks: ChunkStream,
    total: u64,
    filename: String,
    mut progress: ProgressCallback,
) -> Body {
    let mut done = 0u64;
    let stream = chunks.map(move |chunk| {
        if let Ok(bytes) = &chunk {
            done += bytes.len() as u64;
            progress(&TransferProgress::new(done, total, filename.clone()));
        }
        chunk
    });
    Body::wrap_stream(stream)
}

#[async_trait]
impl FileApi for ApiClient {
    async fn list(&self, path: &RemotePath) -> Result<Vec<Entry>> {
        debug!(path = %path, "list");
        let request = self
            .http
            .client()
            .get(self.file_url(&[("path", path.to_key().as_str())]));

        let fetch = async {
            let response = self.http.send(request).await?;
            let body = response.text().await?;
            let data: ListResponse = serde_json::from_str(&body)?;
            Ok::<_, BrowseError>(data.items)
        };

        timeout(self.config.list_timeout(), fetch)
            .await
            .map_err(|_| BrowseError::Timeout)?
    }

    async fn upload(
        &self,
        destination: &RemotePath,
        file: PendingUpload,
        progress: ProgressCallback,
    ) -> Result<()> {
        let (total, chunks) = file.source.open(self.config.chunk_size()).await?;
        debug!(file = %file.file_name, bytes = total, destination = %destination, "upload");

        let body = progress_body(chunks, total, file.file_name.clone(), progress);
        let part = Part::stream_with_length(body, total).file_name(file.file_name.clone());
        let form = Form::new().part("file", part);

        let request = self
            .http
            .client()
            .post(self.file_url(&[("path", destination.to_key().as_str())]))
            .multipart(form);
        self.http.send(request).await?;

        info!(file = %file.file_name, destination = %destination, "upload complete");
        Ok(())
    }

    async fn rename(&self, source: &RemotePath, destination: &RemotePath) -> Result<()> {
        debug!(source = %source, destination = %destination, "move");
        let request = self.http.client().put(self.file_url(&[
            ("path", source.to_key().as_str()),
            ("dest", destination.to_key().as_str()),
        ]));
        self.http.send(request).await?;
        Ok(())
    }

    async fn delete(&self, path: &RemotePath) -> Result<()> {
        debug!(path = %path, "delete");
        let request = self
            .http
            .client()
            .delete(self.file_url(&[("path", path.to_key().as_str())]));
        self.http.send(request).await?;
        Ok(())
    }

    fn download_url(&self, path: &RemotePath) -> Result<String> {
        Ok(self
            .file_url(&[("path", path.to_key().as_str()), ("download", "true")])
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    /// Read one request: headers, then the body by length or chunked framing.
    async fn read_request(stream: &mut TcpStream) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            if let Some(end) = find(&buf, b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok());
                let complete = match body_len {
                    Some(len) => buf.len() >= end + 4 + len,
                    None if head.contains("transfer-encoding: chunked") => {
                        buf.ends_with(b"0\r\n\r\n")
                    }
                    None => true,
                };
                if complete {
                    return buf;
                }
            }
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return buf;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
    }

    fn response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    /// Answer one connection per canned response, in order. Yields the base
    /// URL and, once every response is sent, the raw requests received.
    async fn serve(responses: Vec<String>) -> (String, JoinHandle<Vec<Vec<u8>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut requests = Vec::new();
            for response in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                requests.push(read_request(&mut stream).await);
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
            }
            requests
        });
        (format!("http://{}/api", addr), server)
    }

    fn request_line(request: &[u8]) -> String {
        String::from_utf8_lossy(request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn test_list_decodes_items() {
        let body = r#"{"items":[
            {"name":"img","size":0,"modifiedTime":"2024-05-01T10:00:00Z","isDirectory":true},
            {"name":"a.txt","size":12,"modifiedTime":"2024-05-01T12:30:00+02:00","isDirectory":false}
        ]}"#;
        let (base, server) = serve(vec![response("200 OK", body)]).await;
        let client = ApiClient::with_base_url(&base).unwrap();

        let entries = client.list(&RemotePath::parse("docs/img").unwrap()).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_dir());
        assert_eq!(entries[1].name, "a.txt");
        assert_eq!(entries[1].size, 12);
        assert_eq!(
            entries[1].modified_time.to_rfc3339(),
            "2024-05-01T10:30:00+00:00"
        );

        let requests = server.await.unwrap();
        assert_eq!(
            request_line(&requests[0]),
            "GET /api/file?path=docs%2Fimg HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_non_success_status_carries_status_text() {
        let (base, _server) = serve(vec![response("404 Not Found", "")]).await;
        let client = ApiClient::with_base_url(&base).unwrap();

        let err = client.list(&RemotePath::root()).await.unwrap_err();
        assert!(matches!(
            &err,
            BrowseError::Http { status: 404, reason } if reason == "Not Found"
        ));
        assert_eq!(err.to_string(), "HTTP error: 404 Not Found");
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_malformed_listing_is_a_json_error() {
        let (base, _server) = serve(vec![response("200 OK", "<html>oops</html>")]).await;
        let client = ApiClient::with_base_url(&base).unwrap();

        let err = client.list(&RemotePath::root()).await.unwrap_err();
        assert!(matches!(err, BrowseError::JsonError(_)));
    }

    #[tokio::test]
    async fn test_slow_listing_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let config = ClientConfig::new(format!("http://{}/api", addr))
            .with_list_timeout(Duration::from_millis(50));
        let client = ApiClient::new(config).unwrap();
        let err = client.list(&RemotePath::root()).await.unwrap_err();
        assert!(matches!(err, BrowseError::Timeout));
    }

    #[tokio::test]
    async fn test_upload_streams_multipart_with_progress() {
        let (base, server) = serve(vec![response("200 OK", "")]).await;
        let client = ApiClient::with_base_url(&base).unwrap();

        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 253) as u8).collect();
        let file = PendingUpload::from_bytes("big.bin", data.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress: ProgressCallback = Box::new(move |p: &TransferProgress| {
            sink.lock().unwrap().push(p.fraction());
        });

        let inbox = RemotePath::parse("inbox").unwrap();
        client.upload(&inbox, file, progress).await.unwrap();

        // 64 KiB pieces: three full ones and a remainder.
        let fractions = seen.lock().unwrap().clone();
        assert_eq!(fractions.len(), 4);
        assert!(fractions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(fractions.last().copied(), Some(1.0));

        let requests = server.await.unwrap();
        let request = &requests[0];
        assert_eq!(request_line(request), "POST /api/file?path=inbox HTTP/1.1");
        assert!(find(request, b"name=\"file\"; filename=\"big.bin\"").is_some());
        assert!(find(request, &data[..4096]).is_some());
        assert!(request.len() > data.len());
    }

    #[tokio::test]
    async fn test_failed_upload_reports_status() {
        let (base, _server) = serve(vec![response("413 Payload Too Large", "")]).await;
        let client = ApiClient::with_base_url(&base).unwrap();

        let file = PendingUpload::from_bytes("a.txt", b"hello".to_vec());
        let res = client
            .upload(&RemotePath::root(), file, Box::new(|_: &TransferProgress| {}))
            .await;
        assert!(matches!(res, Err(BrowseError::Http { status: 413, .. })));
    }

    #[tokio::test]
    async fn test_move_and_delete_requests() {
        let (base, server) = serve(vec![
            response("200 OK", ""),
            response("200 OK", ""),
            response("500 Internal Server Error", ""),
        ])
        .await;
        let client = ApiClient::with_base_url(&base).unwrap();
        let source = RemotePath::parse("a/x.txt").unwrap();
        let destination = RemotePath::parse("b/x.txt").unwrap();

        client.rename(&source, &destination).await.unwrap();
        client.delete(&destination).await.unwrap();
        let err = client.delete(&destination).await.unwrap_err();
        assert!(matches!(err, BrowseError::Http { status: 500, .. }));

        let requests = server.await.unwrap();
        assert_eq!(
            request_line(&requests[0]),
            "PUT /api/file?path=a%2Fx.txt&dest=b%2Fx.txt HTTP/1.1"
        );
        assert_eq!(
            request_line(&requests[1]),
            "DELETE /api/file?path=b%2Fx.txt HTTP/1.1"
        );
    }

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new(ClientConfig::default()).unwrap();
        assert_eq!(
            client.endpoint.as_str(),
            "http://localhost:8080/file-server/api/file"
        );
    }

    #[test]
    fn test_proxy_creation() {
        let config = ClientConfig::default().with_proxy("http://127.0.0.1:8080");
        assert!(ApiClient::new(config).is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let res = ApiClient::with_base_url("not a url");
        assert!(matches!(res, Err(BrowseError::InvalidUrl(_))));
    }

    #[test]
    fn test_download_url_encodes_path() {
        let client = ApiClient::with_base_url("http://nas:9000/api/").unwrap();
        let path = RemotePath::parse("docs/a b.txt").unwrap();
        assert_eq!(
            client.download_url(&path).unwrap(),
            "http://nas:9000/api/file?path=docs%2Fa+b.txt&download=true"
        );
    }

    #[test]
    fn test_move_url_carries_both_paths() {
        let client = ApiClient::with_base_url("http://nas:9000/api").unwrap();
        let url = client.file_url(&[("path", "a/x.txt"), ("dest", "b/x.txt")]);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("path".to_string(), "a/x.txt".to_string()),
                ("dest".to_string(), "b/x.txt".to_string()),
            ]
        );
    }

    #[test]
    fn test_root_lists_with_empty_path() {
        let client = ApiClient::with_base_url("http://nas:9000/api").unwrap();
        let url = client.file_url(&[("path", RemotePath::root().to_key().as_str())]);
        assert_eq!(url.as_str(), "http://nas:9000/api/file?path=");
    }
}
