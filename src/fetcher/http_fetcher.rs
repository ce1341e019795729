use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::app::{FetchError, Result};
use crate::fetcher::Fetcher;

/// Fetches feeds through a CORS-style relay that takes the target URL as a
/// query parameter. An empty proxy prefix fetches feeds directly.
pub struct ProxyFetcher {
    client: Client,
    proxy_url: String,
}

impl ProxyFetcher {
    pub fn new(proxy_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("newsroom/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            proxy_url: proxy_url.trim().to_string(),
        })
    }

    pub fn request_url(&self, feed_url: &str) -> String {
        if self.proxy_url.is_empty() {
            return feed_url.to_string();
        }
        let encoded: String = url::form_urlencoded::byte_serialize(feed_url.as_bytes()).collect();
        format!("{}{}", self.proxy_url, encoded)
    }
}

#[async_trait]
impl Fetcher for ProxyFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        let request_url = self.request_url(url);
        tracing::debug!("GET {}", request_url);

        let response = self.client.get(&request_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Network(format!("HTTP {} for {}", status, url)));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Ignores any proxy settings in the environment so requests reach the
    /// local listener.
    fn local_fetcher(proxy_url: &str) -> ProxyFetcher {
        ProxyFetcher {
            client: Client::builder()
                .timeout(Duration::from_secs(5))
                .no_proxy()
                .build()
                .unwrap(),
            proxy_url: proxy_url.to_string(),
        }
    }

    /// Answers one request with `response` and yields the request line.
    async fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            let request = String::from_utf8_lossy(&request).into_owned();
            request.lines().next().unwrap_or_default().to_string()
        });

        (addr, handle)
    }

    #[test]
    fn test_request_url_encodes_target() {
        let fetcher = ProxyFetcher::new(
            "https://api.allorigins.win/raw?url=",
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(
            fetcher.request_url("https://feeds.bbci.co.uk/news/world/rss.xml?edition=uk&x=1"),
            "https://api.allorigins.win/raw?url=https%3A%2F%2Ffeeds.bbci.co.uk%2Fnews%2Fworld%2Frss.xml%3Fedition%3Duk%26x%3D1"
        );
    }

    #[test]
    fn test_empty_proxy_fetches_directly() {
        let fetcher = ProxyFetcher::new("  ", Duration::from_secs(5)).unwrap();
        assert_eq!(
            fetcher.request_url("http://example.com/rss"),
            "http://example.com/rss"
        );
    }

    #[tokio::test]
    async fn test_success_returns_body() {
        let (addr, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 6\r\nConnection: close\r\n\r\n<rss/>",
        )
        .await;
        let fetcher = local_fetcher("");

        let body = fetcher.fetch(&format!("{}/feed.xml", addr)).await.unwrap();
        assert_eq!(body, b"<rss/>");
        assert_eq!(server.await.unwrap(), "GET /feed.xml HTTP/1.1");
    }

    #[tokio::test]
    async fn test_error_status_is_network_error() {
        let (addr, server) = serve_once(
            "HTTP/1.1 502 Bad Gateway\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let fetcher = local_fetcher(&format!("{}/raw?url=", addr));

        let err = fetcher.fetch("http://example.com/rss").await.unwrap_err();
        match err {
            FetchError::Network(message) => assert!(message.contains("502")),
            other => panic!("expected network error, got {:?}", other),
        }
        assert_eq!(
            server.await.unwrap(),
            "GET /raw?url=http%3A%2F%2Fexample.com%2Frss HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = local_fetcher("");
        let err = fetcher
            .fetch(&format!("http://{}/feed.xml", addr))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }
}
