use crate::error::{Error, Result};
use crate::feed::parser::FeedParser;
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Downloads the raw feed document. Parsing is a separate stage so that
/// transport failures and document failures stay distinguishable.
#[derive(Debug, Clone)]
pub struct FeedFetcher {
    client: Client,
    timeout_duration: Duration,
    user_agent: String,
}

impl Default for FeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .gzip(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            timeout_duration: Duration::from_secs(30),
            user_agent: format!("rss-digest/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_duration = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Fetch the feed document at `url` and return its body as text.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching feed from: {}", url);

        let parser = FeedParser::new();
        parser.validate_feed_url(url)?;

        let response = timeout(self.timeout_duration, self.fetch_response(url))
            .await
            .map_err(|_| Error::Timeout(format!("Request to {} timed out", url)))?;

        let response = response?;

        if !response.status().is_success() {
            return Err(Error::Http(format!(
                "HTTP {} for {}: {}",
                response.status().as_u16(),
                url,
                response.status().canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(format!("Request to {} timed out", url))
            } else {
                Error::Http(format!("Failed to read response body: {}", e))
            }
        })?;

        debug!("Downloaded {} bytes from {}", body.len(), url);

        Ok(body)
    }

    async fn fetch_response(&self, url: &str) -> Result<Response> {
        // The request-level timeout runs until the body completes, so the
        // configured duration bounds the whole transfer.
        let response = self
            .client
            .get(url)
            .timeout(self.timeout_duration)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/rss+xml, application/xml, text/xml, */*")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(format!("Request to {} timed out", url))
                } else {
                    Error::Http(format!("Request failed: {}", e))
                }
            })?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Test Feed</title>
        <description>A test feed</description>
        <link>https://example.com</link>
        <item>
            <title>Test Article</title>
            <link>https://example.com/article</link>
            <description>Test article description</description>
            <pubDate>Wed, 15 Mar 2024 10:00:00 GMT</pubDate>
        </item>
    </channel>
</rss>"#;

    #[tokio::test]
    async fn test_fetch_valid_feed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS_RESPONSE)
                    .insert_header("content-type", "application/rss+xml"),
            )
            .mount(&mock_server)
            .await;

        let fetcher = FeedFetcher::new();
        let feed_url = format!("{}/feed.xml", mock_server.uri());

        let result = fetcher.fetch(&feed_url).await;
        assert!(result.is_ok());

        let body = result.unwrap();
        assert!(body.contains("<title>Test Feed</title>"));
        assert!(body.contains("Test Article"));
    }

    #[tokio::test]
    async fn test_fetch_404_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/notfound.xml"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let fetcher = FeedFetcher::new();
        let feed_url = format!("{}/notfound.xml", mock_server.uri());

        let result = fetcher.fetch(&feed_url).await;
        assert!(result.is_err());

        if let Err(Error::Http(msg)) = result {
            assert!(msg.contains("404"));
        } else {
            panic!("Expected Http error");
        }
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(5))
                    .set_body_string(VALID_RSS_RESPONSE),
            )
            .mount(&mock_server)
            .await;

        let fetcher = FeedFetcher::new().with_timeout(Duration::from_millis(100));
        let feed_url = format!("{}/slow.xml", mock_server.uri());

        let result = fetcher.fetch(&feed_url).await;
        assert!(result.is_err());

        if let Err(Error::Timeout(msg)) = result {
            assert!(msg.contains("timed out"));
        } else {
            panic!("Expected Timeout error");
        }
    }

    #[tokio::test]
    async fn test_stalled_response_body_times_out() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Serve the headers and the first bytes of the document, then hold
        // the socket open without ever finishing the body.
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            stream
                .write_all(
                    b"HTTP/1.1 200 OK\r\n\
                      content-type: application/rss+xml\r\n\
                      content-length: 50000\r\n\
                      \r\n\
                      <?xml version=\"1.0\"?>",
                )
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let fetcher = FeedFetcher::new().with_timeout(Duration::from_millis(250));
        let feed_url = format!("http://{}/feed.xml", addr);

        let result = timeout(Duration::from_secs(5), fetcher.fetch(&feed_url))
            .await
            .expect("fetch must settle within its configured timeout");

        match result {
            Err(Error::Timeout(msg)) => assert!(msg.contains("timed out")),
            other => panic!("Expected Timeout error, got {:?}", other),
        }

        server.abort();
    }

    #[tokio::test]
    async fn test_fetch_with_redirects() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/redirect"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("location", format!("{}/feed.xml", mock_server.uri()).as_str()),
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS_RESPONSE)
                    .insert_header("content-type", "application/rss+xml"),
            )
            .mount(&mock_server)
            .await;

        let fetcher = FeedFetcher::new();
        let redirect_url = format!("{}/redirect", mock_server.uri());

        let result = fetcher.fetch(&redirect_url).await;
        assert!(result.is_ok());
        assert!(result.unwrap().contains("<title>Test Feed</title>"));
    }

    #[tokio::test]
    async fn test_invalid_url_schemes() {
        let fetcher = FeedFetcher::new();

        let invalid_urls = vec![
            "ftp://example.com/feed.xml",
            "file:///local/feed.xml",
            "javascript:alert('xss')",
            "data:text/xml,<rss></rss>",
        ];

        for url in invalid_urls {
            let result = fetcher.fetch(url).await;
            assert!(result.is_err());

            if let Err(Error::InvalidUrl(_)) = result {
                // Expected error type
            } else {
                panic!("Expected InvalidUrl error for {}", url);
            }
        }
    }

    #[tokio::test]
    async fn test_user_agent_header() {
        let mock_server = MockServer::start().await;

        let custom_user_agent = "CustomBot/1.0".to_string();

        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .and(header("user-agent", custom_user_agent.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS_RESPONSE))
            .expect(1)
            .mount(&mock_server)
            .await;

        let fetcher = FeedFetcher::new().with_user_agent(custom_user_agent);
        let feed_url = format!("{}/feed.xml", mock_server.uri());

        let result = fetcher.fetch(&feed_url).await;
        assert!(result.is_ok());
    }
}
