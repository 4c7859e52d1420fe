use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use tracing::{debug, warn};

use crate::config::{CrawlConfig, Pacing, Partition};
use crate::error::{Result, ScrapeError};
use crate::LOG_TARGET;

/// What to request.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// The first search-result page for a health authority.
    Partition(&'a Partition),
    /// A pagination or detail link, absolute or relative to the base URL.
    Url(&'a str),
}

impl std::fmt::Display for Target<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Partition(p) => write!(f, "{}", p.name),
            Target::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Body of a fetched page, or the marker for a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Text(String),
    NotAvailable,
}

impl Page {
    /// Markup to parse. A failed fetch reads as an empty document.
    pub fn markup(&self) -> &str {
        match self {
            Page::Text(text) => text,
            Page::NotAvailable => "",
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Page::Text(_))
    }
}

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Never fails: transport problems come back as `Page::NotAvailable`.
    async fn fetch(&self, target: Target<'_>) -> Page;
}

pub struct PoliteFetcher {
    client: Client,
    base_url: Url,
    pacing: Pacing,
    rng: Mutex<fastrand::Rng>,
}

impl PoliteFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ScrapeError::InvalidBaseUrl(format!("{}: {}", config.base_url, e)))?;

        Ok(Self {
            client,
            base_url,
            pacing: config.pacing.clone(),
            rng: Mutex::new(fastrand::Rng::new()),
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(fastrand::Rng::with_seed(seed));
        self
    }

    async fn pause(&self) {
        let delay = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            self.pacing.sample(&mut rng)
        };
        if !delay.is_zero() {
            debug!(target: LOG_TARGET, "Sleeping {:?} before next request", delay);
            tokio::time::sleep(delay).await;
        }
    }

    fn request(&self, target: Target<'_>) -> std::result::Result<RequestBuilder, String> {
        match target {
            Target::Partition(partition) => Ok(self.client.get(self.base_url.clone()).query(&[
                ("qf_s", String::new()),
                ("qf_hlth_auth", partition.id.to_string()),
                ("qf_city", String::new()),
                ("qf_facility", String::new()),
                ("textDecorations", "True".to_owned()),
                ("textFormat", "HTML".to_owned()),
            ])),
            Target::Url(href) => self
                .base_url
                .join(href)
                .map(|url| self.client.get(url))
                .map_err(|e| e.to_string()),
        }
    }

    async fn read(request: RequestBuilder) -> std::result::Result<String, reqwest::Error> {
        request.send().await?.error_for_status()?.text().await
    }
}

#[async_trait]
impl PageSource for PoliteFetcher {
    async fn fetch(&self, target: Target<'_>) -> Page {
        let request = match self.request(target) {
            Ok(request) => request,
            Err(err) => {
                warn!(
                    target: LOG_TARGET,
                    "{} is not a link under {}: {}", target, self.base_url, err
                );
                return Page::NotAvailable;
            }
        };

        self.pause().await;

        match Self::read(request).await {
            Ok(body) => Page::Text(body),
            Err(err) => {
                warn!(
                    target: LOG_TARGET,
                    "{} has no match from {}: {}", target, self.base_url, err
                );
                Page::NotAvailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    const OK_RESPONSE: &str =
        "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello";
    const ERROR_RESPONSE: &str =
        "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

    /// Accepts one connection, hands back the request head, then answers
    /// with `response` (or holds the connection open when it is `None`).
    async fn serve_once(response: Option<&'static str>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/quickfacts/location", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            match response {
                Some(response) => socket.write_all(response.as_bytes()).await.unwrap(),
                None => tokio::time::sleep(Duration::from_secs(30)).await,
            }
            String::from_utf8_lossy(&head).into_owned()
        });

        (base, handle)
    }

    fn fetcher_for(base: &str, timeout: Duration) -> PoliteFetcher {
        let config = CrawlConfig::default()
            .with_base_url(base)
            .with_pacing(Pacing::none())
            .with_timeout(timeout);
        PoliteFetcher::new(&config).unwrap().with_seed(3)
    }

    fn request_line(head: &str) -> &str {
        head.lines().next().unwrap_or("")
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let config = CrawlConfig::default().with_base_url("not a url");
        assert!(matches!(
            PoliteFetcher::new(&config),
            Err(ScrapeError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn unavailable_page_reads_as_empty_markup() {
        assert_eq!(Page::NotAvailable.markup(), "");
        assert!(!Page::NotAvailable.is_available());
        assert_eq!(Page::Text("<p>x</p>".into()).markup(), "<p>x</p>");
    }

    #[tokio::test]
    async fn partition_query_carries_form_fields_and_user_agent() {
        let (base, server) = serve_once(Some(OK_RESPONSE)).await;
        let fetcher = fetcher_for(&base, Duration::from_secs(5));
        let partition = Partition::new("Vancouver Coastal Health", 16);

        let page = fetcher.fetch(Target::Partition(&partition)).await;
        let head = server.await.unwrap();

        assert_eq!(page, Page::Text("hello".into()));
        assert_eq!(
            request_line(&head),
            "GET /quickfacts/location?qf_s=&qf_hlth_auth=16&qf_city=&qf_facility=\
             &textDecorations=True&textFormat=HTML HTTP/1.1"
        );
        let user_agent = format!("user-agent: {}", crate::config::USER_AGENT).to_lowercase();
        assert!(head.to_lowercase().contains(&user_agent), "{head}");
    }

    #[tokio::test]
    async fn relative_links_resolve_against_base_url() {
        let (base, server) = serve_once(Some(OK_RESPONSE)).await;
        let fetcher = fetcher_for(&base, Duration::from_secs(5));

        let page = fetcher.fetch(Target::Url("details/42?tab=beds")).await;
        let head = server.await.unwrap();

        assert!(page.is_available());
        assert_eq!(
            request_line(&head),
            "GET /quickfacts/details/42?tab=beds HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn error_status_yields_not_available_and_warns() {
        let (base, server) = serve_once(Some(ERROR_RESPONSE)).await;
        let fetcher = fetcher_for(&base, Duration::from_secs(5));
        let logs = Captured::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter("all=warn")
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let page = fetcher.fetch(Target::Url("/facility/7")).await;
        server.await.unwrap();

        assert_eq!(page, Page::NotAvailable);
        let logged = logs.text();
        assert!(logged.contains("WARN"), "{logged}");
        assert!(logged.contains("/facility/7 has no match from"), "{logged}");
    }

    #[tokio::test]
    async fn timeout_yields_not_available() {
        let (base, server) = serve_once(None).await;
        let fetcher = fetcher_for(&base, Duration::from_millis(100));

        let page = tokio::time::timeout(
            Duration::from_secs(5),
            fetcher.fetch(Target::Url("/facility/8")),
        )
        .await
        .expect("fetch outlived its own timeout");
        server.abort();

        assert_eq!(page, Page::NotAvailable);
    }

    #[tokio::test]
    async fn unjoinable_link_is_not_requested() {
        let fetcher = fetcher_for("http://127.0.0.1:1/quickfacts/location", Duration::from_secs(2));
        assert_eq!(
            fetcher.fetch(Target::Url("http://[not-an-ip/")).await,
            Page::NotAvailable
        );
    }

    #[tokio::test]
    async fn refused_connection_yields_not_available() {
        let fetcher = fetcher_for("http://127.0.0.1:1/quickfacts/location", Duration::from_secs(2));
        let partition = Partition::new("Fraser Health", 1);
        assert_eq!(
            fetcher.fetch(Target::Partition(&partition)).await,
            Page::NotAvailable
        );
    }
}
