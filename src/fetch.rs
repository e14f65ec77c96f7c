//! Passage page download.
//!
//! Enable the `fetch` feature (on by default) to use this module.
//!
//! Every request is checked against a host allowlist before it is sent, the
//! body is capped while it streams in, and the page is decoded using the
//! charset the server declares.

use crate::error::{Error, Result};
use crate::html::parse_html_to_markdown_with_options;
use crate::options::ConvertOptions;
use crate::url::{validate_url, ALLOWED_HOSTS};
use bytes::BytesMut;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::time::Duration;
use ::url::Url;

/// Largest page body accepted (5 MiB).
pub const MAX_RESPONSE_SIZE: u64 = 5 * 1024 * 1024;

/// Whole-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("bibleurl/", env!("CARGO_PKG_VERSION"));

/// Downloads passage pages and converts them to Markdown.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> bibleurl::Result<()> {
/// use bibleurl::fetch::PassageFetcher;
///
/// let fetcher = PassageFetcher::new()?;
/// let markdown = fetcher
///     .fetch_markdown("https://www.biblegateway.com/passage/?search=John%203&version=NIV&interface=print")
///     .await?;
/// println!("{markdown}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PassageFetcher {
    client: Client,
    allowed_hosts: Vec<String>,
    max_bytes: u64,
    convert: ConvertOptions,
}

impl PassageFetcher {
    /// Creates a fetcher with the default client, allowlist and size cap.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Uses an existing client; its timeout settings apply as configured.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            allowed_hosts: ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect(),
            max_bytes: MAX_RESPONSE_SIZE,
            convert: ConvertOptions::default(),
        }
    }

    /// Replaces the host allowlist.
    pub fn with_allowed_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the body size cap in bytes.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Sets the options used by [`fetch_markdown`](Self::fetch_markdown).
    pub fn with_convert_options(mut self, options: ConvertOptions) -> Self {
        self.convert = options;
        self
    }

    /// Downloads a page after checking its origin.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let hosts: Vec<&str> = self.allowed_hosts.iter().map(String::as_str).collect();
        let url = validate_url(url, &hosts)?;
        self.download(url).await
    }

    /// Downloads a page and converts it on a blocking thread.
    pub async fn fetch_markdown(&self, url: &str) -> Result<String> {
        let html = self.fetch_html(url).await?;
        let options = self.convert.clone();
        tokio::task::spawn_blocking(move || parse_html_to_markdown_with_options(&html, &options))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?
    }

    async fn download(&self, url: Url) -> Result<String> {
        log::info!("fetching {url}");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        if let Some(size) = response.content_length() {
            if size > self.max_bytes {
                return Err(Error::ResponseTooLarge {
                    size,
                    limit: self.max_bytes,
                });
            }
        }

        let encoding = response_encoding(&response);
        let body = read_limited(response, self.max_bytes).await?;
        log::debug!("received {} bytes ({})", body.len(), encoding.name());
        Ok(decode_body(&body, encoding))
    }
}

/// Reads the body chunk by chunk, stopping as soon as it passes `limit`.
async fn read_limited(mut response: Response, limit: u64) -> Result<BytesMut> {
    let mut body = BytesMut::new();
    while let Some(chunk) = response.chunk().await? {
        append_limited(&mut body, &chunk, limit)?;
    }
    Ok(body)
}

fn append_limited(body: &mut BytesMut, chunk: &[u8], limit: u64) -> Result<()> {
    let size = (body.len() + chunk.len()) as u64;
    if size > limit {
        return Err(Error::ResponseTooLarge { size, limit });
    }
    body.extend_from_slice(chunk);
    Ok(())
}

/// Encoding named by the `charset` parameter of `Content-Type`, else UTF-8.
fn response_encoding(response: &Response) -> &'static Encoding {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8)
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Decodes a body, honoring a byte order mark over the declared encoding.
///
/// Malformed sequences become U+FFFD.
fn decode_body(body: &[u8], encoding: &'static Encoding) -> String {
    let (text, actual, had_errors) = encoding.decode(body);
    if had_errors {
        log::warn!("page is not valid {}; replaced malformed bytes", actual.name());
    }
    text.into_owned()
}
