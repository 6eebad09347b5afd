use std::future::Future;
use std::time::Duration;

use tracing::debug;
use wreq::Client;
use wreq_util::Emulation;

use crate::error::{self, FlightError};

/// Fetches a URL and returns the response body.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<String, FlightError>> + Send;
}

#[derive(Clone)]
pub struct FetchOptions {
    pub proxy: Option<String>,
    pub timeout: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: 30,
        }
    }
}

/// HTTP transport backed by a browser-emulating `wreq` client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(options: &FetchOptions) -> Result<Self, FlightError> {
        let mut builder = Client::builder()
            .emulation(Emulation::Chrome137)
            .timeout(Duration::from_secs(options.timeout));

        if let Some(ref proxy) = options.proxy {
            builder = builder.proxy(wreq::Proxy::all(proxy).map_err(error::from_http_error)?);
        }

        let client = builder.build().map_err(error::from_http_error)?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, FlightError> {
        debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(error::from_http_error)?;

        let status = response.status().as_u16();
        match status {
            200..=299 => {}
            429 => return Err(FlightError::RateLimited),
            403 => return Err(FlightError::Blocked(status)),
            _ => return Err(FlightError::HttpStatus(status)),
        }

        response.text().await.map_err(error::from_http_error)
    }
}
