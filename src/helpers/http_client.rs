use std::io::Read;
use std::time::{Duration, Instant};
use log::{debug, error};
use thiserror::Error;

/// Error types that can occur when interacting with HTTP clients
#[derive(Debug, Error)]
pub enum HttpClientError {
    #[error("HTTP request error: {0}")]
    RequestError(String),

    #[error("HTTP {0} {1}")]
    StatusError(u16, String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Empty response from server")]
    EmptyResponse,
}

/// Raw response body together with the content type reported by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBody {
    pub data: Vec<u8>,
    /// MIME type without parameters, e.g. "image/jpeg"
    pub content_type: Option<String>,
}

/// A trait for HTTP client implementations
/// This version avoids generic methods to enable dynamic dispatch
pub trait HttpClient: Send + Sync + std::fmt::Debug {
    /// Send a GET request and return the body as text
    fn get_text(&self, url: &str) -> Result<String, HttpClientError>;

    /// Send a GET request and return the raw body
    fn get_bytes(&self, url: &str) -> Result<HttpBody, HttpClientError>;

    /// Clone the client as a boxed trait object
    fn clone_box(&self) -> Box<dyn HttpClient>;
}

impl Clone for Box<dyn HttpClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// An HTTP client implementation using ureq
#[derive(Clone, Debug)]
pub struct UreqHttpClient {
    agent: ureq::Agent,
    headers: Vec<(String, String)>,
}

impl UreqHttpClient {
    /// Create a new HTTP client with the specified timeout and user agent
    pub fn new(timeout_secs: u64, user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build();
        Self {
            agent,
            headers: Vec::new(),
        }
    }

    /// Add a header that is sent with every request
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    fn call(&self, url: &str) -> Result<ureq::Response, HttpClientError> {
        debug!("GET request to {}", url);
        let started = Instant::now();

        let mut request = self.agent.get(url);
        for (name, value) in &self.headers {
            request = request.set(name, value);
        }

        match request.call() {
            Ok(resp) => {
                debug!("opening {} took {:.3} seconds", url, started.elapsed().as_secs_f64());
                Ok(resp)
            }
            Err(ureq::Error::Status(code, resp)) => {
                debug!("opening {} failed, took {:.3} seconds", url, started.elapsed().as_secs_f64());
                let err = HttpClientError::StatusError(code, resp.status_text().to_string());
                error!("{}", err);
                Err(err)
            }
            Err(e) => {
                debug!("opening {} failed, took {:.3} seconds", url, started.elapsed().as_secs_f64());
                error!("GET request failed: {}", e);
                Err(HttpClientError::RequestError(e.to_string()))
            }
        }
    }
}

impl HttpClient for UreqHttpClient {
    fn get_text(&self, url: &str) -> Result<String, HttpClientError> {
        let response = self.call(url)?;

        let text = match response.into_string() {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to read response body: {}", e);
                return Err(HttpClientError::ParseError(format!("Failed to read response body: {}", e)));
            }
        };

        if text.is_empty() {
            return Err(HttpClientError::EmptyResponse);
        }
        Ok(text)
    }

    fn get_bytes(&self, url: &str) -> Result<HttpBody, HttpClientError> {
        let response = self.call(url)?;
        let content_type = response
            .header("Content-Type")
            .map(normalize_content_type);

        let mut data = Vec::new();
        if let Err(e) = response.into_reader().read_to_end(&mut data) {
            error!("Failed to read response body: {}", e);
            return Err(HttpClientError::ParseError(format!("Failed to read response body: {}", e)));
        }

        if data.is_empty() {
            return Err(HttpClientError::EmptyResponse);
        }
        debug!("Received {} bytes from {}", data.len(), url);
        Ok(HttpBody { data, content_type })
    }

    fn clone_box(&self) -> Box<dyn HttpClient> {
        Box::new(self.clone())
    }
}

/// Strip parameters such as "; charset=..." and lowercase the MIME type
pub fn normalize_content_type(header: &str) -> String {
    header
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}
