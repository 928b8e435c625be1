//! Blocking client for OpenAI-compatible chat completions.

use super::request::ChatRequest;
use crate::config::{ConsumerConfig, ProviderConfig};
use crate::conversation::Message;
use crate::error::{ConfigError, TransportError};
use crate::stream::{ReadTransport, Transport};
use reqwest::blocking::{Client, Response};
use tracing::{debug, info, warn};

/// Longest error body kept in [`TransportError::Http`].
const MAX_ERROR_BODY: usize = 2048;

/// HTTP client for a chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    config: ProviderConfig,
}

impl OpenAiClient {
    /// Validate `config` and build the HTTP client.
    pub fn new(config: ProviderConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        // `None` lifts the blocking client's default 30s limit.
        let builder = Client::builder().timeout(config.timeout);
        let client = builder.build().map_err(|e| ConfigError::Invalid {
            field: "client",
            message: e.to_string(),
        })?;

        Ok(Self { client, config })
    }

    /// The configuration.
    pub const fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Send the request and return the response body as a transport.
    ///
    /// Blocks until response headers arrive. A non-success status is reported
    /// as [`TransportError::Http`] with (a prefix of) the body.
    pub fn open_stream(
        &self,
        history: &[Message],
        chunk_size: usize,
    ) -> Result<ReadTransport<Response>, TransportError> {
        let request = ChatRequest::new(self.config.model.clone(), history);
        info!(
            model = %self.config.model,
            messages = request.messages.len(),
            "opening completion stream"
        );

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .header("Accept", "text/event-stream")
            .json(&request)
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|&i| body.is_char_boundary(i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            warn!(status = status.as_u16(), "provider rejected the request");
            return Err(TransportError::Http {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "completion stream open");
        Ok(ReadTransport::with_chunk_size(response, chunk_size))
    }

    /// A transport that connects on its first read.
    ///
    /// Lets the consumer thread, rather than the caller, wait for the
    /// provider; connection failures surface as the turn's transport error.
    /// The body is read `consumer.read_chunk_size` bytes at a time.
    pub fn stream(&self, history: &[Message], consumer: &ConsumerConfig) -> ChatStream {
        ChatStream {
            client: self.clone(),
            history: history.to_vec(),
            chunk_size: consumer.read_chunk_size,
            state: StreamState::Pending,
        }
    }
}

#[derive(Debug)]
enum StreamState {
    Pending,
    Open(ReadTransport<Response>),
    Closed,
}

/// Lazily connected completion stream. See [`OpenAiClient::stream`].
#[derive(Debug)]
pub struct ChatStream {
    client: OpenAiClient,
    history: Vec<Message>,
    chunk_size: usize,
    state: StreamState,
}

impl ChatStream {
    /// Check if the request has been sent.
    pub const fn is_connected(&self) -> bool {
        !matches!(self.state, StreamState::Pending)
    }
}

impl Transport for ChatStream {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        if matches!(self.state, StreamState::Pending) {
            match self.client.open_stream(&self.history, self.chunk_size) {
                Ok(body) => self.state = StreamState::Open(body),
                Err(e) => {
                    self.state = StreamState::Closed;
                    return Err(e);
                }
            }
        }
        match &mut self.state {
            StreamState::Open(body) => body.next_chunk(),
            StreamState::Pending | StreamState::Closed => Err(TransportError::Closed),
        }
    }
}
