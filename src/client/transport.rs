//! # HTTP Transport
//!
//! The agent's view of the wire: `GET /data`, `PUT /data`, and the SSE
//! change subscription, over a shared `reqwest` client.
//!
//! Fetch and push carry a per-request timeout; a request that does not
//! complete within it is a plain transport failure with no partial effect
//! on the agent. The subscription deliberately has no overall timeout
//! (it is a long-lived stream) - only the handshake is bounded.

use std::pin::Pin;
use std::time::Duration;

use futures_util::{stream, Stream, StreamExt};
use uuid::Uuid;

use crate::client::error::ClientError;
use crate::shared::event::{CLIENT_ID_HEADER, SUBSCRIBE_HEADER};
use crate::shared::{ChannelMessage, Document};

/// Stream of parsed change notices from the subscription.
///
/// The stream ends when the server closes the connection; an `Err` item
/// reports a mid-stream transport failure. Either way the driver treats
/// it as a lost connection.
pub type NoticeStream = Pin<Box<dyn Stream<Item = Result<ChannelMessage, ClientError>> + Send>>;

/// HTTP transport bound to one sync server
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    client_id: Uuid,
    request_timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for `server_url`.
    ///
    /// Generates a fresh client id; the server uses it to avoid echoing
    /// this client's own changes back over the subscription.
    pub fn new(
        server_url: &str,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ClientError::transport(format!("build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: server_url.trim_end_matches('/').to_string(),
            client_id: Uuid::new_v4(),
            request_timeout,
        })
    }

    /// This client's change-origin id
    pub fn client_id(&self) -> Uuid {
        self.client_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET the current document from the server
    pub async fn fetch(&self) -> Result<Document, ClientError> {
        let response = self
            .http
            .get(self.url("/data"))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::transport(format!("GET /data returned {status}")));
        }
        response.json::<Document>().await.map_err(transport_error)
    }

    /// PUT a full replacement document; returns the stamped document
    pub async fn push(&self, document: Document) -> Result<Document, ClientError> {
        let response = self
            .http
            .put(self.url("/data"))
            .timeout(self.request_timeout)
            .header(CLIENT_ID_HEADER, self.client_id.to_string())
            .json(&document)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST {
            let detail = response.text().await.unwrap_or_default();
            return Err(ClientError::rejected(detail));
        }
        if !status.is_success() {
            return Err(ClientError::transport(format!("PUT /data returned {status}")));
        }
        response.json::<Document>().await.map_err(transport_error)
    }

    /// Open the change subscription.
    ///
    /// Resolves once the handshake completes (bounded by the request
    /// timeout); the returned stream then yields notices until the
    /// connection drops.
    pub async fn subscribe(&self) -> Result<NoticeStream, ClientError> {
        let request = self
            .http
            .get(self.url("/events"))
            .header(SUBSCRIBE_HEADER, "")
            .query(&[("client", self.client_id.to_string())])
            .send();

        let response = tokio::time::timeout(self.request_timeout, request)
            .await
            .map_err(|_| ClientError::transport("subscription handshake timed out"))?
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::transport(format!("subscription refused: {status}")));
        }

        let body = response.bytes_stream();
        let notices = stream::unfold(
            (body, String::new()),
            |(mut body, mut buffer)| async move {
                loop {
                    // Emit any complete frame already buffered
                    if let Some(end) = buffer.find("\n\n") {
                        let frame: String = buffer.drain(..end + 2).collect();
                        if let Some(notice) = parse_sse_frame(&frame) {
                            return Some((notice, (body, buffer)));
                        }
                        continue;
                    }
                    match body.next().await {
                        Some(Ok(chunk)) => {
                            buffer.push_str(&String::from_utf8_lossy(&chunk));
                        }
                        Some(Err(e)) => {
                            return Some((
                                Err(ClientError::transport(format!("subscription read: {e}"))),
                                (body, buffer),
                            ));
                        }
                        None => return None,
                    }
                }
            },
        );

        Ok(Box::pin(notices))
    }
}

/// Parse one SSE frame into a notice.
///
/// Returns `None` for keep-alive comments and frames without data lines.
fn parse_sse_frame(frame: &str) -> Option<Result<ChannelMessage, ClientError>> {
    let mut data = String::new();
    for line in frame.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(rest) = line.strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            data.push_str(rest.trim_start());
        }
    }
    if data.is_empty() {
        return None;
    }
    Some(
        serde_json::from_str::<ChannelMessage>(&data)
            .map_err(|e| ClientError::transport(format!("unparseable notice: {e}"))),
    )
}

fn transport_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::transport("request timed out")
    } else {
        ClientError::transport(err.to_string())
    }
}
