use crate::traits::*;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// WebSocket transport backed by tokio-tungstenite
///
/// Every `open()` spawns one task that performs the handshake and then pumps
/// frames between the socket and the [`LinkEndpoint`]. Pings are answered
/// inside the task and never reach the session.
pub struct WsTransport {
    url: String,
    headers: Option<Arc<dyn HeaderProvider>>,
}

impl WsTransport {
    /// Create a transport for `url` (`ws://` or `wss://`)
    ///
    /// Fails if the URL cannot be turned into a handshake request.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        build_request(&url)?;
        Ok(Self { url, headers: None })
    }

    /// Send headers from `provider` with every handshake
    pub fn with_headers(mut self, provider: impl HeaderProvider + 'static) -> Self {
        self.headers = Some(Arc::new(provider));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for WsTransport {
    fn open(&self) -> Result<TransportLink> {
        let request = build_request(&self.url)?;
        let (link, endpoint) = TransportLink::pair();
        let headers = self.headers.clone();

        tokio::spawn(run_link(request, headers, endpoint));
        Ok(link)
    }
}

fn build_request(url: &str) -> Result<Request> {
    url.into_client_request().map_err(|e| SessionError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn apply_headers(request: &mut Request, headers: Headers) {
    for (key, value) in headers {
        match key.parse::<http::header::HeaderName>() {
            Ok(header_name) => match value.parse::<http::header::HeaderValue>() {
                Ok(header_value) => {
                    request.headers_mut().insert(header_name, header_value);
                }
                Err(_) => {
                    warn!("Invalid header value for key '{}': {}", key, value);
                }
            },
            Err(_) => {
                warn!("Invalid header name: {}", key);
            }
        }
    }
}

/// Handshake, then pump frames until either side closes
async fn run_link(
    mut request: Request,
    headers: Option<Arc<dyn HeaderProvider>>,
    mut endpoint: LinkEndpoint,
) {
    if let Some(provider) = headers {
        apply_headers(&mut request, provider.get_headers().await);
        debug!("Connecting with custom headers");
    }

    let uri = request.uri().to_string();
    let connecting = connect_async(request);
    tokio::pin!(connecting);

    let ws_stream = loop {
        tokio::select! {
            result = &mut connecting => match result {
                Ok((ws_stream, _)) => break ws_stream,
                Err(e) => {
                    error!("Failed to connect to {}: {}", uri, e);
                    endpoint.emit(TransportEvent::Error(e.to_string()));
                    endpoint.emit(TransportEvent::abnormal_close("handshake failed"));
                    return;
                }
            },
            command = endpoint.next_command() => match command {
                Some(LinkCommand::Send(_)) => {
                    warn!("Dropping frame sent before handshake completed");
                }
                Some(LinkCommand::Close) | None => {
                    debug!("Link closed during handshake, abandoning {}", uri);
                    return;
                }
            },
        }
    };

    info!("Connected to {}", uri);
    if !endpoint.emit(TransportEvent::Open) {
        debug!("Session detached before open, closing socket");
        let (mut write, _) = ws_stream.split();
        let _ = write.close().await;
        return;
    }

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if !endpoint.emit(TransportEvent::Frame(Frame::Text(text))) {
                        let _ = write.close().await;
                        return;
                    }
                }
                Some(Ok(Message::Binary(data))) => {
                    if !endpoint.emit(TransportEvent::Frame(Frame::Binary(data))) {
                        let _ = write.close().await;
                        return;
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    if let Err(e) = write.send(Message::Pong(data)).await {
                        fail(&endpoint, format!("Failed to send pong: {}", e));
                        return;
                    }
                }
                Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => {}
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = match frame {
                        Some(frame) => (Some(u16::from(frame.code)), frame.reason.to_string()),
                        None => (None, "close frame without status".to_string()),
                    };
                    info!("Server closed {} (code: {:?})", uri, code);
                    endpoint.emit(TransportEvent::Closed { code, reason });
                    return;
                }
                Some(Err(e)) => {
                    fail(&endpoint, e.to_string());
                    return;
                }
                None => {
                    warn!("WebSocket stream closed");
                    endpoint.emit(TransportEvent::abnormal_close("stream ended"));
                    return;
                }
            },
            command = endpoint.next_command() => match command {
                Some(LinkCommand::Send(frame)) => {
                    if let Err(e) = write.send(frame_to_tungstenite(frame)).await {
                        fail(&endpoint, format!("Failed to send frame: {}", e));
                        return;
                    }
                }
                Some(LinkCommand::Close) | None => {
                    debug!("Closing WebSocket to {}", uri);
                    let _ = write.close().await;
                    return;
                }
            },
        }
    }
}

/// Report a fatal socket error followed by the close it implies
fn fail(endpoint: &LinkEndpoint, reason: String) {
    error!("WebSocket error: {}", reason);
    endpoint.emit(TransportEvent::Error(reason));
    endpoint.emit(TransportEvent::abnormal_close("socket error"));
}

fn frame_to_tungstenite(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text),
        Frame::Binary(data) => Message::Binary(data),
    }
}
