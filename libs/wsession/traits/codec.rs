//! Frame <-> message codecs
//!
//! A session turns every inbound [`Frame`] into a typed message through a
//! [`MessageCodec`], and encodes outbound messages through the same codec.
//! The default is [`JsonCodec`]: one JSON document per text frame.

use crate::error::{Result, SessionError};
use crate::frame::Frame;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// Trait for translating between transport frames and typed messages
///
/// Decoding runs on the session's event task for every inbound frame, so
/// implementations should be cheap and must not block.
pub trait MessageCodec<T>: Send + Sync + 'static {
    /// Decode one inbound frame
    ///
    /// # Returns
    /// * `Ok(message)` - The frame carried a valid message
    /// * `Err(SessionError)` - Malformed frame; the session records a
    ///   message error and keeps the connection open
    fn decode(&self, frame: &Frame) -> Result<T>;

    /// Encode one outbound message into a frame
    fn encode(&self, message: &T) -> Result<Frame>;
}

/// JSON codec backed by serde_json
pub struct JsonCodec<T> {
    _message: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _message: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MessageCodec<T> for JsonCodec<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    fn decode(&self, frame: &Frame) -> Result<T> {
        let decoded = match frame {
            Frame::Text(text) => serde_json::from_str(text),
            Frame::Binary(data) => serde_json::from_slice(data),
        };
        decoded.map_err(|e| SessionError::Decode(e.to_string()))
    }

    fn encode(&self, message: &T) -> Result<Frame> {
        serde_json::to_string(message)
            .map(Frame::Text)
            .map_err(|e| SessionError::Encode(e.to_string()))
    }
}

/// Pass-through codec for plain text protocols
pub struct TextCodec;

impl MessageCodec<String> for TextCodec {
    fn decode(&self, frame: &Frame) -> Result<String> {
        match frame {
            Frame::Text(text) => Ok(text.clone()),
            Frame::Binary(data) => String::from_utf8(data.clone())
                .map_err(|e| SessionError::Decode(format!("binary frame is not UTF-8: {}", e))),
        }
    }

    fn encode(&self, message: &String) -> Result<Frame> {
        Ok(Frame::Text(message.clone()))
    }
}

/// Codec with a caller supplied decoder and JSON encoding
///
/// # Example
/// ```ignore
/// let codec = FnCodec::new(|frame: &Frame| {
///     frame
///         .as_text()
///         .map(|text| Quote { raw: text.to_uppercase() })
///         .ok_or_else(|| SessionError::Decode("expected text".into()))
/// });
/// ```
pub struct FnCodec<T, F> {
    decoder: F,
    _message: PhantomData<fn() -> T>,
}

impl<T, F> FnCodec<T, F>
where
    F: Fn(&Frame) -> Result<T> + Send + Sync + 'static,
{
    pub fn new(decoder: F) -> Self {
        Self {
            decoder,
            _message: PhantomData,
        }
    }
}

impl<T, F> MessageCodec<T> for FnCodec<T, F>
where
    T: Serialize + 'static,
    F: Fn(&Frame) -> Result<T> + Send + Sync + 'static,
{
    fn decode(&self, frame: &Frame) -> Result<T> {
        (self.decoder)(frame)
    }

    fn encode(&self, message: &T) -> Result<Frame> {
        serde_json::to_string(message)
            .map(Frame::Text)
            .map_err(|e| SessionError::Encode(e.to_string()))
    }
}
