//! Type-state markers for the builder pattern
//!
//! These types track at compile time whether a transport has been set,
//! so `build()` is only callable on a complete builder.

use std::marker::PhantomData;

/// Marker trait for transport state
pub trait TransportState {}

/// Transport has not been set
pub struct NoTransport;
impl TransportState for NoTransport {}

/// Transport has been set
pub struct HasTransport;
impl TransportState for HasTransport {}

/// Phantom marker to prevent direct construction
#[derive(Debug, Clone, Copy)]
pub struct TypeState<Tr> {
    _transport: PhantomData<Tr>,
}

impl<Tr> TypeState<Tr> {
    pub(crate) fn new() -> Self {
        Self {
            _transport: PhantomData,
        }
    }
}

impl<Tr> Default for TypeState<Tr> {
    fn default() -> Self {
        Self::new()
    }
}
