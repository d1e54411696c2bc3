//! Error type for caught payloads that were not errors themselves.

use std::any::Any;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// An error built from a panic payload that was not an error.
///
/// The original payload is kept as the cause so nothing is lost. It sits behind a [`Mutex`]
/// because a panic payload is only `Send`, while [`BoxError`](crate::BoxError) must also be
/// `Sync`.
#[derive(thiserror::Error)]
#[error("{message}")]
pub struct PayloadError {
    message: String,
    payload: Mutex<Box<dyn Any + Send>>,
}

impl PayloadError {
    pub(crate) fn new(message: String, payload: Box<dyn Any + Send>) -> Self {
        Self {
            message,
            payload: Mutex::new(payload),
        }
    }

    /// The message describing the payload.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if the original payload is of type `T`.
    pub fn payload_is<T: Any>(&self) -> bool {
        self.with_payload(|payload| payload.is::<T>())
    }

    /// Scoped access via a `view_fn` to the original payload.
    pub fn with_payload<F: FnOnce(&(dyn Any + Send + 'static)) -> R, R>(&self, view_fn: F) -> R {
        let payload = self.payload.lock().unwrap_or_else(PoisonError::into_inner);
        view_fn(&**payload)
    }

    /// Mutable access to the original payload.
    pub fn payload_mut(&mut self) -> &mut (dyn Any + Send + 'static) {
        &mut **self
            .payload
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the original payload back as a `T`.
    ///
    /// If the payload is of another type, the error is handed back unchanged.
    pub fn downcast_payload<T: Any>(self) -> Result<T, Self> {
        let Self { message, payload } = self;
        let payload = payload.into_inner().unwrap_or_else(PoisonError::into_inner);

        match payload.downcast::<T>() {
            Ok(payload) => Ok(*payload),
            Err(payload) => Err(Self::new(message, payload)),
        }
    }

    /// Consume the error, returning the original payload.
    pub fn into_payload(self) -> Box<dyn Any + Send> {
        self.payload
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadError")
            .field("message", &self.message)
            .field("payload", &"<opaque>")
            .finish()
    }
}
