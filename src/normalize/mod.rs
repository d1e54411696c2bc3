//! Normalization of caught failures into a single error representation.
//!
//! A wrapped operation fails either by returning `Err(e)` or by panicking. The first already
//! carries an error; the second carries an arbitrary `Box<dyn Any + Send>` payload, which is
//! usually a `&'static str` or `String` from `panic!`, but can be anything handed to
//! [`std::panic::panic_any`]. [`Normalizer`] turns both into a [`BoxError`].

use std::any::Any;
use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Write};
use std::io;
use std::num::{ParseFloatError, ParseIntError};
use std::panic::{self, AssertUnwindSafe};
use std::str::Utf8Error;
use std::string::FromUtf8Error;

use tracing::trace;

pub use self::error::PayloadError;
use crate::BoxError;
use crate::config::{DEFAULT_FALLBACK_MESSAGE, DEFAULT_MESSAGE_PREFIX, TryConfig};

pub mod error;

/// A failure caught from a wrapped operation, before normalization.
pub enum Caught {
    /// The operation returned an error.
    Raised(BoxError),

    /// The operation panicked with the given payload.
    Panicked(Box<dyn Any + Send>),
}

impl fmt::Debug for Caught {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Caught::Raised(err) => f.debug_tuple("Raised").field(err).finish(),
            Caught::Panicked(_) => f.debug_tuple("Panicked").field(&"<payload>").finish(),
        }
    }
}

impl From<BoxError> for Caught {
    fn from(err: BoxError) -> Self {
        Caught::Raised(err)
    }
}

/// Normalize a caught failure into a [`BoxError`] using the default messages.
///
/// See [`Normalizer::normalize`].
pub fn normalize(caught: Caught) -> BoxError {
    Normalizer::default().normalize(caught)
}

/// Turns caught failures into a [`BoxError`].
#[derive(Debug, Clone)]
pub struct Normalizer {
    message_prefix: Cow<'static, str>,
    fallback_message: Cow<'static, str>,
}

impl Normalizer {
    /// Create a normalizer with the messages of the provided `config`.
    pub fn from_config(config: &TryConfig) -> Self {
        Self {
            message_prefix: Cow::Owned(config.message_prefix.clone()),
            fallback_message: Cow::Owned(config.fallback_message.clone()),
        }
    }

    /// Normalize a caught failure.
    ///
    /// Errors are passed through without any wrapping:
    /// * [`Caught::Raised`] is returned as is.
    /// * A panic payload that is a [`BoxError`] is unboxed and returned as is.
    /// * A panic payload that is a [`PayloadError`], an [`anyhow::Error`] or a common std error
    ///   ([`io::Error`], [`fmt::Error`], parse and UTF-8 errors) is converted into a [`BoxError`]
    ///   directly.
    ///
    /// Any other payload becomes a [`PayloadError`] holding the payload. Its message is the
    /// stringified payload, or the fallback message if the payload has no usable string form.
    ///
    /// This never panics, even if the payload's own [`Display`](fmt::Display) impl does.
    pub fn normalize(&self, caught: Caught) -> BoxError {
        let payload = match caught {
            Caught::Raised(err) => return err,
            Caught::Panicked(payload) => payload,
        };

        let payload = match payload.downcast::<BoxError>() {
            Ok(err) => return *err,
            Err(payload) => payload,
        };

        let payload = match payload.downcast::<PayloadError>() {
            Ok(err) => return err,
            Err(payload) => payload,
        };

        let payload = match payload.downcast::<anyhow::Error>() {
            Ok(err) => return (*err).into(),
            Err(payload) => payload,
        };

        let payload = match downcast_std_error(payload) {
            Ok(err) => return err,
            Err(payload) => payload,
        };

        let message = match stringify(&*payload) {
            Some(text) => format!("{}{}", self.message_prefix, text),
            None => self.fallback_message.to_string(),
        };

        trace!(message = %message, "Wrapped non-error panic payload");

        Box::new(PayloadError::new(message, payload))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            message_prefix: Cow::Borrowed(DEFAULT_MESSAGE_PREFIX),
            fallback_message: Cow::Borrowed(DEFAULT_FALLBACK_MESSAGE),
        }
    }
}

/// Extract a payload's string form, if it has one.
fn stringify(payload: &(dyn Any + Send + 'static)) -> Option<String> {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        return Some((*text).to_string());
    }
    if let Some(text) = payload.downcast_ref::<String>() {
        return Some(text.clone());
    }
    if let Some(text) = payload.downcast_ref::<Box<str>>() {
        return Some(text.to_string());
    }
    if let Some(text) = payload.downcast_ref::<Cow<'static, str>>() {
        return Some(text.to_string());
    }
    if let Some(display) = payload.downcast_ref::<Box<dyn fmt::Display + Send>>() {
        return display_to_string(&**display);
    }
    if let Some(display) = payload.downcast_ref::<Box<dyn fmt::Display + Send + Sync>>() {
        return display_to_string(&**display);
    }
    if let Some(err) = payload.downcast_ref::<Box<dyn Error + Send>>() {
        return display_to_string(&**err);
    }

    stringify_primitive(payload)
}

macro_rules! std_errors {
    ($($ty:ty),*) => {
        /// Move a std error payload into a [`BoxError`], handing anything else back.
        fn downcast_std_error(
            payload: Box<dyn Any + Send>,
        ) -> Result<BoxError, Box<dyn Any + Send>> {
            $(
                let payload = match payload.downcast::<$ty>() {
                    Ok(err) => return Ok(err as BoxError),
                    Err(payload) => payload,
                };
            )*
            Err(payload)
        }
    };
}

std_errors!(io::Error, fmt::Error, ParseIntError, ParseFloatError, Utf8Error, FromUtf8Error);

macro_rules! stringify_primitives {
    ($($ty:ty),*) => {
        fn stringify_primitive(payload: &(dyn Any + Send + 'static)) -> Option<String> {
            $(
                if let Some(value) = payload.downcast_ref::<$ty>() {
                    return Some(value.to_string());
                }
            )*
            None
        }
    };
}

stringify_primitives!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char
);

/// Render a foreign [`Display`](fmt::Display) impl, treating a formatting error or a panic as
/// "no string form".
pub(crate) fn display_to_string<D: fmt::Display + ?Sized>(display: &D) -> Option<String> {
    panic::catch_unwind(AssertUnwindSafe(|| {
        let mut text = String::new();
        write!(text, "{display}").ok().map(|()| text)
    }))
    .ok()
    .flatten()
}

/// Log-safe rendering of an error: its own [`Display`](fmt::Display) output, or `fallback` if
/// that fails or panics.
pub(crate) struct Guarded<'a, D: ?Sized> {
    display: &'a D,
    fallback: &'a str,
}

impl<'a, D: fmt::Display + ?Sized> Guarded<'a, D> {
    pub(crate) fn new(display: &'a D, fallback: &'a str) -> Self {
        Self { display, fallback }
    }
}

impl<D: fmt::Display + ?Sized> fmt::Display for Guarded<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match display_to_string(self.display) {
            Some(text) => f.write_str(&text),
            None => f.write_str(self.fallback),
        }
    }
}
