//! # try-tuple
//!
//! Call operations that may fail without letting the failure unwind through the caller.
//!
//! A wrapped operation fails either by returning `Err(e)` or by panicking. Both end up in the
//! error slot of a [`WrappedResult`], normalized to a [`BoxError`]:
//!
//! * returned errors, and panic payloads that are errors, are passed through unchanged;
//! * any other panic payload (`panic!("boom")`, `panic_any(42)`) becomes a [`PayloadError`]
//!   whose message is the stringified payload and which keeps the payload itself.
//!
//! Arguments are forwarded as a tuple, see [`Operation`].
//!
//! ## Synchronous operations
//!
//! ```
//! use try_tuple::{IntoTuple, try_s};
//!
//! let (error, json) = try_s(serde_json::from_str::<serde_json::Value>)
//!     .call(("{ \"hello: \"world\" }",))
//!     .into_tuple();
//!
//! assert!(error.unwrap().is::<serde_json::Error>());
//! assert!(json.is_none());
//! ```
//!
//! ## Asynchronous operations
//!
//! ```
//! use std::convert::Infallible;
//!
//! use try_tuple::{IntoTuple, PayloadError, try_a};
//!
//! # futures::executor::block_on(async {
//! let checked = try_a(|id: u32| async move {
//!     if id == 0 {
//!         panic!("reserved id");
//!     }
//!     Ok::<_, Infallible>(id)
//! });
//!
//! let (error, value) = checked.call((0,)).await.into_tuple();
//!
//! let error = error.unwrap();
//! assert_eq!(error.to_string(), "stringified error to: reserved id");
//! assert!(error.is::<PayloadError>());
//! assert!(value.is_none());
//! # });
//! ```
//!
//! ## Tuple convention
//!
//! [`IntoTuple::into_tuple`] puts the error first: `(None, Some(value))` on success,
//! `(Some(error), None)` on failure.

pub mod config;
pub mod normalize;
pub mod operation;
pub mod outcome;
pub mod try_async;
pub mod try_sync;

pub use config::TryConfig;
pub use normalize::{Caught, Normalizer, PayloadError, normalize};
pub use operation::Operation;
pub use outcome::{IntoTuple, WrappedResult};
pub use try_async::{TryAsync, try_async, try_async as try_a};
pub use try_sync::{TrySync, try_sync, try_sync as try_s};

/// The error type every failure is normalized into.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
