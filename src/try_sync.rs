use std::any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use crate::BoxError;
use crate::config::TryConfig;
use crate::normalize::{Caught, Guarded, Normalizer};
use crate::operation::Operation;
use crate::outcome::WrappedResult;

/// Wrap an operation that completes immediately so that calling it never panics.
///
/// Use [`TrySync::call`] with the operation's arguments as a tuple. For operations producing a
/// future, see [`try_async`](fn@crate::try_async): wrapping one here yields `Ok(future)`, the pending
/// future itself.
///
/// # Example
///
/// ```
/// use try_tuple::{IntoTuple, try_sync};
///
/// let (error, json) = try_sync(serde_json::from_str::<serde_json::Value>)
///     .call(("{ \"hello\": \"world\" }",))
///     .into_tuple();
///
/// assert!(error.is_none());
/// assert_eq!(json.unwrap()["hello"], "world");
/// ```
pub fn try_sync<F>(operation: F) -> TrySync<F> {
    TrySync::new(operation)
}

/// A synchronous operation whose failures are returned instead of unwinding.
pub struct TrySync<F> {
    operation: F,
    config: TryConfig,
    normalizer: Normalizer,
}

impl<F> TrySync<F> {
    /// Wrap `operation` with the default [`TryConfig`].
    pub fn new(operation: F) -> Self {
        Self::with_config(operation, TryConfig::default())
    }

    /// Wrap `operation` with the provided `config`.
    pub fn with_config(operation: F, config: TryConfig) -> Self {
        Self {
            operation,
            normalizer: Normalizer::from_config(&config),
            config,
        }
    }

    /// Call the operation with `args`.
    ///
    /// Returns `Ok` with the operation's value, or `Err` with the normalized error if the
    /// operation returned an error or panicked. The panic does not propagate.
    pub fn call<Args, T, E>(&self, args: Args) -> WrappedResult<T>
    where
        F: Operation<Args, Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        let caught = match panic::catch_unwind(AssertUnwindSafe(|| self.operation.invoke(args))) {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => Caught::Raised(err.into()),
            Err(payload) => Caught::Panicked(payload),
        };

        Err(self.fail(caught))
    }

    fn fail(&self, caught: Caught) -> BoxError {
        let panicked = matches!(caught, Caught::Panicked(_));
        let err = self.normalizer.normalize(caught);

        debug!(
            label = %self.config.label(),
            panicked = panicked,
            error = %Guarded::new(&*err, &self.config.fallback_message),
            "Wrapped operation failed"
        );

        err
    }

    /// Get the wrapped operation.
    pub fn operation(&self) -> &F {
        &self.operation
    }

    /// Get the wrapper configuration.
    pub fn config(&self) -> &TryConfig {
        &self.config
    }

    /// Consume the wrapper, returning the operation.
    pub fn into_inner(self) -> F {
        self.operation
    }
}

impl<F: Clone> Clone for TrySync<F> {
    fn clone(&self) -> Self {
        Self {
            operation: self.operation.clone(),
            config: self.config.clone(),
            normalizer: self.normalizer.clone(),
        }
    }
}

impl<F> fmt::Debug for TrySync<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrySync")
            .field("operation", &any::type_name::<F>())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::error::Error;
    use std::io;

    use serde_json::Value;
    use serde_json::error::Category;

    use super::*;
    use crate::normalize::PayloadError;
    use crate::outcome::IntoTuple;

    fn data_ptr(err: &BoxError) -> *const () {
        &**err as *const (dyn Error + Send + Sync) as *const ()
    }

    #[test]
    fn test_parse_json_success() {
        let (error, json) = try_sync(serde_json::from_str::<Value>)
            .call(("{ \"hello\": \"world\" }",))
            .into_tuple();

        assert!(error.is_none());
        assert_eq!(json, Some(serde_json::json!({ "hello": "world" })));
    }

    #[test]
    fn test_parse_json_syntax_error() {
        let (error, json) = try_sync(serde_json::from_str::<Value>)
            .call(("{ hello: \"world\" }",))
            .into_tuple();

        let error = error.unwrap();
        let json_err = error.downcast_ref::<serde_json::Error>().unwrap();
        assert_eq!(json_err.classify(), Category::Syntax);
        assert!(json.is_none());
    }

    #[test]
    fn test_unit_success() {
        let result = try_sync(|| Ok::<_, Infallible>(())).call(());

        assert!(matches!(result, Ok(())));
    }

    #[test]
    fn test_forwards_arguments() {
        let divide = try_sync(|a: u32, b: u32| a.checked_div(b).ok_or("division by zero"));

        assert_eq!(divide.call((12, 4)).unwrap(), 3);
        assert_eq!(divide.call((1, 0)).unwrap_err().to_string(), "division by zero");
    }

    #[test]
    fn test_returned_error_keeps_identity() {
        let wrapped = try_sync(|err: BoxError| Err::<(), _>(err));
        let err: BoxError = Box::new(io::Error::other("flaky"));
        let ptr = data_ptr(&err);

        let err = wrapped.call((err,)).unwrap_err();

        assert_eq!(data_ptr(&err), ptr);
    }

    #[test]
    fn test_panicking_with_error_keeps_identity() {
        let err: BoxError = Box::new(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        let ptr = data_ptr(&err);
        let slot = std::sync::Mutex::new(Some(err));

        let wrapped = try_sync(|| {
            if let Some(err) = slot.lock().unwrap().take() {
                panic::panic_any(err);
            }
            Ok::<_, Infallible>(())
        });

        let err = wrapped.call(()).unwrap_err();
        assert_eq!(data_ptr(&err), ptr);
        assert_eq!(
            err.downcast_ref::<io::Error>().unwrap().kind(),
            io::ErrorKind::PermissionDenied
        );
    }

    #[test]
    fn test_panic_with_str_is_normalized() {
        let (error, value) = try_sync(|| -> Result<u8, Infallible> { panic!("boom") })
            .call(())
            .into_tuple();

        let error = error.unwrap();
        assert!(error.to_string().contains("boom"));
        let error = error.downcast::<PayloadError>().unwrap();
        assert_eq!(error.downcast_payload::<&'static str>().unwrap(), "boom");
        assert!(value.is_none());
    }

    #[test]
    fn test_panic_with_opaque_payload() {
        let wrapped = try_sync(|| -> Result<(), Infallible> { panic::panic_any(vec![1, 2, 3]) });

        let err = wrapped.call(()).unwrap_err();

        assert_eq!(err.to_string(), "could not stringify error");
        let err = err.downcast::<PayloadError>().unwrap();
        assert_eq!(err.downcast_payload::<Vec<i32>>().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_configured_fallback() {
        let config = TryConfig::builder()
            .label("opaque".to_string())
            .fallback_message("unprintable panic".to_string())
            .build();
        let wrapped = TrySync::with_config(
            || -> Result<(), Infallible> { panic::panic_any(()) },
            config,
        );

        assert_eq!(wrapped.call(()).unwrap_err().to_string(), "unprintable panic");
        assert_eq!(wrapped.config().label(), "opaque");
    }

    #[test]
    fn test_future_is_not_awaited() {
        let wrapped = try_sync(|| Ok::<_, Infallible>(async { 7 }));

        let pending = wrapped.call(()).unwrap();

        assert_eq!(futures::executor::block_on(pending), 7);
    }

    #[test]
    fn test_wrapper_is_reusable() {
        let wrapped = try_sync(|n: i64| {
            if n < 0 {
                panic!("negative input: {n}");
            }
            Ok::<_, Infallible>(n * 2)
        });

        assert_eq!(wrapped.call((4,)).unwrap(), 8);
        assert_eq!(
            wrapped.call((-1,)).unwrap_err().to_string(),
            "stringified error to: negative input: -1"
        );
        assert_eq!(wrapped.call((5,)).unwrap(), 10);
    }

    #[derive(Debug)]
    struct Explodes;

    impl fmt::Display for Explodes {
        fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
            panic!("display exploded")
        }
    }

    impl Error for Explodes {}

    #[test]
    fn test_debug_logging_survives_panicking_display() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        let wrapped = try_sync(|| Err::<(), _>(Explodes));

        let result = tracing::subscriber::with_default(subscriber, || {
            panic::catch_unwind(AssertUnwindSafe(|| wrapped.call(())))
        });

        let err = result.expect("wrapped call unwound").unwrap_err();
        assert!(err.is::<Explodes>());
    }
}
