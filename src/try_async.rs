use std::any;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use tracing::debug;

use crate::BoxError;
use crate::config::TryConfig;
use crate::normalize::{Caught, Guarded, Normalizer};
use crate::operation::Operation;
use crate::outcome::WrappedResult;

/// Wrap an operation producing a future so that neither calling it nor awaiting it panics.
///
/// Use [`TryAsync::call`] with the operation's arguments as a tuple. The returned future always
/// resolves to a [`WrappedResult`].
///
/// # Example
///
/// ```
/// use try_tuple::{IntoTuple, try_async};
///
/// async fn port(raw: &str) -> Result<u16, std::num::ParseIntError> {
///     raw.parse()
/// }
///
/// # futures::executor::block_on(async {
/// let (error, value) = try_async(port).call(("8080",)).await.into_tuple();
///
/// assert!(error.is_none());
/// assert_eq!(value, Some(8080));
/// # });
/// ```
pub fn try_async<F>(operation: F) -> TryAsync<F> {
    TryAsync::new(operation)
}

/// An asynchronous operation whose failures are returned instead of unwinding.
pub struct TryAsync<F> {
    operation: F,
    config: TryConfig,
    normalizer: Normalizer,
}

impl<F> TryAsync<F> {
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
    /// The operation itself is called right away, so any work it does before returning its
    /// future happens before this method returns. A panic there is caught, as is a panic while
    /// the future is polled.
    ///
    /// The returned future resolves to `Ok` with the settled value, or `Err` with the
    /// normalized error if the future settled with an error or something panicked.
    pub fn call<Args, Fut, T, E>(&self, args: Args) -> impl Future<Output = WrappedResult<T>>
    where
        F: Operation<Args, Output = Fut>,
        Fut: IntoFuture<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        let started = panic::catch_unwind(AssertUnwindSafe(|| {
            self.operation.invoke(args).into_future()
        }));

        async move {
            let future = match started {
                Ok(future) => future,
                Err(payload) => return Err(self.fail(Caught::Panicked(payload))),
            };

            let caught = match AssertUnwindSafe(future).catch_unwind().await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(err)) => Caught::Raised(err.into()),
                Err(payload) => Caught::Panicked(payload),
            };

            Err(self.fail(caught))
        }
    }

    fn fail(&self, caught: Caught) -> BoxError {
        let panicked = matches!(caught, Caught::Panicked(_));
        let err = self.normalizer.normalize(caught);

        debug!(
            label = %self.config.label(),
            panicked = panicked,
            error = %Guarded::new(&*err, &self.config.fallback_message),
            "Wrapped async operation failed"
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

impl<F: Clone> Clone for TryAsync<F> {
    fn clone(&self) -> Self {
        Self {
            operation: self.operation.clone(),
            config: self.config.clone(),
            normalizer: self.normalizer.clone(),
        }
    }
}

impl<F> fmt::Debug for TryAsync<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryAsync")
            .field("operation", &any::type_name::<F>())
            .field("config", &self.config)
            .finish()
    }
}
