use crate::BoxError;

/// The outcome of one wrapped call: the operation's value, or the normalized error.
pub type WrappedResult<T> = Result<T, BoxError>;

/// Positional view of a [`WrappedResult`], error first.
///
/// * success: `(None, Some(value))`
/// * failure: `(Some(error), None)`
///
/// Exactly one slot is `Some`.
pub trait IntoTuple<T> {
    fn into_tuple(self) -> (Option<BoxError>, Option<T>);
}

impl<T> IntoTuple<T> for WrappedResult<T> {
    fn into_tuple(self) -> (Option<BoxError>, Option<T>) {
        match self {
            Ok(value) => (None, Some(value)),
            Err(err) => (Some(err), None),
        }
    }
}
