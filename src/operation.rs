//! Argument forwarding for wrapped closures.
//!
//! Rust has no variadic closures, so the wrappers take their arguments as a tuple and
//! [`Operation`] spreads that tuple back over the closure's parameter list. A closure taking
//! `(A, B)` is called as `wrapped.call((a, b))`, a closure taking nothing as `wrapped.call(())`.

/// A callable that accepts the argument tuple `Args`.
///
/// Implemented for every `Fn(A1, .., An) -> R` up to twelve parameters.
pub trait Operation<Args> {
    /// The value returned by the callable.
    type Output;

    /// Call the operation with the arguments spread from `args`.
    fn invoke(&self, args: Args) -> Self::Output;
}

macro_rules! impl_operation {
    ($($ty:ident),*) => {
        impl<F, R, $($ty,)*> Operation<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> R,
        {
            type Output = R;

            #[allow(non_snake_case)]
            fn invoke(&self, ($($ty,)*): ($($ty,)*)) -> R {
                (self)($($ty),*)
            }
        }
    };
}

impl_operation!();
impl_operation!(A1);
impl_operation!(A1, A2);
impl_operation!(A1, A2, A3);
impl_operation!(A1, A2, A3, A4);
impl_operation!(A1, A2, A3, A4, A5);
impl_operation!(A1, A2, A3, A4, A5, A6);
impl_operation!(A1, A2, A3, A4, A5, A6, A7);
impl_operation!(A1, A2, A3, A4, A5, A6, A7, A8);
impl_operation!(A1, A2, A3, A4, A5, A6, A7, A8, A9);
impl_operation!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10);
impl_operation!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11);
impl_operation!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12);
