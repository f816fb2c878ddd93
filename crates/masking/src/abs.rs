//! Abstract data types.

/// Interface to peek at the inner value of a secret without consuming it.
pub trait PeekInterface<S> {
    /// Expose a reference to the inner secret.
    fn peek(&self) -> &S;
}

/// Interface that consumes the wrapper and exposes the inner value.
pub trait ExposeInterface<S> {
    /// Consume the secret and return the inner value.
    fn expose(self) -> S;
}

/// Interface that consumes an optional wrapper and exposes the inner value,
/// substituting a default when absent.
pub trait ExposeOptionInterface<S> {
    /// Expose the inner value or a default.
    fn expose_option(self) -> S;
}

impl<S> ExposeOptionInterface<Option<S>> for Option<crate::Secret<S>>
where
    S: Clone,
{
    fn expose_option(self) -> Option<S> {
        self.map(ExposeInterface::expose)
    }
}
