//!
//! Strong secret.
//!

use std::{fmt, marker::PhantomData};

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::{strategy::Strategy, ExposeInterface, PeekInterface};

/// Secret that is wiped from memory on drop.
///
/// Use it for values where even a stale copy in freed memory is a concern,
/// such as a card PAN. Equality for string secrets is constant-time.
pub struct StrongSecret<S: Zeroize, I = crate::WithType>
where
    I: Strategy<S>,
{
    inner_secret: S,
    marker: PhantomData<I>,
}

impl<S: Zeroize, I> StrongSecret<S, I>
where
    I: Strategy<S>,
{
    /// Take ownership of a secret value
    pub fn new(secret: S) -> Self {
        Self {
            inner_secret: secret,
            marker: PhantomData,
        }
    }
}

impl<S: Zeroize, I> PeekInterface<S> for StrongSecret<S, I>
where
    I: Strategy<S>,
{
    fn peek(&self) -> &S {
        &self.inner_secret
    }
}

impl<S: Zeroize + Clone, I> ExposeInterface<S> for StrongSecret<S, I>
where
    I: Strategy<S>,
{
    fn expose(self) -> S {
        self.inner_secret.clone()
    }
}

impl<S: Zeroize, I> From<S> for StrongSecret<S, I>
where
    I: Strategy<S>,
{
    fn from(secret: S) -> Self {
        Self::new(secret)
    }
}

impl<I> From<&str> for StrongSecret<String, I>
where
    I: Strategy<String>,
{
    fn from(secret: &str) -> Self {
        Self::new(secret.to_owned())
    }
}

impl<S: Zeroize + Clone, I> Clone for StrongSecret<S, I>
where
    I: Strategy<S>,
{
    fn clone(&self) -> Self {
        Self {
            inner_secret: self.inner_secret.clone(),
            marker: PhantomData,
        }
    }
}

impl<I> PartialEq for StrongSecret<String, I>
where
    I: Strategy<String>,
{
    fn eq(&self, other: &Self) -> bool {
        self.peek()
            .as_bytes()
            .ct_eq(other.peek().as_bytes())
            .into()
    }
}

impl<I> Eq for StrongSecret<String, I> where I: Strategy<String> {}

impl<S: Zeroize, I> fmt::Debug for StrongSecret<S, I>
where
    I: Strategy<S>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        I::fmt(&self.inner_secret, f)
    }
}

impl<S: Zeroize + Default, I> Default for StrongSecret<S, I>
where
    I: Strategy<S>,
{
    fn default() -> Self {
        S::default().into()
    }
}

impl<S: Zeroize, I> Drop for StrongSecret<S, I>
where
    I: Strategy<S>,
{
    fn drop(&mut self) {
        self.inner_secret.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_masked() {
        let pan: StrongSecret<String> = "4242424242424242".into();
        assert!(!format!("{pan:?}").contains("4242"));
    }

    #[test]
    fn equality_compares_inner_values() {
        let a: StrongSecret<String> = "123".into();
        let b: StrongSecret<String> = "123".into();
        let c: StrongSecret<String> = "124".into();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
