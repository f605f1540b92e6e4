//! Deferred single-value results.
//!
//! A [`DeferredResult`] represents a possibly-not-yet-computed outcome of
//! a repository call or a document-mapping step. It supports chained
//! transformation (`map`, `merge`), an async terminal accessor
//! (`resolve`) and a blocking terminal accessor (`wait`) for legacy
//! synchronous callers.
//!
//! Exactly-once semantics fall out of ownership: every combinator and
//! terminal consumes `self`, so a transformation can neither be invoked
//! twice nor observe a half-consumed chain. A failure in the underlying
//! computation bypasses registered transformations and propagates to the
//! terminal accessor unchanged.
//!
//! Transformations run in whatever context completes the upstream value;
//! no dedicated thread pool is prescribed.
//!
//! # Example
//!
//! ```rust
//! use jsonapi_core::DeferredResult;
//!
//! # futures::executor::block_on(async {
//! let result = DeferredResult::completed(2)
//!     .map(|n| n * 10)
//!     .merge(|n| DeferredResult::completed(n + 1));
//! assert_eq!(result.resolve().await.unwrap(), 21);
//! # });
//! ```

use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;

use crate::error::DispatchError;

/// A single-value asynchronous computation handle.
///
/// Produces exactly one terminal value or one failure.
#[must_use = "a deferred result does nothing until resolved"]
pub struct DeferredResult<T> {
    future: BoxFuture<'static, Result<T, DispatchError>>,
}

impl<T: Send + 'static> DeferredResult<T> {
    /// A result that completed synchronously with a value.
    pub fn completed(value: T) -> Self {
        Self {
            future: std::future::ready(Ok(value)).boxed(),
        }
    }

    /// A result that completed synchronously with a failure.
    pub fn failed(error: DispatchError) -> Self {
        Self {
            future: std::future::ready(Err(error)).boxed(),
        }
    }

    /// A result pending on an arbitrary future, e.g. a repository backed
    /// by a remote data store.
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, DispatchError>> + Send + 'static,
    {
        Self {
            future: future.boxed(),
        }
    }

    /// Transforms the eventual value.
    ///
    /// The transformation is invoked exactly once, after the underlying
    /// computation completes, and only on success.
    pub fn map<U, F>(self, f: F) -> DeferredResult<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        DeferredResult {
            future: async move {
                let value = self.future.await?;
                Ok(f(value))
            }
            .boxed(),
        }
    }

    /// Chains another deferred step onto the eventual value.
    ///
    /// The continuation is invoked exactly once, on success only; a
    /// failure in either step propagates to the terminal accessor.
    pub fn merge<U, F>(self, f: F) -> DeferredResult<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> DeferredResult<U> + Send + 'static,
    {
        DeferredResult {
            future: async move {
                let value = self.future.await?;
                f(value).future.await
            }
            .boxed(),
        }
    }

    /// Resolves the chain asynchronously.
    ///
    /// # Errors
    ///
    /// Returns the failure produced anywhere in the chain, unchanged.
    pub async fn resolve(self) -> Result<T, DispatchError> {
        self.future.await
    }

    /// Blocks the calling thread until the chain resolves.
    ///
    /// This is the adapter for legacy synchronous call sites only. Never
    /// call it from within another deferred computation's callback or any
    /// async context: on a single-threaded executor that deadlocks.
    ///
    /// # Errors
    ///
    /// Returns the failure produced anywhere in the chain, unchanged.
    pub fn wait(self) -> Result<T, DispatchError> {
        futures::executor::block_on(self.future)
    }
}
