//! Work source and completion predicate abstractions.
//!
//! The pool pulls units of work on demand instead of iterating a
//! pre-materialized collection, so producers may keep adding work while a
//! run is in progress.

use std::future::Future;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;

/// A pending unit of work. Settles with `Ok(())` or the failure that aborts the run.
pub type Operation = BoxFuture<'static, anyhow::Result<()>>;

/// Outcome of asking a [`WorkSource`] for more work.
pub enum NextWork {
    /// Nothing to do right now; the pool asks again on a later fill pass.
    Empty,
    /// A unit of work to run in a free slot.
    Operation(Operation),
}

impl NextWork {
    /// Wrap a future as an operation.
    pub fn from_future<F>(fut: F) -> Self
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::Operation(fut.boxed())
    }

    /// Whether this is [`NextWork::Empty`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl std::fmt::Debug for NextWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("NextWork::Empty"),
            Self::Operation(_) => f.write_str("NextWork::Operation(..)"),
        }
    }
}

/// Caller-supplied producer of units of work.
///
/// `next` must not block. An `Err` counts as a failed unit of work and
/// aborts the run like a failing operation would.
///
/// # Example
///
/// ```rust,ignore
/// use autoscaled_pool::core::NextWork;
///
/// let mut remaining = 10;
/// let source = move || {
///     if remaining == 0 {
///         return Ok(NextWork::Empty);
///     }
///     remaining -= 1;
///     Ok(NextWork::from_future(async { scrape_next_page().await }))
/// };
/// ```
pub trait WorkSource: Send {
    /// Produce the next unit of work, or report that none is available.
    fn next(&mut self) -> anyhow::Result<NextWork>;
}

impl<F> WorkSource for F
where
    F: FnMut() -> anyhow::Result<NextWork> + Send,
{
    fn next(&mut self) -> anyhow::Result<NextWork> {
        self()
    }
}

/// Authoritative answer to "is all work done?".
///
/// Consulted only when nothing is running and the last fill pass found no
/// work. Without one the pool infers completion from repeated emptiness.
#[async_trait]
pub trait CompletionPredicate: Send + Sync {
    /// Return `true` once no more work will ever be produced.
    async fn is_finished(&self) -> anyhow::Result<bool>;
}

#[async_trait]
impl<F, Fut> CompletionPredicate for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
{
    async fn is_finished(&self) -> anyhow::Result<bool> {
        self().await
    }
}
