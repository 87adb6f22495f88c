//! Helpers layered over [`std::result::Result`].
//!
//! `Result` already covers `map`, `map_err`, `and_then`, `or_else`, `unwrap_or`
//! and the `is_ok`/`is_err` guards. This module adds the aggregation,
//! observation and async-capture operations the pipeline relies on.

use std::any::Any;
use std::future::Future;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::{ConfigError, ConfigResult};

/// Collect results in order, stopping at the first failure.
///
/// An empty input yields `Ok(vec![])`.
pub fn all<T, E, I>(results: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    results.into_iter().collect()
}

/// Keep every result, success or failure, in input order.
pub fn all_settled<T, E, I>(results: I) -> Vec<Result<T, E>>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    results.into_iter().collect()
}

pub trait ResultExt<T, E>: Sized {
    /// Observe the success value without altering the result.
    fn tap<F: FnOnce(&T)>(self, f: F) -> Self;

    /// Observe the error value without altering the result.
    fn tap_err<F: FnOnce(&E)>(self, f: F) -> Self;

    /// Collapse both variants into one value.
    fn fold<U, S, F>(self, on_ok: S, on_err: F) -> U
    where
        S: FnOnce(T) -> U,
        F: FnOnce(E) -> U;

    /// Emit a `warn!` event for a failure and pass the result through.
    fn log_err(self, context: &str) -> Self
    where
        E: std::fmt::Display,
    {
        self.tap_err(|err| warn!(error = %err, "{context}"))
    }
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn tap<F: FnOnce(&T)>(self, f: F) -> Self {
        if let Ok(value) = &self {
            f(value);
        }
        self
    }

    fn tap_err<F: FnOnce(&E)>(self, f: F) -> Self {
        if let Err(err) = &self {
            f(err);
        }
        self
    }

    fn fold<U, S, F>(self, on_ok: S, on_err: F) -> U
    where
        S: FnOnce(T) -> U,
        F: FnOnce(E) -> U,
    {
        match self {
            Ok(value) => on_ok(value),
            Err(err) => on_err(err),
        }
    }
}

/// Await a fallible future, mapping its error with `map_err`.
pub async fn from_future<T, E, Fut, M>(future: Fut, map_err: M) -> ConfigResult<T>
where
    Fut: Future<Output = Result<T, E>>,
    M: FnOnce(E) -> ConfigError,
{
    future.await.map_err(map_err)
}

/// Await a fallible future, wrapping any error as `UNKNOWN_ERROR`.
pub async fn from_future_default<T, E, Fut>(future: Fut) -> ConfigResult<T>
where
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    from_future(future, |err| ConfigError::unknown_from(err.to_string(), err)).await
}

/// Await a spawned task. Panics and cancellation become `UNKNOWN_ERROR`,
/// whatever the panic payload type.
pub async fn from_task<T>(handle: JoinHandle<ConfigResult<T>>) -> ConfigResult<T> {
    match handle.await {
        Ok(result) => result,
        Err(err) if err.is_panic() => {
            let message = panic_message(err.into_panic().as_ref());
            Err(ConfigError::unknown(format!("task panicked: {message}")))
        }
        Err(err) => Err(ConfigError::unknown_from("task was cancelled", err)),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
