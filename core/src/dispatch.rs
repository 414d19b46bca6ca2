//! Bounded, retrying request dispatch.
//!
//! # Design
//! The dispatcher owns the only shared mutable resource in the engine: a
//! counting semaphore sized by `max_concurrent_requests`. Acquiring a slot,
//! the transport round-trip, and backoff sleeps are the suspension points;
//! a cancellation token is observed at every one of them, so cancelling an
//! invocation never waits out the remote service. No lock is held across an
//! await — the permit is a guard released on every exit path.
//!
//! Retries cover 5xx responses and the retryable transport failures
//! (timeout, connection), with exponential backoff and a fresh per-attempt
//! timer. 2xx/4xx return immediately as data; status classification belongs
//! to the response mapper.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::TransportFailure;
use crate::http::{RawResponse, RequestDescriptor};
use crate::transport::Transport;

/// Engine-level operational policy. Manifest files never influence these;
/// they are the deployment's choice.
#[derive(Debug, Clone)]
pub struct DispatchPolicy {
    /// Ceiling on simultaneous in-flight requests.
    pub max_concurrent_requests: usize,
    /// Per-attempt timeout; each retry gets a fresh timer.
    pub request_timeout: Duration,
    /// Extra attempts after the first, for the retryable failure set.
    pub max_retries: u32,
    /// Backoff before retry n is `retry_backoff_base * 2^n`.
    pub retry_backoff_base: Duration,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 8,
            request_timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_backoff_base: Duration::from_millis(250),
        }
    }
}

/// Per-invocation overrides. Both default to off.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Bounds the whole retry sequence, not a single attempt.
    pub deadline: Option<Duration>,
    /// Cooperative cancellation; aborts the in-flight attempt.
    pub cancel: Option<CancellationToken>,
}

/// Dispatch failed to produce any HTTP response.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Transport(TransportFailure),

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("cancelled")]
    Cancelled,
}

/// Executes request descriptors against a transport under the policy's
/// concurrency/timeout/retry limits.
#[derive(Debug)]
pub struct Dispatcher<T: Transport> {
    transport: T,
    policy: DispatchPolicy,
    permits: Arc<Semaphore>,
}

impl<T: Transport + Clone> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        // Clones share the semaphore: the ceiling is global, not per-handle.
        Self {
            transport: self.transport.clone(),
            policy: self.policy.clone(),
            permits: Arc::clone(&self.permits),
        }
    }
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T, policy: DispatchPolicy) -> Self {
        let permits = Arc::new(Semaphore::new(policy.max_concurrent_requests.max(1)));
        Self {
            transport,
            policy,
            permits,
        }
    }

    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    /// Send one descriptor, retrying per policy. Returns the final raw
    /// response (including 4xx/5xx) or the reason no response exists.
    pub async fn dispatch(
        &self,
        request: &RequestDescriptor,
        options: &DispatchOptions,
    ) -> Result<RawResponse, DispatchError> {
        match options.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run(request, options))
                .await
                .unwrap_or(Err(DispatchError::DeadlineExceeded)),
            None => self.run(request, options).await,
        }
    }

    async fn run(
        &self,
        request: &RequestDescriptor,
        options: &DispatchOptions,
    ) -> Result<RawResponse, DispatchError> {
        let cancel = options.cancel.clone().unwrap_or_default();

        let _permit = tokio::select! {
            permit = self.permits.acquire() => match permit {
                Ok(permit) => permit,
                // The semaphore is never closed while a dispatcher exists.
                Err(_) => return Err(DispatchError::Cancelled),
            },
            _ = cancel.cancelled() => return Err(DispatchError::Cancelled),
        };

        let mut attempt: u32 = 0;
        loop {
            debug!(method = %request.method, url = %request.url, attempt, "dispatching");

            let outcome = tokio::select! {
                sent = tokio::time::timeout(
                    self.policy.request_timeout,
                    self.transport.send(request, self.policy.request_timeout),
                ) => sent.unwrap_or(Err(TransportFailure::Timeout)),
                _ = cancel.cancelled() => return Err(DispatchError::Cancelled),
            };

            let retryable = match &outcome {
                Ok(response) => response.status >= 500,
                Err(failure) => failure.is_retryable(),
            };
            if !retryable || attempt >= self.policy.max_retries {
                return match outcome {
                    Ok(response) => Ok(response),
                    Err(failure) => Err(DispatchError::Transport(failure)),
                };
            }

            let backoff = self.policy.retry_backoff_base * 2u32.saturating_pow(attempt.min(16));
            match &outcome {
                Ok(response) => {
                    warn!(status = response.status, attempt, ?backoff, "retrying after server error");
                }
                Err(failure) => {
                    warn!(%failure, attempt, ?backoff, "retrying after transport failure");
                }
            }
            attempt += 1;

            tokio::select! {
                _ = tokio::time::sleep(backoff) => {}
                _ = cancel.cancelled() => return Err(DispatchError::Cancelled),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_documented_constants() {
        let policy = DispatchPolicy::default();
        assert_eq!(policy.max_concurrent_requests, 8);
        assert_eq!(policy.request_timeout, Duration::from_secs(30));
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.retry_backoff_base, Duration::from_millis(250));
    }

    #[test]
    fn zero_concurrency_is_clamped_to_one() {
        struct NoopTransport;
        impl Transport for NoopTransport {
            async fn send(
                &self,
                _request: &RequestDescriptor,
                _timeout: Duration,
            ) -> Result<RawResponse, TransportFailure> {
                Err(TransportFailure::Connection("noop".to_string()))
            }
        }

        let dispatcher = Dispatcher::new(
            NoopTransport,
            DispatchPolicy {
                max_concurrent_requests: 0,
                ..Default::default()
            },
        );
        assert_eq!(dispatcher.permits.available_permits(), 1);
    }
}
