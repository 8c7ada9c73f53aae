//! # Remote SysRq Service
//!
//! Application service implementing [`RemoteSysrqApi`].
//!
//! ## Architecture
//!
//! - Implements the inbound port (`RemoteSysrqApi`)
//! - Drives the outbound port (`ControlSink`) for every accepted command
//! - Delegates parsing, replay protection and digest checks to the domain layer

use std::sync::Arc;

use crate::domain::authenticator::Authenticator;
use crate::domain::config::SysrqConfig;
use crate::domain::dispatcher::dispatch_commands;
use crate::domain::entities::{AuthorizedRequest, SequenceNumber};
use crate::domain::errors::{SetupError, ValidationError};
use crate::metrics::{MetricsSnapshot, ValidationMetrics};
use crate::ports::inbound::RemoteSysrqApi;
use crate::ports::outbound::ControlSink;

/// Remote SysRq validation service.
///
/// One instance owns one replay state; construct a fresh instance per rule.
pub struct RemoteSysrqService<S: ControlSink> {
    authenticator: Authenticator,
    sink: S,
    metrics: Arc<ValidationMetrics>,
    debug: bool,
}

impl<S: ControlSink> RemoteSysrqService<S> {
    /// Create a service from validated configuration.
    ///
    /// # Errors
    /// Any [`SetupError`] from [`SysrqConfig::validate`]; the service must
    /// not be activated without a secret and a working digest engine.
    pub fn new(config: &SysrqConfig, sink: S) -> Result<Self, SetupError> {
        config.validate()?;
        let algorithm = config.algorithm()?;
        let initial = config.initial_sequence_number();

        tracing::info!(
            hash = %algorithm,
            seqno = initial,
            debug = config.debug,
            "Remote SysRq validator initialized"
        );

        Ok(Self {
            authenticator: Authenticator::new(config.secret(), algorithm.engine(), initial),
            sink,
            metrics: Arc::new(ValidationMetrics::new()),
            debug: config.debug,
        })
    }

    /// Shared handle to this instance's counters.
    pub fn metrics(&self) -> Arc<ValidationMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Name of the digest algorithm in use.
    pub fn algorithm(&self) -> &'static str {
        self.authenticator.algorithm()
    }

    fn log_rejection(&self, error: &ValidationError) {
        if !self.debug {
            return;
        }
        match error {
            ValidationError::DigestMismatch | ValidationError::ShortDigest { .. } => {
                tracing::warn!(reason = error.label(), "{}", error)
            }
            ValidationError::NoSecretConfigured => {}
            _ => tracing::info!(reason = error.label(), "{}", error),
        }
    }
}

impl<S: ControlSink> RemoteSysrqApi for RemoteSysrqService<S> {
    fn authorize(&self, payload: &[u8]) -> Result<AuthorizedRequest, ValidationError> {
        let sink = &self.sink;
        let result = self.authenticator.authorize(payload, |request| {
            dispatch_commands(request, |key| sink.trigger(key))
        });

        match result {
            Ok((request, commands_dispatched)) => {
                self.metrics.record_accept(commands_dispatched);
                if self.debug {
                    tracing::debug!(
                        seqno = request.sequence_number(),
                        commands = commands_dispatched,
                        "Request accepted"
                    );
                }
                Ok(AuthorizedRequest {
                    sequence_number: request.sequence_number(),
                    commands_dispatched,
                })
            }
            Err(error) => {
                self.metrics.record_rejection(&error);
                self.log_rejection(&error);
                Err(error)
            }
        }
    }

    fn last_sequence_number(&self) -> SequenceNumber {
        self.authenticator.last_sequence_number()
    }
}

impl<S: ControlSink + std::fmt::Debug> std::fmt::Debug for RemoteSysrqService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSysrqService")
            .field("authenticator", &self.authenticator)
            .field("sink", &self.sink)
            .field("debug", &self.debug)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sink::RecordingSink;
    use shared_types::Verdict;

    const PAYLOAD: &[u8] = b"s,1000000000,abcd,4e98113a8936c521682011fc4610d6bd086433c4";

    fn service(debug: bool) -> RemoteSysrqService<RecordingSink> {
        let config = SysrqConfig::default()
            .with_password("secret")
            .with_seqno(0)
            .with_debug(debug);
        RemoteSysrqService::new(&config, RecordingSink::new()).unwrap()
    }

    #[test]
    fn test_new_fails_fast_without_secret() {
        let result = RemoteSysrqService::new(&SysrqConfig::default(), RecordingSink::new());
        assert!(matches!(result, Err(SetupError::NoSecretConfigured)));
    }

    #[test]
    fn test_new_fails_fast_on_unknown_hash() {
        let config = SysrqConfig::default().with_password("x").with_hash("md4");
        let result = RemoteSysrqService::new(&config, RecordingSink::new());
        assert!(matches!(result, Err(SetupError::HashEngineUnavailable(_))));
    }

    #[test]
    fn test_accept_dispatches_and_counts() {
        let service = service(false);
        assert_eq!(service.validate(PAYLOAD), Verdict::Accept);
        assert_eq!(service.sink().keys(), b"s".to_vec());
        assert_eq!(service.last_sequence_number(), 1_000_000_000);

        let snapshot = service.metrics_snapshot();
        assert_eq!(snapshot.accepted, 1);
        assert_eq!(snapshot.commands_dispatched, 1);
    }

    #[test]
    fn test_replay_counted_as_stale() {
        let service = service(true);
        assert!(service.authorize(PAYLOAD).is_ok());
        assert_eq!(
            service.authorize(PAYLOAD),
            Err(ValidationError::ReplayedOrStaleSequence {
                received: 1_000_000_000,
                last_accepted: 1_000_000_000,
            })
        );
        assert_eq!(service.sink().keys(), b"s".to_vec());
        assert_eq!(service.metrics_snapshot().stale_sequence, 1);
    }

    #[test]
    fn test_rejection_dispatches_nothing() {
        let service = service(true);
        assert_eq!(service.validate(b"s,5,x,deadbeef"), Verdict::Drop);
        assert_eq!(service.validate(b""), Verdict::Drop);
        assert!(service.sink().keys().is_empty());
        assert_eq!(service.last_sequence_number(), 0);
        assert_eq!(service.metrics_snapshot().rejected(), 2);
    }

    #[test]
    fn test_debug_hides_secret() {
        let service = service(false);
        let rendered = format!("{:?}", service);
        assert!(!rendered.contains("secret\""));
        assert!(rendered.contains("RemoteSysrqService"));
    }
}
