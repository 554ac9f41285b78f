//! Fatal startup errors and their process exit codes.
//!
//! Every way the agent can fail before reaching steady state maps to its
//! own nonzero exit code, so a supervisor can tell a dead store apart
//! from a bad credential without parsing logs. Code 2 (bad arguments)
//! belongs to clap; everything else lives here.

use lib_common::workers::WorkerKind;
use lib_common::IndicatorError;
use thiserror::Error;

/// A startup failure that terminates the process.
#[derive(Debug, Error)]
pub enum Fatal {
    /// The indicator driver could not be opened.
    #[error(transparent)]
    Indicator(#[from] IndicatorError),
    /// The store's host never became reachable.
    #[error("network not ready after {waited}s")]
    NetworkTimeout {
        /// Seconds spent polling before giving up.
        waited: u64,
    },
    /// The initial store connection failed.
    #[error("store connection failed: {0:#}")]
    Connect(anyhow::Error),
    /// The store rejected the supplied credential.
    #[error("store authentication failed: {0:#}")]
    Auth(anyhow::Error),
    /// A tracked key-group query failed.
    #[error("key discovery failed: {0:#}")]
    Discovery(anyhow::Error),
    /// A worker failed during its startup phase.
    #[error("{kind} worker failed to start: {cause:#}")]
    WorkerStart {
        /// Which worker failed.
        kind: WorkerKind,
        /// The startup error it reported.
        cause: anyhow::Error,
    },
}

impl Fatal {
    /// The process exit code for this failure.
    pub fn code(&self) -> u8 {
        match self {
            Fatal::Indicator(_) => 10,
            Fatal::NetworkTimeout { .. } => 11,
            Fatal::Connect(_) => 12,
            Fatal::Auth(_) => 13,
            Fatal::Discovery(_) => 14,
            Fatal::WorkerStart { kind, .. } => match kind {
                WorkerKind::Activity => 21,
                WorkerKind::Command => 22,
                WorkerKind::Rate => 23,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_every_fatal_code_is_distinct_and_nonzero() {
        let fatals = [
            Fatal::Indicator(IndicatorError::Setup("no driver".into())),
            Fatal::NetworkTimeout { waited: 120 },
            Fatal::Connect(anyhow!("refused")),
            Fatal::Auth(anyhow!("denied")),
            Fatal::Discovery(anyhow!("timeout")),
            Fatal::WorkerStart {
                kind: WorkerKind::Activity,
                cause: anyhow!("refused"),
            },
            Fatal::WorkerStart {
                kind: WorkerKind::Command,
                cause: anyhow!("refused"),
            },
            Fatal::WorkerStart {
                kind: WorkerKind::Rate,
                cause: anyhow!("refused"),
            },
        ];
        let mut codes: Vec<u8> = fatals.iter().map(Fatal::code).collect();
        assert!(codes.iter().all(|&c| c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), fatals.len());
    }
}
