use std::fmt;

use sqs_exporter_monitor::MonitoringError;

use crate::error::Error;

/// Something that went wrong while the exporter was running.
#[derive(Debug)]
pub enum Failure {
    /// A monitoring cycle failed.
    Cycle(MonitoringError),

    /// The scrape server stopped.
    Server(Error),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle(e) => write!(f, "{e} [{}]", e.kind()),
            Self::Server(e) => write!(f, "{e}"),
        }
    }
}

impl From<Failure> for Error {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Cycle(e) => Self::Cycle(e),
            Failure::Server(e) => e,
        }
    }
}

/// What to do after a failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// Keep scheduling cycles and serving the last known values.
    Continue,

    /// Stop the scheduler and the scrape server.
    Terminate,
}

/// Decides whether the exporter survives a failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SupervisionPolicy {
    /// Whether failed cycles are tolerated.
    pub keep_running_on_error: bool,
}

impl SupervisionPolicy {
    /// Cycle failures are tolerated only when `keep_running_on_error` is set;
    /// server failures always terminate.
    #[must_use]
    pub const fn decide(&self, failure: &Failure) -> Decision {
        match failure {
            Failure::Cycle(_) if self.keep_running_on_error => Decision::Continue,
            Failure::Cycle(_) | Failure::Server(_) => Decision::Terminate,
        }
    }
}
