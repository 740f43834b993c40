use thiserror::Error;

/// Errors that may be encountered while configuring or executing
/// a simulation.
///
/// The [`Config`] variant covers everything that can be rejected
/// before the first event is processed: unsupported or malformed
/// distribution descriptors, an empty chain, a zero job target.
/// The remaining variants are runtime failures. [`BackInTime`] and
/// [`NegativeOccupancy`] indicate a scheduling or pairing bug in
/// whatever produced the event stream; [`Stalled`] means the event
/// queue drained before the run reached its completion target, which
/// should be impossible while the first station keeps admitting jobs.
///
/// [`Config`]: Error::Config
/// [`BackInTime`]: Error::BackInTime
/// [`NegativeOccupancy`]: Error::NegativeOccupancy
/// [`Stalled`]: Error::Stalled
#[derive(Debug, Error)]
pub enum Error {
    /// A distribution descriptor or chain parameter was rejected
    /// during configuration.
    #[error("invalid configuration: {reason}")]
    Config {
        /// Human-readable account of the rejected parameter.
        reason: String,
    },

    /// An event would have been scheduled for a time that has
    /// already passed.
    #[error("event scheduled at {scheduled} behind current time {now}")]
    BackInTime {
        /// The requested execution time.
        scheduled: f64,
        /// The clock time the queue had already reached.
        now: f64,
    },

    /// The event queue emptied before the target number of jobs
    /// completed.
    #[error("event queue empty with {completed} of {target} jobs completed")]
    Stalled {
        /// Jobs that had finished the whole chain when the queue ran dry.
        completed: usize,
        /// The completion count the run was asked to reach.
        target: usize,
    },

    /// A departure would have driven a station's occupancy negative.
    #[error("occupancy of queue {queue} would go negative at time {time}")]
    NegativeOccupancy {
        /// Index of the offending station.
        queue: usize,
        /// Simulation time of the unmatched departure.
        time: f64,
    },

    /// No simulation time elapsed, so time-averaged statistics are
    /// undefined.
    #[error("no simulation time elapsed; statistics are undefined")]
    DegenerateRun,
}

impl Error {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::Config { reason: reason.into() }
    }
}

/// [`std::result::Result`] specialized to this crate's [`Error`], with
/// the success type defaulting to `()` for the scheduling paths that
/// return nothing.
pub type Result<T = ()> = std::result::Result<T, Error>;
