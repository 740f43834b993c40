//! # Overview
//!
//! tandemq is a discrete-event simulator for tandem queueing networks: a
//! fixed linear chain of single-server FIFO stations that every job
//! traverses in order, with zero transit delay between stages. Its
//! purpose is empirical validation of closed-form queueing results:
//! run a chain, reduce it to utilization, occupancy, sojourn, and
//! throughput figures, and set those against what Jackson's theorem and
//! Little's law predict.
//!
//! * [`EventQueue`] keeps pending [`Event`]s in non-decreasing time
//!   order with a stable first-in-first-out tie-break, which simultaneous
//!   departure/arrival pairs depend on for correctness.
//! * [`Distribution`] describes interarrival and service laws
//!   (exponential, uniform, Erlang, hyper- and hypoexponential), checked
//!   entirely at configuration time; [`VariateStream`] is its validated,
//!   seeded sampling form.
//! * [`Simulation`] owns every piece of state one replication mutates
//!   (clock, event queue, stations, job records, generators), so
//!   replications built from distinct seeds can run concurrently with
//!   nothing shared.
//! * [`RunStatistics`] reduces a finished run to per-station and
//!   system-wide metrics, and [`Config::jackson_reference`] supplies the
//!   matching closed-form values whenever the chain is a stable open
//!   Jackson network.
//! * [`confidence_interval`] turns a batch of replication outputs into a
//!   Student-t interval estimate.
//!
//! Orchestrating parameter sweeps, rendering plots, and driving
//! replication batches are left to the caller; the crate exposes typed
//! aggregates, not presentation.
//!
//! ```
//! use tandemq::{Config, Simulation};
//!
//! let config = Config::poisson(1.0, &[1.5, 1.2], 1_000).unwrap();
//! let mut sim = Simulation::new(config, 7).unwrap();
//! sim.run().unwrap();
//!
//! let stats = sim.statistics().unwrap();
//! assert!(stats.throughput > 0.0);
//! assert_eq!(2, stats.per_queue.len());
//! ```

mod error;
mod events;
mod job;
mod node;
mod simulation;
mod stats;
mod variate;

pub use error::{Error, Result};
pub use events::{Event, EventKind, EventQueue};
pub use job::{Job, Visit};
pub use node::QueueNode;
pub use simulation::{Config, Simulation};
pub use stats::{confidence_interval, ConfidenceInterval, JacksonReference, QueueStatistics, RunStatistics};
pub use variate::{Distribution, VariateStream};
