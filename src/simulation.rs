use crate::error::{Error, Result};
use crate::events::{Event, EventKind, EventQueue};
use crate::job::Job;
use crate::node::QueueNode;
use crate::stats::{JacksonReference, QueueStatistics, RunStatistics};
use crate::variate::{Distribution, VariateStream};

use rand::SeedableRng;
use rand_pcg::Pcg64;
use tracing::debug;

/// Validated description of one tandem chain experiment: the exogenous
/// arrival law, one service law per station, and the number of jobs the
/// run must push through the whole chain.
///
/// The chain length is implied by the number of service descriptors.
/// Only the first station receives exogenous arrivals; every departure
/// from station `i` becomes an arrival at station `i + 1` with zero
/// transit delay.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    arrival: Distribution,
    services: Vec<Distribution>,
    target_jobs: usize,
}

impl Config {
    /// Validate and assemble a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `services` is empty, `target_jobs`
    /// is zero, or any distribution descriptor is malformed. Nothing is
    /// deferred: a configuration that constructs successfully cannot
    /// fail for configuration reasons mid-run.
    pub fn new(arrival: Distribution, services: Vec<Distribution>, target_jobs: usize) -> Result<Self> {
        if services.is_empty() {
            return Err(Error::config("a tandem chain needs at least one queue"));
        }
        if target_jobs == 0 {
            return Err(Error::config("target job count must be at least one"));
        }
        arrival.validate()?;
        for service in &services {
            service.validate()?;
        }

        Ok(Self {
            arrival,
            services,
            target_jobs,
        })
    }

    /// A chain with Poisson arrivals and exponential service, specified
    /// by rates alone. Shorthand for exponential descriptors throughout,
    /// which is the configuration Jackson's theorem applies to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] under the same conditions as [`new()`].
    ///
    /// [`new()`]: Config::new
    pub fn poisson(arrival_rate: f64, service_rates: &[f64], target_jobs: usize) -> Result<Self> {
        Self::new(
            Distribution::Exponential { rate: arrival_rate },
            service_rates
                .iter()
                .map(|&rate| Distribution::Exponential { rate })
                .collect(),
            target_jobs,
        )
    }

    /// The exogenous arrival law for the first station.
    pub fn arrival(&self) -> &Distribution {
        &self.arrival
    }

    /// Service laws, one per station in chain order.
    pub fn services(&self) -> &[Distribution] {
        &self.services
    }

    /// Number of stations in the chain.
    pub fn num_queues(&self) -> usize {
        self.services.len()
    }

    /// Number of jobs a run must complete before terminating.
    pub fn target_jobs(&self) -> usize {
        self.target_jobs
    }

    /// Closed-form steady-state values for this chain under Jackson's
    /// theorem.
    ///
    /// Returns `Some` only when the theorem applies: exponential
    /// interarrival times, exponential service at every station, and a
    /// stable chain (arrival rate strictly below every service rate).
    /// Any other configuration yields `None` rather than a meaningless
    /// reference.
    pub fn jackson_reference(&self) -> Option<JacksonReference> {
        let lambda = self.arrival.rate()?;
        let mut per_queue = Vec::with_capacity(self.services.len());
        for service in &self.services {
            let mu = service.rate()?;
            if lambda >= mu {
                return None;
            }
            let rho = lambda / mu;
            per_queue.push(QueueStatistics {
                utilization: rho,
                mean_length: rho / (1.0 - rho),
                mean_sojourn: 1.0 / (mu - lambda),
            });
        }

        Some(JacksonReference {
            overall_mean_length: per_queue.iter().map(|q| q.mean_length).sum(),
            overall_mean_sojourn: per_queue.iter().map(|q| q.mean_sojourn).sum(),
            throughput: lambda,
            per_queue,
        })
    }
}

/// Contains the event queue and all other state belonging to one
/// replication of a tandem chain simulation.
///
/// A `Simulation` owns everything a run mutates: the clock, the event
/// queue, the per-station nodes, the job records, and the variate
/// streams. Nothing is shared and nothing is global, so independent
/// replications are safe to run concurrently on separate threads with
/// no coordination, provided each is built with its own seed.
///
/// The expected workflow is:
///
/// 1. Build a [`Config`].
/// 2. Pass it and a seed to [`new()`].
/// 3. Call [`run()`] and handle any error it returns.
/// 4. Reduce the outcome with [`statistics()`], or inspect the raw
///    per-job records via [`jobs()`].
///
/// [`new()`]: Simulation::new
/// [`run()`]: Simulation::run
/// [`statistics()`]: Simulation::statistics
/// [`jobs()`]: Simulation::jobs
#[derive(Debug)]
pub struct Simulation {
    config: Config,
    events: EventQueue,
    nodes: Vec<QueueNode>,
    jobs: Vec<Job>,
    arrivals: VariateStream,
    services: Vec<VariateStream>,
    previous_event_time: f64,
    next_job_id: usize,
    completed_jobs: usize,
}

impl Simulation {
    /// Initialize a replication from a validated configuration and a
    /// seed.
    ///
    /// Each variate stream receives its own generator, all derived
    /// deterministically from `seed`, so the same `(config, seed)` pair
    /// reproduces the same run exactly and distinct seeds give
    /// statistically independent replications.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a sampler cannot be built from one
    /// of the configuration's descriptors.
    pub fn new(config: Config, seed: u64) -> Result<Self> {
        let mut master = Pcg64::seed_from_u64(seed);
        let arrivals = VariateStream::new(config.arrival(), Pcg64::from_rng(&mut master))?;
        let services = config
            .services()
            .iter()
            .map(|spec| VariateStream::new(spec, Pcg64::from_rng(&mut master)))
            .collect::<Result<Vec<_>>>()?;
        let nodes = (0..config.num_queues()).map(QueueNode::new).collect();

        Ok(Self {
            config,
            events: EventQueue::new(),
            nodes,
            jobs: Vec::new(),
            arrivals,
            services,
            previous_event_time: 0.0,
            next_job_id: 0,
            completed_jobs: 0,
        })
    }

    /// Execute events in ascending time order until the target number of
    /// jobs has completed the whole chain.
    ///
    /// The first admission is scheduled on entry; after that the first
    /// station keeps admitting a new job each time one arrives, until
    /// the target count has been admitted. Termination discards nothing
    /// in practice: FIFO service and zero transit delay mean jobs finish
    /// in admission order, so the final completion is also the last
    /// scheduled event. Callers that want the post-condition checked
    /// rather than argued can follow up with [`drain()`].
    ///
    /// # Errors
    ///
    /// [`Error::Stalled`] if the event queue empties early, and
    /// [`Error::NegativeOccupancy`] or [`Error::BackInTime`] if event
    /// processing breaks an invariant. Each of these indicates a defect
    /// in the kernel rather than a recoverable condition.
    ///
    /// [`drain()`]: Simulation::drain
    pub fn run(&mut self) -> Result {
        debug!(
            queues = self.nodes.len(),
            target = self.config.target_jobs(),
            "starting tandem chain run"
        );

        if self.next_job_id == 0 {
            self.admit_next_job()?;
        }

        while self.completed_jobs < self.config.target_jobs() {
            let event = self.events.next().ok_or(Error::Stalled {
                completed: self.completed_jobs,
                target: self.config.target_jobs(),
            })?;
            self.apply(event)?;
        }

        debug!(
            elapsed = self.events.current_time(),
            completed = self.completed_jobs,
            "run complete"
        );
        Ok(())
    }

    /// Process every remaining event, carrying in-flight jobs through to
    /// their final departures. Admission stopped at the target count, so
    /// this converges; for a FIFO tandem chain the queue is already
    /// empty after a successful [`run()`] and this is a no-op.
    ///
    /// # Errors
    ///
    /// Same invariant-violation errors as [`run()`].
    ///
    /// [`run()`]: Simulation::run
    pub fn drain(&mut self) -> Result {
        while let Some(event) = self.events.next() {
            self.apply(event)?;
        }
        Ok(())
    }

    fn apply(&mut self, event: Event) -> Result {
        // between consecutive events every occupancy is constant, so the
        // rectangle rule is exact
        let dt = event.time - self.previous_event_time;
        for node in &mut self.nodes {
            node.accumulate(dt);
        }
        self.previous_event_time = event.time;

        match event.kind {
            EventKind::Arrival => self.process_arrival(event),
            EventKind::Departure => self.process_departure(event),
        }
    }

    fn process_arrival(&mut self, event: Event) -> Result {
        let queue = event.queue;
        let service_time = self.services[queue].draw();
        self.jobs[event.job].record_service(queue, service_time);

        let departure_time = self.nodes[queue].admit(event.time, service_time);
        self.events.schedule(Event {
            time: departure_time,
            kind: EventKind::Departure,
            queue,
            job: event.job,
        })?;

        if queue == 0 && self.next_job_id < self.config.target_jobs() {
            self.admit_next_job()?;
        }
        Ok(())
    }

    fn process_departure(&mut self, event: Event) -> Result {
        let queue = event.queue;
        self.nodes[queue].release(event.time)?;
        self.jobs[event.job].record_departure(queue, event.time);

        if queue + 1 < self.nodes.len() {
            // zero transit delay: the arrival downstream shares this
            // event's timestamp and relies on the FIFO tie-break
            self.jobs[event.job].begin_visit(queue + 1, event.time);
            self.events.schedule(Event {
                time: event.time,
                kind: EventKind::Arrival,
                queue: queue + 1,
                job: event.job,
            })?;
        } else {
            self.completed_jobs += 1;
        }
        Ok(())
    }

    /// Create the next job, record its first visit, and schedule its
    /// arrival at the first station one interarrival gap from now.
    fn admit_next_job(&mut self) -> Result {
        let gap = self.arrivals.draw();
        let arrival_time = self.events.current_time() + gap;

        let id = self.next_job_id;
        let mut job = Job::new(id);
        job.begin_visit(0, arrival_time);
        self.jobs.push(job);

        self.events.schedule(Event {
            time: arrival_time,
            kind: EventKind::Arrival,
            queue: 0,
            job: id,
        })?;
        self.next_job_id += 1;
        Ok(())
    }

    /// The configuration this replication was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The clock: execution time of the most recently processed event.
    pub fn current_time(&self) -> f64 {
        self.events.current_time()
    }

    /// Jobs that have finished the whole chain.
    pub fn completed_jobs(&self) -> usize {
        self.completed_jobs
    }

    /// Every job created so far, including any still in flight, with
    /// their full per-visit records.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Per-station state in chain order.
    pub fn nodes(&self) -> &[QueueNode] {
        &self.nodes
    }

    /// Events not yet processed.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Reduce this run into per-queue and system-wide statistics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateRun`] if no simulation time elapsed or
    /// no job completed, since the time-averaged metrics would divide by
    /// zero.
    pub fn statistics(&self) -> Result<RunStatistics> {
        RunStatistics::from_run(self)
    }
}
