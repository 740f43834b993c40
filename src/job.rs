/// One station's view of a job: when it joined, how much service it
/// drew, and when it left. Service and departure are filled in as the
/// simulation reaches them.
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    /// Index of the station visited.
    pub queue: usize,
    /// Time the job joined this station.
    pub arrival_time: f64,
    /// Service requirement drawn on arrival, once the arrival has been
    /// processed.
    pub service_time: Option<f64>,
    /// Time the job left the station, once it has.
    pub departure_time: Option<f64>,
}

impl Visit {
    fn new(queue: usize, arrival_time: f64) -> Self {
        Self {
            queue,
            arrival_time,
            service_time: None,
            departure_time: None,
        }
    }

    /// Total time spent at the station, arrival to departure.
    pub fn sojourn(&self) -> Option<f64> {
        self.departure_time.map(|departure| departure - self.arrival_time)
    }

    /// Time spent waiting for the server, clamped at zero to absorb
    /// floating-point dust for jobs that started service immediately.
    pub fn wait_time(&self) -> Option<f64> {
        match (self.service_time, self.departure_time) {
            (Some(service), Some(departure)) => Some((departure - service - self.arrival_time).max(0.0)),
            _ => None,
        }
    }

    /// Whether the job has left this station.
    pub fn is_complete(&self) -> bool {
        self.departure_time.is_some()
    }
}

/// A single entity flowing through the chain, with one [`Visit`] per
/// station traversed, in chain order.
///
/// Jobs are created when their admission at the first station is
/// scheduled and retained for the whole run, so post-run aggregation
/// can see every visit ever made.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    id: usize,
    visits: Vec<Visit>,
}

impl Job {
    pub(crate) fn new(id: usize) -> Self {
        Self { id, visits: Vec::new() }
    }

    /// Identifier assigned at admission, dense and increasing in
    /// admission order at the first station.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Every visit made so far, in chain order.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// The visit made to `queue`, if the job has reached that station.
    /// Visits follow chain order, so the lookup is by position.
    pub fn visit(&self, queue: usize) -> Option<&Visit> {
        self.visits.get(queue).filter(|visit| visit.queue == queue)
    }

    /// Sum of per-station sojourns; `None` until every visit has
    /// completed.
    pub fn total_sojourn(&self) -> Option<f64> {
        self.visits.iter().map(Visit::sojourn).sum()
    }

    /// Whether the job has departed every station of a chain with
    /// `chain_len` stations.
    pub fn is_complete(&self, chain_len: usize) -> bool {
        self.visits.len() == chain_len && self.visits.iter().all(Visit::is_complete)
    }

    pub(crate) fn begin_visit(&mut self, queue: usize, arrival_time: f64) {
        debug_assert_eq!(self.visits.len(), queue, "visits must follow chain order");
        self.visits.push(Visit::new(queue, arrival_time));
    }

    pub(crate) fn record_service(&mut self, queue: usize, service_time: f64) {
        let visit = self
            .visits
            .last_mut()
            .expect("a job being served has an active visit");
        debug_assert_eq!(visit.queue, queue, "service recorded against the wrong station");
        visit.service_time = Some(service_time);
    }

    pub(crate) fn record_departure(&mut self, queue: usize, departure_time: f64) {
        let visit = self
            .visits
            .last_mut()
            .expect("a departing job has an active visit");
        debug_assert_eq!(visit.queue, queue, "departure recorded against the wrong station");
        visit.departure_time = Some(departure_time);
    }
}
