use crate::error::{Error, Result};

/// Mutable per-station state: current occupancy, the server's free-at
/// watermark, and the two accumulators that statistics are built from.
///
/// A node is owned exclusively by one simulation for the duration of a
/// run; it never observes events out of time order.
#[derive(Debug, Clone)]
pub struct QueueNode {
    index: usize,
    length: usize,
    server_free_at: f64,
    busy_time: f64,
    occupancy_integral: f64,
}

impl QueueNode {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            length: 0,
            server_free_at: 0.0,
            busy_time: 0.0,
            occupancy_integral: 0.0,
        }
    }

    /// Position of the station in the chain.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of jobs currently at the station, the one in service
    /// included.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Completion time of the most recently admitted job; the server is
    /// idle whenever this lies in the past.
    pub fn server_free_at(&self) -> f64 {
        self.server_free_at
    }

    /// Total service time admitted so far.
    pub fn busy_time(&self) -> f64 {
        self.busy_time
    }

    /// Time integral of occupancy, accumulated by the rectangle rule
    /// between consecutive events.
    pub fn occupancy_integral(&self) -> f64 {
        self.occupancy_integral
    }

    /// Advance the occupancy integral over a span during which the
    /// station's length did not change.
    pub(crate) fn accumulate(&mut self, dt: f64) {
        self.occupancy_integral += dt * self.length as f64;
    }

    /// Admit a job at `now` and return its departure time under
    /// single-server FIFO scheduling without an explicit wait list.
    ///
    /// Correct only while arrivals reach the node in non-decreasing time
    /// order: the watermark then always holds the completion time of the
    /// job directly ahead in service order.
    pub(crate) fn admit(&mut self, now: f64, service_time: f64) -> f64 {
        self.length += 1;
        self.busy_time += service_time;

        let start = if self.server_free_at > now { self.server_free_at } else { now };
        let departure = start + service_time;
        self.server_free_at = departure;
        departure
    }

    /// Remove a departing job.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NegativeOccupancy`] if the station is already
    /// empty, which means an arrival/departure pairing bug upstream.
    pub(crate) fn release(&mut self, now: f64) -> Result {
        if self.length == 0 {
            return Err(Error::NegativeOccupancy {
                queue: self.index,
                time: now,
            });
        }
        self.length -= 1;
        Ok(())
    }
}
