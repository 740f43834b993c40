//! Twenty independent replications of the same two-station chain, run
//! in parallel on separate threads, reduced to Student-t confidence
//! intervals for the system-wide metrics.
//!
//! Each replication owns its entire state (event queue, stations, job
//! records, and generators), so the threads need no coordination at
//! all; the only shared decision is handing each one a distinct seed.

use std::thread;

use tandemq::{confidence_interval, Config, RunStatistics, Simulation};

const REPLICATIONS: u64 = 20;
const CONFIDENCE: f64 = 0.95;

fn main() {
    let handles: Vec<_> = (0..REPLICATIONS)
        .map(|replication| {
            thread::spawn(move || {
                let config = Config::poisson(1.0, &[1.5, 1.2], 50_000).expect("parameters are valid");
                let mut sim = Simulation::new(config, replication).expect("configuration was validated");
                sim.run().expect("run should reach the target job count");
                sim.statistics().expect("finished run has elapsed time")
            })
        })
        .collect();

    let outputs: Vec<RunStatistics> = handles
        .into_iter()
        .map(|handle| handle.join().expect("replication thread panicked"))
        .collect();

    report("overall mean sojourn", &outputs, |stats| stats.overall_mean_sojourn);
    report("overall mean length", &outputs, |stats| stats.overall_mean_length);
    report("throughput", &outputs, |stats| stats.throughput);
}

fn report(metric: &str, outputs: &[RunStatistics], extract: impl Fn(&RunStatistics) -> f64) {
    let samples: Vec<f64> = outputs.iter().map(extract).collect();
    let interval = confidence_interval(&samples, CONFIDENCE).expect("enough replications for an interval");
    println!(
        "{metric}: {:.4} ± {:.4} ({:.0}% confidence, {} replications)",
        interval.mean,
        interval.half_width,
        CONFIDENCE * 100.0,
        samples.len()
    );
}
