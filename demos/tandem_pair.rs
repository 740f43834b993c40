//! A two-station tandem chain with Poisson arrivals at rate 1.0 and
//! exponential service at rates 1.5 and 1.2, pushing fifty thousand
//! jobs through the chain and printing the simulated statistics next
//! to the Jackson closed-form values.
//!
//! Because both stations are stable M/M/1 queues under Jackson's
//! theorem, every simulated figure should land close to its closed
//! form: utilizations (2/3, 5/6), mean lengths and sojourns (2, 5),
//! and unit throughput.

use tandemq::{Config, Simulation};

fn main() {
    let config = Config::poisson(1.0, &[1.5, 1.2], 50_000).expect("parameters are valid");
    let reference = config
        .jackson_reference()
        .expect("chain is a stable Jackson network");

    let mut sim = Simulation::new(config, 0xC0FFEE).expect("configuration was validated");
    sim.run().expect("run should reach the target job count");
    let stats = sim.statistics().expect("finished run has elapsed time");

    println!(
        "completed {} jobs over {:.1} simulated time units\n",
        sim.completed_jobs(),
        stats.elapsed
    );
    println!("{:<28} {:>10} {:>10}", "metric", "simulated", "jackson");
    for (i, (simulated, predicted)) in stats.per_queue.iter().zip(reference.per_queue.iter()).enumerate() {
        println!(
            "{:<28} {:>10.4} {:>10.4}",
            format!("queue {i} utilization"),
            simulated.utilization,
            predicted.utilization
        );
        println!(
            "{:<28} {:>10.4} {:>10.4}",
            format!("queue {i} mean length"),
            simulated.mean_length,
            predicted.mean_length
        );
        println!(
            "{:<28} {:>10.4} {:>10.4}",
            format!("queue {i} mean sojourn"),
            simulated.mean_sojourn,
            predicted.mean_sojourn
        );
    }
    println!(
        "{:<28} {:>10.4} {:>10.4}",
        "overall mean length", stats.overall_mean_length, reference.overall_mean_length
    );
    println!(
        "{:<28} {:>10.4} {:>10.4}",
        "overall mean sojourn", stats.overall_mean_sojourn, reference.overall_mean_sojourn
    );
    println!(
        "{:<28} {:>10.4} {:>10.4}",
        "throughput", stats.throughput, reference.throughput
    );
}
