mod util;

use rand::SeedableRng;
use rand_distr::{Distribution as _, StandardNormal};
use rand_pcg::Pcg64;
use tandemq::{confidence_interval, Config, Simulation};

#[test]
fn mm1_estimates_converge_to_steady_state() {
    // M/M/1 with λ = 1.0, μ = 2.0: ρ = 0.5, L = 1, W = 1
    let config = Config::poisson(1.0, &[2.0], 100_000).unwrap();
    let mut sim = Simulation::new(config, 0x5EA5).unwrap();
    sim.run().unwrap();
    let stats = sim.statistics().unwrap();

    assert_within!(0.5, stats.per_queue[0].utilization, 0.015, "utilization");
    assert_within!(1.0, stats.per_queue[0].mean_length, 0.1, "mean length");
    assert_within!(1.0, stats.per_queue[0].mean_sojourn, 0.1, "mean sojourn");
    assert_within!(1.0, stats.throughput, 0.03, "throughput");

    let residual = stats.little_residual(1.0)[0];
    assert!(residual.abs() < 0.1, "Little's law residual too large: {residual}");
}

#[test]
fn replicated_estimates_agree_with_the_jackson_value() {
    // twenty independent replications of the λ = 1.0, μ = (1.5, 1.2)
    // chain; the closed-form total sojourn is 7.0
    let sojourns: Vec<f64> = (0..20)
        .map(|replication| {
            let config = Config::poisson(1.0, &[1.5, 1.2], 5_000).unwrap();
            let mut sim = Simulation::new(config, 40_000 + replication).unwrap();
            sim.run().unwrap();
            sim.statistics().unwrap().overall_mean_sojourn
        })
        .collect();

    let interval = confidence_interval(&sojourns, 0.95).unwrap();
    assert!(interval.half_width > 0.0);
    assert!(
        interval.half_width < 1.0,
        "interval across 20 replications should be tight, got half-width {}",
        interval.half_width
    );
    assert_within!(7.0, interval.mean, 0.5, "replicated mean total sojourn");
}

#[test]
fn intervals_cover_the_true_mean_at_the_stated_rate() {
    // draw batches of 20 standard normal samples and count how often the
    // 95% interval contains the true mean of zero; the coverage count is
    // binomial around 475 of 500, so the bounds below sit several
    // standard deviations out
    const TRIALS: usize = 500;
    const REPLICATIONS: usize = 20;

    let mut covered = 0;
    for trial in 0..TRIALS {
        let mut rng = Pcg64::seed_from_u64(10_000 + trial as u64);
        let samples: Vec<f64> = (0..REPLICATIONS)
            .map(|_| StandardNormal.sample(&mut rng))
            .collect();
        let interval = confidence_interval(&samples, 0.95).unwrap();
        if interval.mean.abs() <= interval.half_width {
            covered += 1;
        }
    }

    let coverage = covered as f64 / TRIALS as f64;
    assert!(
        (0.91..=0.99).contains(&coverage),
        "95% intervals covered the true mean in {coverage} of trials"
    );
}
