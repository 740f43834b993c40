//! Post-run reduction of kernel state into reportable metrics, the
//! closed-form Jackson reference, and replication confidence intervals.

use crate::error::{Error, Result};
use crate::job::{Job, Visit};
use crate::simulation::Simulation;

/// Per-station averages, over one run or in closed form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueStatistics {
    /// Fraction of elapsed time the server was busy.
    pub utilization: f64,
    /// Time-average number of jobs at the station.
    pub mean_length: f64,
    /// Mean time a job spent at the station, arrival to departure.
    pub mean_sojourn: f64,
}

/// Aggregate output of one completed run, ready to hand to whatever
/// reporting layer sits on top.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatistics {
    /// Simulation time at which the completion target was reached.
    pub elapsed: f64,
    /// Completed jobs per unit of simulation time.
    pub throughput: f64,
    /// Per-station averages in chain order.
    pub per_queue: Vec<QueueStatistics>,
    /// Sum of per-station mean lengths.
    pub overall_mean_length: f64,
    /// Mean total sojourn across jobs that finished the whole chain.
    pub overall_mean_sojourn: f64,
}

impl RunStatistics {
    /// Reduce a finished simulation into its aggregate statistics.
    ///
    /// Per-station sojourn means cover exactly the jobs that departed
    /// that station; the overall sojourn mean covers jobs that finished
    /// the whole chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateRun`] when no simulation time elapsed
    /// or no job completed, as every time-averaged metric would then be
    /// undefined.
    pub fn from_run(sim: &Simulation) -> Result<Self> {
        let elapsed = sim.current_time();
        let completed = sim.completed_jobs();
        if elapsed <= 0.0 || completed == 0 {
            return Err(Error::DegenerateRun);
        }

        let chain_len = sim.nodes().len();
        let mut per_queue = Vec::with_capacity(chain_len);
        for node in sim.nodes() {
            let sojourns = sim
                .jobs()
                .iter()
                .filter_map(|job| job.visit(node.index()).and_then(Visit::sojourn));
            per_queue.push(QueueStatistics {
                utilization: node.busy_time() / elapsed,
                mean_length: node.occupancy_integral() / elapsed,
                mean_sojourn: mean(sojourns).unwrap_or(0.0),
            });
        }

        let totals = sim
            .jobs()
            .iter()
            .filter(|job| job.is_complete(chain_len))
            .filter_map(Job::total_sojourn);
        let overall_mean_sojourn = mean(totals).ok_or(Error::DegenerateRun)?;

        Ok(Self {
            elapsed,
            throughput: completed as f64 / elapsed,
            overall_mean_length: per_queue.iter().map(|q| q.mean_length).sum(),
            overall_mean_sojourn,
            per_queue,
        })
    }

    /// Little's-law residual `L_i - λ·W_i` per station, for diagnosing
    /// how far a run sits from steady state. Near zero for a long,
    /// stable run when `arrival_rate` is the chain's effective rate.
    pub fn little_residual(&self, arrival_rate: f64) -> Vec<f64> {
        self.per_queue
            .iter()
            .map(|q| q.mean_length - arrival_rate * q.mean_sojourn)
            .collect()
    }
}

/// Closed-form steady-state values for an open tandem chain of M/M/1
/// stations, produced by [`Config::jackson_reference`].
///
/// [`Config::jackson_reference`]: crate::Config::jackson_reference
#[derive(Debug, Clone, PartialEq)]
pub struct JacksonReference {
    /// Per-station `ρ`, `ρ/(1-ρ)`, and `1/(μ-λ)` in chain order.
    pub per_queue: Vec<QueueStatistics>,
    /// Sum of per-station mean lengths.
    pub overall_mean_length: f64,
    /// Sum of per-station mean sojourns.
    pub overall_mean_sojourn: f64,
    /// Equal to the exogenous arrival rate for a stable open chain.
    pub throughput: f64,
}

/// A replication estimate: sample mean and the half-width of its
/// confidence interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    /// Sample mean across replications.
    pub mean: f64,
    /// Half-width of the interval at the requested confidence.
    pub half_width: f64,
}

/// Estimate a scalar metric from independent replication outputs.
///
/// The half-width is `t · s / √R` with the Student-t critical value at
/// `R - 1` degrees of freedom, which is exact at any replication count;
/// no large-sample normal approximation is substituted.
///
/// # Errors
///
/// Returns [`Error::Config`] for fewer than two samples or a confidence
/// level outside the open interval `(0, 1)`.
pub fn confidence_interval(samples: &[f64], confidence: f64) -> Result<ConfidenceInterval> {
    if samples.len() < 2 {
        return Err(Error::config("confidence interval requires at least two replications"));
    }
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(Error::config(format!(
            "confidence level must lie strictly between zero and one, got {confidence}"
        )));
    }

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1.0);
    let critical = student_t_critical(confidence, samples.len() - 1);

    Ok(ConfidenceInterval {
        mean,
        half_width: critical * variance.sqrt() / n.sqrt(),
    })
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut total = 0.0;
    let mut count = 0usize;
    for value in values {
        total += value;
        count += 1;
    }
    (count > 0).then(|| total / count as f64)
}

/// Two-sided Student-t critical value: the `t` with
/// `P(|T| <= t) = confidence` at `df` degrees of freedom.
///
/// Found by bisection on the tail probability
/// `P(|T| > t) = I_x(df/2, 1/2)` with `x = df / (df + t²)`, which is
/// monotone decreasing in `t`.
fn student_t_critical(confidence: f64, df: usize) -> f64 {
    let nu = df as f64;
    let alpha = 1.0 - confidence;
    let tail = |t: f64| regularized_incomplete_beta(nu / 2.0, 0.5, nu / (nu + t * t));

    let mut hi = 1.0;
    while tail(hi) > alpha && hi < 1e9 {
        hi *= 2.0;
    }
    let mut lo = 0.0;
    for _ in 0..128 {
        let mid = 0.5 * (lo + hi);
        if tail(mid) > alpha {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// Regularized incomplete beta function `I_x(a, b)`, via the continued
/// fraction expansion, switching to the symmetric form where the
/// fraction converges faster.
fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITERATIONS: usize = 200;
    const EPSILON: f64 = 3.0e-14;
    const TINY: f64 = 1.0e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        let numerator = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + numerator * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + numerator / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        h *= d * c;

        let numerator = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + numerator * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + numerator / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }
    h
}

/// Natural log of the gamma function, Lanczos approximation (g = 7).
fn ln_gamma(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_59,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_571_6e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return pi.ln() - (pi * x).sin().ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut sum = COEFFICIENTS[0];
    for (i, &coefficient) in COEFFICIENTS.iter().enumerate().skip(1) {
        sum += coefficient / (x + i as f64);
    }
    let t = x + 7.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}
