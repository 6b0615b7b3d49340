//! Locally synthesized measurements for demo mode.

use rand::Rng;

use crate::core::schema::bytes_to_mb;

/// Spark time is drawn from this range, in milliseconds.
pub const SPARK_TIME_RANGE_MS: std::ops::Range<f64> = 500.0..2500.0;

/// Pandas time is Spark time multiplied by a factor from this range.
pub const PANDAS_SLOWDOWN_RANGE: std::ops::Range<f64> = 2.0..5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedTimings {
    pub spark_ms: f64,
    pub pandas_ms: f64,
    pub spark_throughput: f64,
    pub pandas_throughput: f64,
}

pub fn simulate<R: Rng + ?Sized>(rng: &mut R, file_size: u64) -> SimulatedTimings {
    let spark_ms = rng.gen_range(SPARK_TIME_RANGE_MS);
    let pandas_ms = spark_ms * rng.gen_range(PANDAS_SLOWDOWN_RANGE);
    let size_mb = bytes_to_mb(file_size);
    SimulatedTimings {
        spark_ms,
        pandas_ms,
        spark_throughput: throughput_mbps(size_mb, spark_ms),
        pandas_throughput: throughput_mbps(size_mb, pandas_ms),
    }
}

/// MB processed per second.
pub fn throughput_mbps(size_mb: f64, time_ms: f64) -> f64 {
    size_mb / (time_ms / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_simulated_values_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let size = 10 * 1024 * 1024;
        for _ in 0..1000 {
            let t = simulate(&mut rng, size);
            assert!(SPARK_TIME_RANGE_MS.contains(&t.spark_ms));
            let ratio = t.pandas_ms / t.spark_ms;
            assert!((2.0..5.0).contains(&ratio), "ratio {ratio}");
            assert!((t.spark_throughput - 10.0 / (t.spark_ms / 1000.0)).abs() < 1e-9);
            assert!((t.pandas_throughput - 10.0 / (t.pandas_ms / 1000.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_file_has_zero_throughput() {
        let mut rng = StdRng::seed_from_u64(1);
        let t = simulate(&mut rng, 0);
        assert_eq!(t.spark_throughput, 0.0);
        assert_eq!(t.pandas_throughput, 0.0);
    }

    #[test]
    fn test_throughput() {
        assert!((throughput_mbps(10.0, 800.0) - 12.5).abs() < 1e-12);
    }
}
