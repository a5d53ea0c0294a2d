use std::collections::BTreeMap;

use fio::{RunResult, result::Direction};

/// Mean completion latency in µs keyed by I/O depth, one map per direction
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LatencySeries {
    pub read: BTreeMap<usize, f64>,
    pub write: BTreeMap<usize, f64>,
}

impl LatencySeries {
    /// Collects every strictly positive mean latency. A later result for the
    /// same depth replaces an earlier one.
    pub fn from_results(results: &[RunResult]) -> Self {
        let mut series = Self::default();
        for result in results {
            for direction in [Direction::Read, Direction::Write] {
                let Some(latency) = result.job.mean_clat_us(direction) else {
                    continue;
                };
                if latency > 0.0 {
                    series.get_mut(direction).insert(result.iodepth, latency);
                }
            }
        }
        series
    }

    pub fn get(&self, direction: Direction) -> &BTreeMap<usize, f64> {
        match direction {
            Direction::Read => &self.read,
            Direction::Write => &self.write,
        }
    }

    fn get_mut(&mut self, direction: Direction) -> &mut BTreeMap<usize, f64> {
        match direction {
            Direction::Read => &mut self.read,
            Direction::Write => &mut self.write,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.read.is_empty() && self.write.is_empty()
    }
}

/// `depth latency` lines in ascending depth order
pub fn to_data_lines(series: &BTreeMap<usize, f64>) -> String {
    series
        .iter()
        .map(|(depth, latency)| format!("{depth} {latency}\n"))
        .collect()
}
