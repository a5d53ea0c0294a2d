use std::fmt;

use common::config::Settings;
use itertools::iproduct;
use serde::{Deserialize, Serialize};


pub use runner::{BenchRunner, FioRunner, RunError};
pub use sweep::{RunResult, sweep};

/// The fixed fio job shape swept over every test type and I/O depth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fio {
    pub test_types: Vec<FioTestType>,
    pub request_size: String,
    pub io_engine: String,
    pub io_depths: Vec<usize>,
    pub direct: bool,
    pub time_based: bool,
    pub runtime: Option<String>,
    pub size: Option<String>,
    pub num_jobs: usize,
}

impl Default for Fio {
    fn default() -> Self {
        Self {
            test_types: vec![FioTestType::Randread, FioTestType::Randwrite],
            request_size: "4k".to_owned(),
            io_engine: "libaio".to_owned(),
            io_depths: vec![1, 2, 4, 8, 16, 32, 64, 128, 256],
            direct: true,
            time_based: true,
            runtime: Some("30".to_owned()),
            size: Some("1G".to_owned()),
            num_jobs: 1,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FioTestType {
    #[default]
    Randread,
    Randwrite,
}

impl FioTestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FioTestType::Randread => "randread",
            FioTestType::Randwrite => "randwrite",
        }
    }
}

impl fmt::Display for FioTestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single point of the sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunParams {
    pub test_type: FioTestType,
    pub io_depth: usize,
}

fn int(item: bool) -> u8 {
    if item { 1 } else { 0 }
}

impl Fio {
    /// Every (test type, depth) pair, test type outermost
    pub fn runs(&self) -> Vec<RunParams> {
        iproduct!(self.test_types.iter(), self.io_depths.iter())
            .map(|(test_type, io_depth)| RunParams {
                test_type: *test_type,
                io_depth: *io_depth,
            })
            .collect()
    }

    pub fn args(&self, settings: &Settings, params: &RunParams) -> Vec<String> {
        let mut args = vec!["--name", "--filename", "--ioengine", "--direct", "--bs"]
            .into_iter()
            .zip(vec![
                settings.name.clone(),
                settings.device.clone(),
                self.io_engine.clone(),
                int(self.direct).to_string(),
                self.request_size.clone(),
            ])
            .map(|(arg, value)| format!("{arg}={value}"))
            .collect::<Vec<_>>();

        if let Some(size) = &self.size {
            args.push(format!("--size={size}"));
        }
        args.push(format!("--numjobs={}", self.num_jobs));
        args.push(format!("--rw={}", params.test_type));
        args.push(format!("--iodepth={}", params.io_depth));
        args.push("--output-format=json".to_owned());
        if self.time_based {
            args.push("--time_based".to_owned());
        }
        if let Some(runtime) = &self.runtime {
            args.push(format!("--runtime={runtime}"));
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matrix_has_eighteen_runs() {
        let runs = Fio::default().runs();
        assert_eq!(runs.len(), 18);
        assert!(runs[..9].iter().all(|r| r.test_type == FioTestType::Randread));
        assert!(runs[9..].iter().all(|r| r.test_type == FioTestType::Randwrite));
        let depths = runs[..9].iter().map(|r| r.io_depth).collect::<Vec<_>>();
        assert_eq!(depths, vec![1, 2, 4, 8, 16, 32, 64, 128, 256]);
    }

    #[test]
    fn fixed_argument_list() {
        let settings = Settings::new("nvme-lat", "/dev/nvme0n1");
        let params = RunParams {
            test_type: FioTestType::Randwrite,
            io_depth: 32,
        };
        let args = Fio::default().args(&settings, &params);
        assert_eq!(
            args,
            vec![
                "--name=nvme-lat",
                "--filename=/dev/nvme0n1",
                "--ioengine=libaio",
                "--direct=1",
                "--bs=4k",
                "--size=1G",
                "--numjobs=1",
                "--rw=randwrite",
                "--iodepth=32",
                "--output-format=json",
                "--time_based",
                "--runtime=30",
            ]
        );
    }

    #[test]
    fn test_type_names() {
        assert_eq!(FioTestType::Randread.to_string(), "randread");
        assert_eq!(
            serde_json::to_string(&FioTestType::Randwrite).unwrap(),
            "\"randwrite\""
        );
    }
}
