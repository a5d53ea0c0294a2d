use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Test name passed through to fio as `--name`
    pub name: String,
    /// Block device or file under test
    pub device: String,
    pub programs: Programs,
}

/// External programs the sweep shells out to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Programs {
    pub fio: String,
    pub gnuplot: String,
}

impl Default for Programs {
    fn default() -> Self {
        Self {
            fio: "fio".to_owned(),
            gnuplot: "gnuplot".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotSettings {
    /// PNG written by gnuplot
    pub output: PathBuf,
    /// Directory holding the intermediate data files
    pub work_dir: PathBuf,
}

impl Settings {
    pub fn new(name: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            device: device.into(),
            programs: Programs::default(),
        }
    }

    pub fn with_programs(mut self, programs: Programs) -> Self {
        self.programs = programs;
        self
    }
}
