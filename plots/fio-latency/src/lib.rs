use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use common::{
    config::PlotSettings,
    util::{CommandError, remove_file_if_exists},
};
use fio::{RunResult, result::Direction};
use thiserror::Error;
use tokio::{
    fs::{metadata, write},
    time::sleep,
};
use tracing::{debug, info, warn};

pub mod gnuplot;
pub mod series;

pub use gnuplot::{GnuplotSession, PlotSession};
pub use series::LatencySeries;

pub const READ_DATA_FILE: &str = "read_data.tmp";
pub const WRITE_DATA_FILE: &str = "write_data.tmp";

/// Time given to the plotting program to let go of the data files
const RELEASE_DELAY: Duration = Duration::from_millis(100);

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Temporary data files were not created properly: {0:?}")]
    MissingData(Vec<PathBuf>),
    #[error("Plot session already closed")]
    SessionClosed,
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Locations of the intermediate `depth latency` files
#[derive(Debug, Clone, PartialEq)]
pub struct DataFiles {
    pub read: PathBuf,
    pub write: PathBuf,
}

impl DataFiles {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            read: dir.join(READ_DATA_FILE),
            write: dir.join(WRITE_DATA_FILE),
        }
    }

    pub fn get(&self, direction: Direction) -> &Path {
        match direction {
            Direction::Read => &self.read,
            Direction::Write => &self.write,
        }
    }

    /// Best effort, failures are only logged
    pub async fn cleanup(&self) {
        for file in [&self.read, &self.write] {
            match remove_file_if_exists(file).await {
                Ok(true) => debug!("Removed {}", file.display()),
                Ok(false) => {}
                Err(err) => warn!(
                    "Warning: Could not remove temporary file {}: {err}",
                    file.display()
                ),
            }
        }
    }
}

struct Line {
    direction: Direction,
    style: u8,
    title: &'static str,
}

const LINES: [Line; 2] = [
    Line {
        direction: Direction::Read,
        style: 1,
        title: "Read Latency",
    },
    Line {
        direction: Direction::Write,
        style: 2,
        title: "Write Latency",
    },
];

fn quote_single(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', "''"))
}

fn quote_double(path: &Path) -> String {
    let escaped = path
        .display()
        .to_string()
        .replace('\\', "\\\\")
        .replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Commands sent ahead of the plot command
pub fn setup_commands(output: &Path) -> Vec<String> {
    let mut cmds = vec![
        "set terminal png size 1600,900 enhanced".to_owned(),
        format!("set output {}", quote_double(output)),
    ];
    cmds.extend(
        [
            "set logscale xy",
            "set grid xtics ytics mxtics mytics",
            r##"set grid lt 1 lc rgb "#808080" lw 1"##,
            r#"set xlabel "IO Depth""#,
            r#"set ylabel "Latency (μs)""#,
            r#"set title "Latency vs IO Depth\nBlock Device Performance Test""#,
            "set key left top",
            "set yrange [1:*]",
            "set xrange [0.8:300]",
            r##"set style line 1 lt 1 lc rgb "#0060ad" lw 2 pt 7 ps 1.5"##,
            r##"set style line 2 lt 1 lc rgb "#dd181f" lw 2 pt 5 ps 1.5"##,
            "set mxtics 10",
            "set mytics 10",
        ]
        .into_iter()
        .map(str::to_owned),
    );
    cmds
}

/// Builds a single `plot` command from the data files that are present,
/// or `None` when there is nothing to draw
pub fn plot_command(files: &DataFiles, present: &[Direction]) -> Option<String> {
    let items = LINES
        .iter()
        .filter(|line| present.contains(&line.direction))
        .map(|line| {
            format!(
                "{} with linespoints ls {} title '{}'",
                quote_single(files.get(line.direction)),
                line.style,
                line.title
            )
        })
        .collect::<Vec<_>>();
    if items.is_empty() {
        None
    } else {
        Some(format!("plot {}", items.join(", ")))
    }
}

async fn non_empty(path: &Path) -> bool {
    metadata(path).await.is_ok_and(|m| m.len() > 0)
}

/// Writes one file per non-empty series. Files left over from an earlier run
/// are removed first so they never end up in the plot.
pub async fn write_data_files(series: &LatencySeries, files: &DataFiles) -> Result<(), PlotError> {
    for line in &LINES {
        let path = files.get(line.direction);
        remove_file_if_exists(path).await?;
        let data = series.get(line.direction);
        if !data.is_empty() {
            write(path, series::to_data_lines(data)).await?;
            debug!("Wrote {} points to {}", data.len(), path.display());
        }
    }
    Ok(())
}

/// Fails when a series has data but its file is missing or empty
pub async fn check_data_files(series: &LatencySeries, files: &DataFiles) -> Result<(), PlotError> {
    let mut missing = Vec::new();
    for line in &LINES {
        let path = files.get(line.direction);
        if !series.get(line.direction).is_empty() && !non_empty(path).await {
            missing.push(path.to_path_buf());
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PlotError::MissingData(missing))
    }
}

async fn draw<S: PlotSession + ?Sized>(
    series: &LatencySeries,
    files: &DataFiles,
    output: &Path,
    session: &mut S,
) -> Result<(), PlotError> {
    write_data_files(series, files).await?;
    check_data_files(series, files).await?;

    for cmd in setup_commands(output) {
        session.send(&cmd).await?;
    }

    let mut present = Vec::new();
    for line in &LINES {
        if files.get(line.direction).exists() {
            present.push(line.direction);
        }
    }
    match plot_command(files, &present) {
        Some(cmd) => {
            session.send(&cmd).await?;
            info!("Plot written to {}", output.display());
        }
        None => warn!("No data files found for plotting!"),
    }
    Ok(())
}

/// Renders latency against I/O depth for `results` into `settings.output`.
///
/// The session is always closed and the data files in `settings.work_dir`
/// are always removed, whether drawing succeeded or not.
pub async fn render<S: PlotSession + ?Sized>(
    results: &[RunResult],
    settings: &PlotSettings,
    session: &mut S,
) -> Result<(), PlotError> {
    let series = LatencySeries::from_results(results);
    debug!(
        "read points={} write points={}",
        series.read.len(),
        series.write.len()
    );
    let files = DataFiles::in_dir(&settings.work_dir);

    let drawn = draw(&series, &files, &settings.output, session).await;
    let closed = session.close().await;
    sleep(RELEASE_DELAY).await;
    files.cleanup().await;

    drawn?;
    closed
}
