use std::{env::current_dir, path::PathBuf};

use common::config::{PlotSettings, Settings};
use eyre::{Context, Result};
use fio::{Fio, FioRunner, sweep};
use fio_latency::GnuplotSession;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub settings: Settings,
    pub output: PathBuf,
}

pub async fn run(args: Args) -> Result<()> {
    let Args { settings, output } = args;
    let fio = Fio::default();
    debug!("settings={settings:?} fio={fio:?}");

    let runner = FioRunner::new(settings.clone(), fio.clone());
    let results = sweep(&runner, &fio).await;
    info!("Collected {} results", results.len());

    let plot_settings = PlotSettings {
        output,
        work_dir: current_dir().context("Reading working directory")?,
    };
    let mut session =
        GnuplotSession::spawn(&settings.programs.gnuplot).context("Starting gnuplot")?;
    fio_latency::render(&results, &plot_settings, &mut session)
        .await
        .context("Rendering latency plot")?;

    debug!("Exiting");
    Ok(())
}
