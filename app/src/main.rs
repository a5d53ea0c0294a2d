use std::path::PathBuf;

use clap::Parser;
use eyre::Result;
use tracing::error;
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

mod bench;

const MODULES: &[&str] = &["common", "fio", "fio_latency"];

/// Block device performance testing
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Test name
    #[arg(long)]
    name: String,
    /// Device or file to test
    #[arg(long)]
    filename: String,
    /// Output PNG file path
    #[arg(long)]
    output: PathBuf,
    /// fio executable
    #[arg(long, default_value = "fio")]
    fio_program: String,
    /// gnuplot executable
    #[arg(long, default_value = "gnuplot")]
    gnuplot_program: String,
    /// Extra log filter directives, ie. `fio=debug`
    #[arg(short, long)]
    log: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("info".to_owned());
    let args = Cli::parse();
    let file_appender = tracing_appender::rolling::never(".", "log.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let mut env_filter = EnvFilter::new(format!("blktest={log_level}"));

    for log in &args.log {
        env_filter = env_filter.add_directive(log.parse()?);
    }

    for module in MODULES {
        if !args.log.iter().any(|x| x.split('=').next() == Some(module)) {
            env_filter = env_filter.add_directive(format!("{module}={log_level}").parse()?);
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .with(layer().with_writer(non_blocking).with_ansi(false))
        .init();

    if let Err(err) = bench::run(args.into()).await {
        error!("{err:#?}");
        return Err(err);
    }

    Ok(())
}

impl From<Cli> for bench::Args {
    fn from(cli: Cli) -> Self {
        bench::Args {
            settings: common::config::Settings::new(cli.name, cli.filename).with_programs(
                common::config::Programs {
                    fio: cli.fio_program,
                    gnuplot: cli.gnuplot_program,
                },
            ),
            output: cli.output,
        }
    }
}
