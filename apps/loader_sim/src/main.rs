mod script;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use download::{
    filename_from_disposition, DirectorySink, DownloadFlow, DownloadOutcome, HttpFetcher,
    Navigator, FALLBACK_FILENAME,
};
use loader_core::{Indicator, LoaderRuntime, Mount, PageEvents, RuntimeConfig};
use shared::settings::load_settings;
use tokio::time::Instant;
use tracing::info;
use url::Url;

use crate::script::{parse_script, Action};

#[derive(Parser, Debug)]
struct Cli {
    /// Settings file; defaults to `loader.toml` in the working directory.
    #[arg(long)]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plays a timeline script against the loader and prints every change.
    Run {
        #[arg(long)]
        script: String,
        /// How long to keep running after the last step.
        #[arg(long, default_value_t = 1_000)]
        tail_ms: u64,
    },
    /// Fetches a URL with the loader up, saving into `--out`.
    Download {
        url: Url,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Prints the filename a Content-Disposition header resolves to.
    Filename { header: String },
}

struct LogIndicator {
    started: Instant,
}

impl LogIndicator {
    fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }
}

impl Indicator for LogIndicator {
    fn set_text(&mut self, text: &str) {
        println!("{:>6}ms  text   {text}", self.elapsed_ms());
    }

    fn set_active(&mut self, active: bool) {
        let state = if active { "shown" } else { "hidden" };
        println!("{:>6}ms  {state}", self.elapsed_ms());
    }
}

struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn navigate(&self, url: &Url) {
        println!("navigate {url}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();
    let settings = load_settings(cli.settings);

    match cli.command {
        Command::Run { script, tail_ms } => {
            let steps = parse_script(&script).context("parsing --script")?;
            let started = Instant::now();
            let mount = Mount::new(LogIndicator { started }, settings.mount());
            let events = PageEvents::default();
            let config = RuntimeConfig::from_settings(Some(mount), &settings);
            let runtime = LoaderRuntime::spawn(config, Some(&events));
            let handle = runtime.handle();

            for step in &steps {
                tokio::time::sleep_until(started + step.at).await;
                match &step.action {
                    Action::Show(request) => handle.show(request.clone()),
                    Action::Hide => handle.hide(),
                    Action::Page(event) => {
                        events.emit(event.clone());
                    }
                }
            }

            let last = steps.last().map(|step| step.at).unwrap_or_default();
            tokio::time::sleep_until(started + last + Duration::from_millis(tail_ms)).await;

            if let Some(snapshot) = handle.snapshot().await {
                println!("final    {snapshot:?}");
            }
            drop(handle);
            runtime.shutdown().await;
        }
        Command::Download { url, out } => {
            let indicator = LogIndicator {
                started: Instant::now(),
            };
            let mount = Mount::new(indicator, settings.mount());
            let config = RuntimeConfig::from_settings(Some(mount), &settings);
            let runtime = LoaderRuntime::spawn(config, None);
            let flow = DownloadFlow::new(
                Arc::new(runtime.handle()),
                Arc::new(HttpFetcher::default()),
                Arc::new(DirectorySink::new(out)),
                Arc::new(PrintNavigator),
            )
            .with_text(settings.download_text.clone());

            match flow.run(&url).await {
                DownloadOutcome::Saved { path, filename } => {
                    info!(%filename, "download complete");
                    println!("saved {}", path.display());
                }
                DownloadOutcome::FellBack => println!("download fell back to navigation"),
            }
            // let a deferred hide land before the loop stops
            tokio::time::sleep(settings.timing().min_visible).await;
            drop(flow);
            runtime.shutdown().await;
        }
        Command::Filename { header } => {
            let name = filename_from_disposition(Some(&header))
                .unwrap_or_else(|| FALLBACK_FILENAME.to_owned());
            println!("{name}");
        }
    }

    Ok(())
}
