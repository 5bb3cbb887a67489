use anyhow::{Context, bail};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use chatwatch::config::WatchConfig;
use chatwatch::poller::{PollLoop, spawn_poller};

/// What the binary was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Poll until ctrl-c.
    Run,
    /// One cycle, qualifying records printed as JSON.
    Once,
}

impl Mode {
    fn parse(arg: Option<&str>) -> anyhow::Result<Self> {
        match arg {
            None | Some("run") => Ok(Self::Run),
            Some("once") => Ok(Self::Once),
            Some(other) => bail!("Unknown mode '{other}' (expected 'run' or 'once')"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = init_tracing()?;

    let mode = Mode::parse(std::env::args().nth(1).as_deref())?;
    let config = WatchConfig::from_env().context("Failed to load configuration")?;

    let mut poll_loop = PollLoop::from_config(&config).context("Failed to build poller")?;

    match mode {
        Mode::Run => {
            tracing::info!(
                "chatwatch v{}: polling {} every {}s, last {} minute(s)",
                env!("CARGO_PKG_VERSION"),
                config.endpoint,
                config.poll_interval.as_secs(),
                config.window_minutes,
            );

            let (handle, cancel) = spawn_poller(poll_loop);
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for ctrl-c")?;
            tracing::info!("Shutdown requested, waiting for current cycle");
            cancel.cancel();
            let watermark = handle.await.context("Poller task failed")?;
            tracing::info!(watermark, "Stopped");
        }
        Mode::Once => {
            let report = poll_loop
                .run_cycle()
                .await
                .context("Poll cycle failed")?;
            tracing::info!(
                fetched = report.fetched,
                delivered = report.delivered,
                failed = report.failed,
                "Single cycle complete"
            );
            println!("{}", serde_json::to_string(&report.qualifying)?);
        }
    }

    Ok(())
}

/// Console logging, plus daily rolling files when `CHATWATCH_LOG_DIR` is set.
fn init_tracing() -> anyhow::Result<Option<WorkerGuard>> {
    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(env_filter());

    let (file, guard) = match std::env::var("CHATWATCH_LOG_DIR") {
        Ok(dir) if !dir.trim().is_empty() => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {dir}"))?;
            let appender = tracing_appender::rolling::daily(&dir, "chatwatch.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(env_filter());
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry().with(console).with(file).init();
    Ok(guard)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
