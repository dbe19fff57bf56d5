//! Command handlers.
//!
//! Each command loads the configuration, applies the `--file`/`--url`
//! overrides to its `server` section and builds the plan source from it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use buildwatch_core::{
    source, Aggregator, FetchError, Monitor, MonitorConfig, MonitorError, PlanSource,
    PollObserver, Poller, Snapshot, SnapshotTable,
};
use log::{info, warn};
use tokio::sync::watch;

use crate::args::SourceArgs;
use crate::renderer::TerminalRenderer;
use crate::sinks;

pub struct Cli {
    config_path: Option<PathBuf>,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(config_path: Option<PathBuf>, renderer: TerminalRenderer) -> Self {
        Self {
            config_path,
            renderer,
        }
    }

    fn load_config(&self, overrides: &SourceArgs) -> Result<MonitorConfig> {
        let (mut config, path) = MonitorConfig::load(self.config_path.as_deref())
            .context("Failed to load configuration")?;
        if let Some(path) = path {
            info!("Loaded configuration from {}", path.display());
        }
        overrides.apply(&mut config.server);
        Ok(config)
    }

    fn build_source(config: &MonitorConfig) -> Result<Arc<dyn PlanSource>> {
        let source = source::from_config(&config.server).context("No usable plan source")?;
        Ok(Arc::from(source))
    }

    /// Runs the monitor until Ctrl-C. On Unix, SIGHUP reloads the
    /// configuration; the plan source itself is kept.
    pub async fn watch(&self, overrides: &SourceArgs) -> Result<()> {
        let config = self.load_config(overrides)?;
        let source = Self::build_source(&config)?;
        let description = source.describe();

        let (config_tx, config_rx) = watch::channel(config);
        let monitor = Monitor::new(source, config_rx, sinks::ports(&self.renderer))
            .context("Failed to start monitor")?;

        self.renderer
            .render(&format!("Watching {description}, press Ctrl-C to stop\n\n"))?;
        let handle = monitor.start();
        let mut hangup = Hangup::new();

        let outcome = loop {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    break result.context("Failed to listen for Ctrl-C");
                }
                _ = hangup.recv() => match self.load_config(overrides) {
                    Ok(config) => {
                        info!("Configuration reloaded");
                        config_tx.send_replace(config);
                    }
                    Err(e) => warn!("Keeping current configuration: {e:#}"),
                },
            }
        };

        handle.shutdown().await;
        outcome
    }

    /// Fetches once and prints the plans with the aggregate state.
    pub async fn check(&self, overrides: &SourceArgs) -> Result<()> {
        let config = self.load_config(overrides)?;
        config.warn_disabled_features();
        let source = Self::build_source(&config)?;
        let description = source.describe();

        let mut poller = Poller::new(source, config.poll_settings()?)?;
        poller.tick();
        let result = poller.wait().await;

        let mut outcome = CheckOutcome::default();
        poller.complete(result, &mut outcome);

        match outcome.0 {
            Some(Ok(snapshot)) => {
                let state = Aggregator::new().apply_snapshot(&snapshot);
                self.renderer
                    .render(&SnapshotTable::new(&snapshot).to_string())?;
                self.renderer.render(&format!("**State:** {state}\n"))
            }
            Some(Err(e)) => Err(MonitorError::from(e))
                .with_context(|| format!("Fetch from {description} failed")),
            None => bail!("Fetch from {description} produced no result"),
        }
    }

    /// Prints the configuration that would be used, with secrets masked.
    pub fn show_config(&self) -> Result<()> {
        let (mut config, path) = MonitorConfig::load(self.config_path.as_deref())
            .context("Failed to load configuration")?;

        let location = match path {
            Some(path) => path.display().to_string(),
            None => "defaults, no configuration file found".to_string(),
        };
        let mut output = format!("# Configuration\n\nSource: {location}\n\n");
        for feature in config.disabled_features() {
            output.push_str(&format!("- Disabled {feature}\n"));
        }
        self.renderer.render(&output)?;

        if config.server.password.is_some() {
            config.server.password = Some("********".to_string());
        }
        println!("{}", serde_json::to_string_pretty(&config)?);
        Ok(())
    }
}

#[derive(Default)]
struct CheckOutcome(Option<std::result::Result<Snapshot, FetchError>>);

impl PollObserver for CheckOutcome {
    fn on_snapshot(&mut self, _previous: &Snapshot, current: &Snapshot) {
        self.0 = Some(Ok(current.clone()));
    }

    fn on_error(&mut self, error: &FetchError) {
        self.0 = Some(Err(error.clone()));
    }
}

#[cfg(unix)]
struct Hangup(Option<tokio::signal::unix::Signal>);

#[cfg(unix)]
impl Hangup {
    fn new() -> Self {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::hangup()) {
            Ok(signal) => Self(Some(signal)),
            Err(e) => {
                warn!("Configuration reload on SIGHUP unavailable: {e}");
                Self(None)
            }
        }
    }

    async fn recv(&mut self) {
        if let Some(signal) = &mut self.0 {
            if signal.recv().await.is_some() {
                return;
            }
            self.0 = None;
        }
        std::future::pending().await
    }
}

#[cfg(not(unix))]
struct Hangup;

#[cfg(not(unix))]
impl Hangup {
    fn new() -> Self {
        Self
    }

    async fn recv(&mut self) {
        std::future::pending().await
    }
}
