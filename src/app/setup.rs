//! Application setup and the main loop.
//!
//! Builds every service from the configuration, then feeds utterances from
//! stdin (or `--utterance`) to the dispatcher while the gesture button runs
//! on the same runtime.

use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::app::Cli;
use crate::config::{self, AppConfig, ConfigError, GestureConfig};
use crate::events::LogEventEmitter;
use crate::gesture::{GestureConfigError, GestureSwitch, GestureTable, PulseListener};
use crate::speaker::{CommandSpeaker, LogSpeaker, Speaker};
use crate::voice_commands::actions::{CommandRunner, SystemRunner};
use crate::voice_commands::catalog::{build_registry, Effectors};
use crate::voice_commands::registry::RegistryError;
use crate::voice_commands::{ActionDispatcher, DispatchOutcome};

/// Error types for application setup
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to build keyword actions: {0}")]
    Registry(#[from] RegistryError),
    #[error("Invalid gesture configuration: {0}")]
    Gesture(#[from] GestureConfigError),
    #[error("Failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("Failed to read input: {0}")]
    Input(#[source] std::io::Error),
}

/// Everything the main loop needs
pub struct Services {
    pub dispatcher: ActionDispatcher,
    /// The gesture button, when enabled and available
    pub listener: Option<PulseListener>,
}

/// Install the log subscriber. `RUST_LOG` overrides the default level.
pub fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .try_init();
    if let Err(e) = result {
        eprintln!("Logging already initialised: {}", e);
    }
}

/// Load configuration and run until Ctrl+C, or end of input when there is
/// no gesture button.
#[cfg_attr(coverage_nightly, coverage(off))]
pub fn run(cli: Cli) -> Result<(), SetupError> {
    crate::info!("Setting up heypi...");

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let config = AppConfig::load(&config_path)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(SetupError::Runtime)?;

    let with_gesture = !cli.no_gesture && cli.utterance.is_none();
    let services = build_services(&config, runtime.handle().clone(), with_gesture)?;
    crate::info!("Setup complete! Ready for commands.");

    if let Some(listener) = &services.listener {
        crate::info!(
            "Gesture button active (window {:?})",
            listener.switch().window()
        );
    }
    let keep_alive = services.listener.is_some();

    let result = runtime.block_on(async {
        match cli.utterance {
            Some(utterance) => {
                report(&services.dispatcher.dispatch(&utterance).await);
                Ok(())
            }
            None => {
                let stdin = BufReader::new(tokio::io::stdin());
                run_loop(&services.dispatcher, stdin, shutdown_signal(), keep_alive).await
            }
        }
    });

    if let Some(listener) = services.listener {
        if let Err(e) = listener.close() {
            crate::warn!("Failed to release gesture button: {}", e);
        }
    }
    // A pending stdin read cannot be cancelled; do not wait for it
    runtime.shutdown_background();
    result
}

/// Build the speaker, actions, dispatcher and (optionally) the gesture button.
pub fn build_services(
    config: &AppConfig,
    runtime: Handle,
    with_gesture: bool,
) -> Result<Services, SetupError> {
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner::default());
    let speaker = build_speaker(config, runner.clone());
    let effectors = Effectors::from_config(config, speaker, runner);

    let registry = Arc::new(build_registry(config, &effectors)?);
    let emitter = Arc::new(LogEventEmitter);
    let dispatcher = ActionDispatcher::new(registry.clone()).with_emitter(emitter.clone());

    let listener = if with_gesture && config.gesture.enabled {
        let table = GestureTable::from_keywords(&registry, &config.gesture.actions)?;
        crate::debug!(
            "Gesture table: {:?}",
            table.keywords().collect::<Vec<_>>()
        );
        let switch = GestureSwitch::new(runtime, table, config.gesture.window(), emitter)?;
        open_pulse_listener(&config.gesture, switch)
    } else {
        crate::info!("Gesture button disabled");
        None
    };

    Ok(Services {
        dispatcher,
        listener,
    })
}

fn build_speaker(config: &AppConfig, runner: Arc<dyn CommandRunner>) -> Arc<dyn Speaker> {
    match config
        .speaker
        .command
        .as_deref()
        .and_then(|command| CommandSpeaker::from_command(command, runner))
    {
        Some(speaker) => Arc::new(speaker),
        None => {
            crate::info!("No speaker command configured, replies go to the log");
            Arc::new(LogSpeaker)
        }
    }
}

#[cfg(all(feature = "gpio", target_os = "linux"))]
fn open_pulse_listener(config: &GestureConfig, switch: GestureSwitch) -> Option<PulseListener> {
    let source = Box::new(crate::gesture::gpio::GpioPulseSource::new(config.pin));
    match PulseListener::open(source, switch, config.debounce()) {
        Ok(listener) => Some(listener),
        Err(e) => {
            crate::warn!("Gesture button unavailable: {}", e);
            None
        }
    }
}

#[cfg(not(all(feature = "gpio", target_os = "linux")))]
fn open_pulse_listener(config: &GestureConfig, switch: GestureSwitch) -> Option<PulseListener> {
    crate::warn!(
        "Built without GPIO support, ignoring gesture button on BCM {}",
        config.pin
    );
    switch.close();
    None
}

/// Receiver that flips to true on Ctrl+C
fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = tx.send(true);
    }) {
        crate::warn!("Failed to set Ctrl+C handler: {}", e);
    }
    rx
}

/// Dispatch one utterance per line until shutdown is signalled.
///
/// End of input stops the loop unless `keep_alive` is set, in which case the
/// loop waits for shutdown (the gesture button keeps working meanwhile).
pub async fn run_loop<R>(
    dispatcher: &ActionDispatcher,
    input: R,
    mut shutdown: watch::Receiver<bool>,
    keep_alive: bool,
) -> Result<(), SetupError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut input_open = true;
    let mut shutdown_open = true;
    loop {
        tokio::select! {
            changed = shutdown.changed(), if shutdown_open => {
                if changed.is_ok() {
                    crate::info!("Shutdown requested");
                    break;
                }
                crate::warn!("Shutdown signal dropped");
                shutdown_open = false;
            }
            line = lines.next_line(), if input_open => {
                match line.map_err(SetupError::Input)? {
                    Some(line) => {
                        let utterance = line.trim();
                        if !utterance.is_empty() {
                            report(&dispatcher.dispatch(utterance).await);
                        }
                    }
                    None if keep_alive => {
                        crate::info!("End of input, waiting for gestures until shutdown");
                        input_open = false;
                    }
                    None => {
                        crate::info!("End of input");
                        break;
                    }
                }
            }
            else => break,
        }
    }
    Ok(())
}

fn report(outcome: &DispatchOutcome) {
    match outcome {
        DispatchOutcome::NoMatch => crate::info!("Sorry, no command for that"),
        DispatchOutcome::Executed { keyword, result } => {
            crate::debug!("{:?} -> {:?}", keyword, result.message)
        }
        DispatchOutcome::Failed { .. } => {}
    }
}

#[cfg(test)]
#[path = "setup_test.rs"]
mod tests;
