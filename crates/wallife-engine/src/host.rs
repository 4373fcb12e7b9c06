//! Host command stream.
//!
//! The engine stands in for a wallpaper host by reading one command per
//! line from stdin:
//!
//! ```text
//! pause
//! resume
//! click
//! resize 1280 720
//! {"cell_size": 14, "wrap_edges": false}
//! quit
//! ```
//!
//! A line starting with `{` is a batch of property updates. Lines that fail
//! to parse are logged and skipped.

use std::str::FromStr;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use wallife_core::config::Viewport;
use wallife_core::control::HostControl;

use crate::error::CommandError;

/// One host command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Stop ticking until resumed.
    Pause,
    /// Continue after a pause.
    Resume,
    /// Pointer click: reset the simulation.
    Click,
    /// The viewport changed size.
    Resize(Viewport),
    /// Property updates to route through the bridge.
    Properties(Map<String, Value>),
    /// Stop the engine.
    Quit,
}

impl FromStr for HostCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.starts_with('{') {
            return Ok(Self::Properties(serde_json::from_str(line)?));
        }

        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Err(CommandError::Empty);
        };
        match word.to_ascii_lowercase().as_str() {
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "click" | "reset" => Ok(Self::Click),
            "quit" | "exit" | "stop" => Ok(Self::Quit),
            "resize" => {
                let mut dimension = || words.next().and_then(|w| w.parse::<u32>().ok());
                let (Some(width), Some(height)) = (dimension(), dimension()) else {
                    return Err(CommandError::BadResize);
                };
                if words.next().is_some() {
                    return Err(CommandError::BadResize);
                }
                Ok(Self::Resize(Viewport::new(width, height)))
            }
            _ => Err(CommandError::Unknown {
                word: word.to_owned(),
            }),
        }
    }
}

/// Forward one command to the shared control state.
pub async fn dispatch(command: HostCommand, control: &HostControl) {
    match command {
        HostCommand::Pause => control.pause(),
        HostCommand::Resume => control.resume(),
        HostCommand::Click => control.request_reset(),
        HostCommand::Resize(viewport) => control.request_resize(viewport).await,
        HostCommand::Properties(batch) => control.queue_properties(batch).await,
        HostCommand::Quit => control.request_stop(),
    }
}

/// Read host commands from stdin until it closes or a quit arrives.
pub fn spawn_stdin_reader(control: Arc<HostControl>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match line.parse::<HostCommand>() {
                        Ok(command) => {
                            debug!(?command, "Host command received");
                            let quit = command == HostCommand::Quit;
                            dispatch(command, &control).await;
                            if quit {
                                info!("Quit received on stdin");
                                break;
                            }
                        }
                        Err(error) => warn!(%error, line = %line, "Ignoring host command"),
                    }
                }
                Ok(None) => {
                    debug!("stdin closed, no further host commands");
                    break;
                }
                Err(error) => {
                    warn!(%error, "Failed to read stdin, no further host commands");
                    break;
                }
            }
        }
    })
}
