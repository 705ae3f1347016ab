//! # LogWriter - event renderer
//!
//! A minimal subscriber that renders incoming [`Event`]s as `tracing` lines
//! under the `fleetvisor::events` target. Useful for demos and debugging.
//!
//! ## Example output
//! ```text
//! [state] state=RUNNING
//! [queued] bot="irc.libera.chat"
//! [launched] bot=0 name="irc.libera.chat"
//! [failed] bot=1 name="irc.oftc.net" err="disconnected: eof"
//! [removed] bot=1 name="irc.oftc.net"
//! [waiting] outstanding=1
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let name = e.name.as_deref().unwrap_or("unknown");
        let bot = e.bot.map_or_else(|| "-".to_string(), |id| id.to_string());
        match e.kind {
            EventKind::StateChanged => {
                let state = e.state.map_or_else(|| "unknown".to_string(), |s| s.to_string());
                tracing::info!(target: "fleetvisor::events", "[state] state={state}");
            }
            EventKind::ShutdownRequested => {
                tracing::info!(target: "fleetvisor::events", "[shutdown-requested]");
            }
            EventKind::WaitingForBots => {
                let outstanding = e.outstanding.unwrap_or(0);
                tracing::info!(target: "fleetvisor::events", "[waiting] outstanding={outstanding}");
            }
            EventKind::BotQueued => {
                tracing::info!(target: "fleetvisor::events", "[queued] bot={name:?}");
            }
            EventKind::BotLaunched => {
                tracing::info!(target: "fleetvisor::events", "[launched] bot={bot} name={name:?}");
            }
            EventKind::BotFinished => {
                tracing::info!(target: "fleetvisor::events", "[finished] bot={bot} name={name:?}");
            }
            EventKind::BotFailed => {
                tracing::warn!(
                    target: "fleetvisor::events",
                    "[failed] bot={bot} name={name:?} err={}",
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::BotRemoved => {
                tracing::info!(target: "fleetvisor::events", "[removed] bot={bot} name={name:?}");
            }
            EventKind::QuitRequested => {
                tracing::info!(target: "fleetvisor::events", "[quit] bot={bot} name={name:?}");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(
                    target: "fleetvisor::events",
                    "[subscriber-overflow] subscriber={name} reason={}",
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(
                    target: "fleetvisor::events",
                    "[subscriber-panicked] subscriber={name} info={}",
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
