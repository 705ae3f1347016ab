//! # Demo: fleet
//!
//! Runs a small simulated fleet through its whole lifecycle.
//!
//! Demonstrates how to:
//! - Register bots before `start()` (queued) and after it (launched immediately).
//! - Let one bot fail without disturbing its siblings.
//! - Answer a NOTICE through an [`Outbound`] sink.
//! - Shut down on Ctrl-C or after a few seconds with `stop_and_wait()`.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► add_bot(libera), add_bot(oftc)      (queued)
//!   ├─► start()                             (both launched)
//!   ├─► add_bot(flaky)                      (launched immediately, fails after 1s)
//!   ├─► wait for Ctrl-C or 3s
//!   └─► stop_and_wait()                     (quit → TERMINATED)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example fleet --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use fleetvisor::{
    BotContext, BotError, BotFn, BotRef, Channel, LogWriter, Manager, ManagerConfig, Notice,
    Outbound, Subscribe, User, UserHostmask,
};
use tracing_subscriber::EnvFilter;

/// Prints outgoing lines instead of writing them to a socket.
struct Console {
    network: &'static str,
}

impl Outbound for Console {
    fn send_message(&self, target: &str, text: &str) {
        println!("[{}] -> {target}: {text}", self.network);
    }
}

/// A bot that idles on its network, answers one notice, then waits for quit.
fn network(name: &'static str) -> BotRef {
    BotFn::arc(name, move |ctx: BotContext| serve(name, ctx))
}

async fn serve(name: &'static str, ctx: BotContext) -> Result<(), BotError> {
    let notice = Notice::new(
        UserHostmask::parse("NickServ!services@services.example"),
        Some(User::new("NickServ")),
        None,
        "This nickname is registered.",
    );
    println!("[{name}] notice from {}: {}", notice.hostmask().nick(), notice.message());
    notice
        .respond(&Console { network: name }, "IDENTIFY hunter2")
        .map_err(|e| BotError::Fatal {
            error: e.to_string(),
        })?;

    let mut ticker = tokio::time::interval(Duration::from_millis(700));
    loop {
        tokio::select! {
            _ = ctx.quit.cancelled() => {
                println!("[{name}] QUIT :shutting down");
                return Ok(());
            }
            _ = ticker.tick() => println!("[{name}] PING"),
        }
    }
}

/// A bot whose connection drops after a second.
fn flaky(name: &'static str) -> BotRef {
    BotFn::arc(name, move |_ctx: BotContext| drop_after_a_second(name))
}

async fn drop_after_a_second(name: &'static str) -> Result<(), BotError> {
    tokio::time::sleep(Duration::from_secs(1)).await;
    let notice = Notice::new(
        UserHostmask::parse("irc.flaky.example"),
        None,
        Some(Channel::new("#fleet")),
        "Server going down for maintenance",
    );
    notice
        .respond(&Console { network: name }, "bye")
        .map_err(|e| BotError::Fatal {
            error: e.to_string(),
        })?;
    Err(BotError::Disconnected {
        reason: "connection reset by peer".into(),
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = ManagerConfig {
        poll_interval: Duration::from_millis(500),
        ..ManagerConfig::default()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let manager = Manager::builder(cfg)
        .with_number(1)
        .with_subscribers(subs)
        .build();

    manager.add_bot(network("irc.libera.chat"))?;
    manager.add_bot(network("irc.oftc.net"))?;
    manager.start()?;
    manager.add_bot(flaky("irc.flaky.example"))?;

    tokio::select! {
        res = tokio::signal::ctrl_c() => res?,
        _ = tokio::time::sleep(Duration::from_secs(3)) => {},
    }

    for bot in manager.bots() {
        println!("still running: {}#{}", bot.name(), bot.id());
    }
    manager.stop_and_wait().await?;
    println!("fleet state: {}", manager.state());
    Ok(())
}
