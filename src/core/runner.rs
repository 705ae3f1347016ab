//! # Launch a bot and run its completion hook.
//!
//! Executes one bot's run loop on the pool and reports how it ended.
//!
//! - **Launch** under the registry lock: assign id, spawn the task, insert the entry
//! - **Run** the bot inside a `bot` tracing span, isolating panics
//! - **Complete** exactly once: log, remove from the registry, publish, check for termination
//!
//! ## Event flow
//! ```text
//! launch():
//!   [registry lock] spawn task → insert → publish BotLaunched [unlock]
//!
//! task:
//!   gate.enter() ─ None (pool closed first) ─────────────┐
//!        └─ Some(slot) → [registry lock] admit ─ refused ┤
//!                        └─ bot.run(id) ─ Ok  ───────────┤→ complete()
//!                                       ─ Err / panic ───┘
//!
//! complete():
//!   log outcome → publish BotFinished | BotFailed
//!              → [registry lock] remove [unlock] → publish BotRemoved
//!              → if registry empty: Shared::try_terminate()
//! ```
//!
//! ## Rules
//! - A bot failure is logged and published, never propagated.
//! - `complete` takes the registry lock, which `launch` holds until the entry
//!   exists, so removal can never precede insertion.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::Instrument;

use crate::bots::{BotHandle, BotRef};
use crate::core::manager::Shared;
use crate::core::pool::{BotPool, Gate};
use crate::error::{BotError, ManagerError};
use crate::events::{Event, EventKind};
use crate::subscribers::panic_message;

/// How a bot task ended.
#[derive(Debug)]
pub(crate) enum Outcome {
    /// `run` returned `Ok(())`.
    Finished,
    /// The pool closed before the bot was admitted; `run` was never called.
    NotStarted,
    /// `run` returned an error or panicked.
    Failed(BotError),
}

/// Assigns an id to `bot`, submits it to the pool and records it in the registry.
pub(crate) fn launch(
    shared: &Arc<Shared>,
    pool: &BotPool,
    bot: BotRef,
) -> Result<BotHandle, ManagerError> {
    shared.registry.launch_with(bot, |handle| {
        let task = run_bot(Arc::clone(shared), pool.gate(), handle.clone());
        let join = pool.spawn(task)?;
        tracing::debug!(bot = %handle.id(), name = handle.name(), "bot launched");
        shared
            .bus
            .publish(Event::new(EventKind::BotLaunched).with_bot(handle.id(), handle.name()));
        Ok(join)
    })
}

/// Body of one bot task.
async fn run_bot(shared: Arc<Shared>, gate: Gate, handle: BotHandle) {
    let outcome = match gate.enter().await {
        None => Outcome::NotStarted,
        Some(slot) if !shared.registry.admit(handle.id(), slot.closed()) => Outcome::NotStarted,
        Some(_slot) => {
            let span = tracing::info_span!(
                "bot",
                pool = shared.number,
                id = %handle.id(),
                name = handle.name()
            );
            run_once(&handle).instrument(span).await
        }
    };
    complete(&shared, &handle, outcome);
}

/// Runs the bot's connection loop once, converting panics into [`BotError::Panicked`].
async fn run_once(handle: &BotHandle) -> Outcome {
    let fut = handle.bot().run(handle.id());
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(())) => Outcome::Finished,
        Ok(Err(e)) => Outcome::Failed(e),
        Err(panic) => Outcome::Failed(BotError::Panicked {
            info: panic_message(&*panic),
        }),
    }
}

/// Completion hook: runs exactly once per launched bot.
pub(crate) fn complete(shared: &Shared, handle: &BotHandle, outcome: Outcome) {
    let id = handle.id();
    let name = handle.name();

    match &outcome {
        Outcome::Finished => tracing::debug!(bot = %id, name, "bot finished"),
        Outcome::NotStarted => {
            tracing::debug!(bot = %id, name, "pool closed before bot started; not running it")
        }
        Outcome::Failed(e) => {
            tracing::error!(bot = %id, name, error = %e, kind = e.as_label(), "bot exited with error")
        }
    }

    let ev = match outcome {
        Outcome::Failed(e) => Event::new(EventKind::BotFailed).with_reason(e.to_string()),
        Outcome::Finished | Outcome::NotStarted => Event::new(EventKind::BotFinished),
    };
    shared.bus.publish(ev.with_bot(id, name));

    match shared.registry.remove(id) {
        Some(left) => {
            shared
                .bus
                .publish(Event::new(EventKind::BotRemoved).with_bot(id, name));
            if left == 0 {
                shared.try_terminate();
            }
        }
        None => tracing::warn!(bot = %id, name, "completed bot was not registered"),
    }
}
