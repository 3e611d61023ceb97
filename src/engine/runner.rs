//! Run loop finite-state machine
//!
//! One explicit machine with states Running, Paused, Stopped. Commands
//! arrive on an mpsc channel; transitions not listed in [`RunState::apply`]
//! are no-ops. On stop the runner closes every open position before it
//! returns, so the bot never exits levered.

use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::chain::{ChainExecutor, ChainQuery};
use crate::common::errors::Result;
use crate::engine::Engine;

/// External control commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Pause,
    Resume,
    Stop,
}

/// Run loop states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    Stopped,
}

impl RunState {
    /// The transition table. Stop always stops; Pause only pauses a
    /// running bot; Resume only resumes a paused one. Everything else
    /// leaves the state unchanged.
    pub fn apply(self, command: BotCommand) -> RunState {
        match (self, command) {
            (_, BotCommand::Stop) => RunState::Stopped,
            (RunState::Running, BotCommand::Pause) => RunState::Paused,
            (RunState::Paused, BotCommand::Resume) => RunState::Running,
            (state, _) => state,
        }
    }
}

/// Drives the engine on a fixed interval while honoring control commands
pub struct Runner<C>
where
    C: ChainQuery + ChainExecutor,
{
    engine: Engine<C>,
    commands: mpsc::Receiver<BotCommand>,
    interval: Duration,
    state: RunState,
}

impl<C> Runner<C>
where
    C: ChainQuery + ChainExecutor,
{
    pub fn new(engine: Engine<C>, commands: mpsc::Receiver<BotCommand>, interval: Duration) -> Self {
        Self {
            engine,
            commands,
            interval,
            state: RunState::Running,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, command: BotCommand) {
        let next = self.state.apply(command);
        if next != self.state {
            info!(from = ?self.state, to = ?next, ?command, "run state transition");
            self.state = next;
        }
        if next == RunState::Stopped {
            // Stop any in-progress cycle from starting further pairs.
            self.engine.cancel_handle().store(true, Ordering::Relaxed);
        }
    }

    /// Run until stopped. Returns the engine so callers can inspect the
    /// final ledger.
    pub async fn run(mut self) -> Result<Engine<C>> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            // Apply any queued commands before deciding what to do next.
            while let Ok(command) = self.commands.try_recv() {
                self.transition(command);
            }

            match self.state {
                RunState::Stopped => break,
                RunState::Paused => match self.commands.recv().await {
                    Some(command) => self.transition(command),
                    // All controllers gone; treat as stop.
                    None => self.transition(BotCommand::Stop),
                },
                RunState::Running => {
                    tokio::select! {
                        _ = ticker.tick() => {
                            if let Err(err) = self.engine.run_cycle().await {
                                warn!(%err, "cycle failed");
                                return Err(err);
                            }
                        }
                        command = self.commands.recv() => match command {
                            Some(command) => self.transition(command),
                            None => self.transition(BotCommand::Stop),
                        },
                    }
                }
            }
        }

        info!("stopping: closing all open positions");
        self.engine.close_all_positions().await?;
        Ok(self.engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use BotCommand::*;
        use RunState::*;

        assert_eq!(Running.apply(Pause), Paused);
        assert_eq!(Paused.apply(Resume), Running);
        assert_eq!(Running.apply(Stop), Stopped);
        assert_eq!(Paused.apply(Stop), Stopped);
        assert_eq!(Stopped.apply(Stop), Stopped);

        // No-op transitions
        assert_eq!(Running.apply(Resume), Running);
        assert_eq!(Paused.apply(Pause), Paused);
        assert_eq!(Stopped.apply(Pause), Stopped);
        assert_eq!(Stopped.apply(Resume), Stopped);
    }
}
