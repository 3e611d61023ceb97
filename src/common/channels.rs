//! Channel type definitions for runner control

use tokio::sync::mpsc;

use crate::engine::runner::BotCommand;

/// Default channel buffer size
pub const DEFAULT_CHANNEL_SIZE: usize = 16;

/// Create a new bot command channel with the default buffer size
pub fn create_command_channel() -> (mpsc::Sender<BotCommand>, mpsc::Receiver<BotCommand>) {
    mpsc::channel(DEFAULT_CHANNEL_SIZE)
}

/// Create a new bot command channel with a custom buffer size
pub fn create_command_channel_with_size(
    size: usize,
) -> (mpsc::Sender<BotCommand>, mpsc::Receiver<BotCommand>) {
    mpsc::channel(size)
}
