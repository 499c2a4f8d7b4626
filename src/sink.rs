use async_std::channel;
use async_std::channel::{ Receiver, Sender, TrySendError };

/// Commands for the camera control side of the broadcast connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusCommand {
    SetFocus(u16),
    SetCamera { camera_set: String, camera: String },
    RequestHudPage(String),
}

/// Receives the director's commands. Implementations must never block the
/// caller; a tick has to finish regardless of how fast commands are delivered.
pub trait CommandSink: Send {
    fn send(&mut self, command: FocusCommand);
}

/// Bounded queue in front of a command consumer. When the consumer falls
/// behind, the oldest queued command is dropped to make room for the new one.
pub struct ChannelSink {
    sender: Sender<FocusCommand>,
    overflow: Receiver<FocusCommand>,
    dropped: u64,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (ChannelSink, Receiver<FocusCommand>) {
        let (sender, receiver) = channel::bounded(capacity.max(1));
        (
            ChannelSink {
                sender,
                overflow: receiver.clone(),
                dropped: 0,
            },
            receiver,
        )
    }

    /// Number of commands evicted because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl CommandSink for ChannelSink {
    fn send(&mut self, command: FocusCommand) {
        let mut command = command;
        loop {
            match self.sender.try_send(command) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    if let Ok(oldest) = self.overflow.try_recv() {
                        self.dropped += 1;
                        warn!("Command queue full, dropping {:?}", oldest);
                    }
                    command = rejected;
                },
                Err(TrySendError::Closed(rejected)) => {
                    debug!("Command consumer is gone, discarding {:?}", rejected);
                    return;
                },
            }
        }
    }
}

/// Forwards every command to all registered sinks, one per connected client.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn CommandSink>>,
}

impl FanoutSink {
    pub fn new() -> FanoutSink {
        FanoutSink { sinks: vec![] }
    }

    pub fn register(&mut self, sink: Box<dyn CommandSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl CommandSink for FanoutSink {
    fn send(&mut self, command: FocusCommand) {
        for sink in &mut self.sinks {
            sink.send(command.clone());
        }
    }
}
