use std::sync::Arc;
use std::sync::atomic::{ AtomicBool, Ordering };

use async_std::channel::Receiver;
use async_trait::async_trait;

use crate::broadcast::Update;
use crate::director::Director;

/// Anything that folds the update stream of one session into its own state.
#[async_trait]
pub trait StateTracker: Send {
    async fn process(&mut self, update: &Update);
}

#[async_trait]
impl StateTracker for Director {
    async fn process(&mut self, update: &Update) {
        self.handle(update);
    }
}

/// Consumes the updates of one telemetry source strictly one after another.
/// Sessions share nothing, so any number of them can run as separate tasks.
pub struct Session<T: StateTracker> {
    name: String,
    tracker: T,
    receiver: Receiver<Update>,
    shutdown: Arc<AtomicBool>,
}

#[derive(Clone)]
pub struct SessionHandle {
    receiver: Receiver<Update>,
    shutdown: Arc<AtomicBool>,
}

impl SessionHandle {
    /// Stops the session before its next update. Producers see a closed channel.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.receiver.close();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

impl<T: StateTracker> Session<T> {
    pub fn new(name: &str, tracker: T, receiver: Receiver<Update>) -> (Session<T>, SessionHandle) {
        let shutdown = Arc::new(AtomicBool::new(false));
        let handle = SessionHandle {
            receiver: receiver.clone(),
            shutdown: shutdown.clone(),
        };

        (
            Session {
                name: name.to_string(),
                tracker,
                receiver,
                shutdown,
            },
            handle,
        )
    }

    /// Runs until every producer is gone or the session is shut down, then
    /// hands the tracker back.
    pub async fn run(mut self) -> T {
        info!["Session {} started", self.name];

        let mut processed: u64 = 0;
        while let Ok(update) = self.receiver.recv().await {
            if self.shutdown.load(Ordering::SeqCst) {
                debug!["Session {} is shutting down, discarding {:?}", self.name, update];
                break;
            }
            self.tracker.process(&update).await;
            processed += 1;
        }

        info!["Session {} ended after {} updates", self.name, processed];
        self.tracker
    }
}
