use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::warn;

use crate::Result;
use crate::client::ChatClient;
use crate::managers::{ConsoleStateManager, FileStateManager};

/// The two local views of the chat.
pub struct ChatView {
    pub console: ConsoleStateManager,
    pub file: FileStateManager,
}

/// Keeps the local views in step with the server.
///
/// A refresh fetches messages, then actions, under one lock, so a timer tick
/// and a refresh triggered by a user command never interleave.
#[derive(Clone)]
pub struct Poller {
    client: ChatClient,
    view: Arc<Mutex<ChatView>>,
}

impl Poller {
    pub fn new(client: ChatClient, view: ChatView) -> Self {
        Self {
            client,
            view: Arc::new(Mutex::new(view)),
        }
    }

    /// Pull both documents and return the console lines for new actions.
    pub async fn refresh(&self) -> Result<Vec<String>> {
        let view = self.view.lock().await;
        let messages = self.client.fetch_messages().await?;
        view.file.update(messages)?;
        let actions = self.client.fetch_actions().await?;
        view.console.update(actions)
    }

    pub async fn last_actions(&self, n: usize) -> Result<Vec<String>> {
        self.view.lock().await.console.load_last(n)
    }

    /// Refresh every `interval`, handing new lines to `output`. A failed cycle
    /// is logged and the loop carries on.
    pub async fn run<F>(self, interval: Duration, mut output: F)
    where
        F: FnMut(String) + Send,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.refresh().await {
                Ok(lines) => lines.into_iter().for_each(&mut output),
                Err(e) => warn!("Chat update failed: {}", e),
            }
        }
    }
}
