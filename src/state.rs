use crate::assistant::Assistant;
use crate::models::{AppData, ChatMessage};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    /// Lives only as long as the process, like the browser chat panel.
    pub transcript: Arc<Mutex<Vec<ChatMessage>>>,
    pub assistant: Option<Arc<Assistant>>,
    pub reply_delay: Duration,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            transcript: Arc::new(Mutex::new(Vec::new())),
            assistant: None,
            reply_delay: Duration::ZERO,
        }
    }

    pub fn with_assistant(mut self, assistant: Assistant) -> Self {
        self.assistant = Some(Arc::new(assistant));
        self
    }

    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }
}
