use {
    crate::{
        aggregator::{KeyIndex, Removal, Summary},
        store::StoreError,
    },
    chrono::{DateTime, Local},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

/// One-line message shown in the status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    fn new(level: StatusLevel, text: String) -> Self {
        Self { level, text }
    }
}

/// What the dashboard shows between poll cycles
///
/// Keeps the last good summary when a poll fails so the table does not
/// blank out on a transient store error.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub summary: Summary,
    /// Index from the most recent successful poll, used for removals
    pub key_index: KeyIndex,
    pub last_refresh: Option<DateTime<Local>>,
    pub poll_error: Option<String>,
    pub status: Option<StatusMessage>,
    pub polls: u64,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of one fetch-and-summarize cycle
    pub fn apply_poll(&mut self, result: Result<(Summary, KeyIndex), StoreError>) {
        self.polls += 1;
        match result {
            Ok((summary, key_index)) => {
                self.summary = summary;
                self.key_index = key_index;
                self.last_refresh = Some(Local::now());
                self.poll_error = None;
            }
            Err(e) => {
                log::warn!("Poll failed: {}", e);
                self.poll_error = Some(e.to_string());
            }
        }
    }

    /// Record the outcome of a removal request for `item_name`
    pub fn apply_removal(&mut self, item_name: &str, result: Result<Removal, StoreError>) {
        let status = match result {
            Ok(Removal::Removed { .. }) => {
                StatusMessage::new(StatusLevel::Success, format!("Removed one {}", item_name))
            }
            Ok(Removal::NothingToRemove) => {
                StatusMessage::new(StatusLevel::Info, format!("No {} to remove", item_name))
            }
            Err(e) => {
                log::error!("Failed to remove {}: {}", item_name, e);
                StatusMessage::new(
                    StatusLevel::Error,
                    format!("Could not remove {}: {}", item_name, e),
                )
            }
        };
        self.status = Some(status);
    }
}
