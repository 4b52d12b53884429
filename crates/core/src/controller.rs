//! Form state and the transitions that are allowed to change it.
//!
//! Requests run in two halves: a `begin_*` call validates, flips the in-flight
//! flag and hands out a [`RequestTicket`]; the matching `finish_*` call applies
//! the backend result. `reset` bumps the epoch, so a ticket issued before it is
//! stale and its result is dropped.

use std::fmt::Display;

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{
    api::VideoBackend,
    error::{Result, Wiki2VidError},
    validate::is_valid_url,
};

pub const MSG_INVALID_URL: &str = "Please enter a valid Wikipedia URL";
pub const MSG_GENERATED: &str = "Video generated successfully";
pub const MSG_GENERATE_FAILED: &str = "Error generating video";
pub const MSG_NO_VIDEO: &str = "No video URL available for checking status";
pub const MSG_STATUS_FAILED: &str = "Error checking video status";
pub const MSG_GENERATE_BUSY: &str = "A video is already being generated";
pub const MSG_STATUS_BUSY: &str = "Status check already in progress";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub input_url: String,
    pub video_url: Option<String>,
    pub is_generating: bool,
    pub is_checking_status: bool,
    pub status_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A user-facing notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Handle for one issued request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    pub id: Uuid,
    pub epoch: u64,
    /// Article URL for generation, video location for status checks
    pub target: String,
}

/// What happened to a finished request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

pub fn format_status(status: &str) -> String {
    format!("Status: {}", status)
}

#[derive(Debug, Default)]
pub struct FormController {
    state: FormState,
    epoch: u64,
    notices: Vec<Notice>,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.state.input_url = text.into();
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn begin_generate(&mut self) -> Result<RequestTicket> {
        let url = self.state.input_url.clone();
        if !is_valid_url(&url) {
            self.notify(Notice::error(MSG_INVALID_URL));
            return Err(Wiki2VidError::InvalidUrl { url });
        }
        if self.state.is_generating {
            self.notify(Notice::info(MSG_GENERATE_BUSY));
            return Err(Wiki2VidError::AlreadyInFlight {
                operation: "generate",
            });
        }

        self.state.is_generating = true;
        let ticket = self.issue(url);
        info!(request_id = %ticket.id, url = %ticket.target, "generation requested");
        Ok(ticket)
    }

    pub fn finish_generate<E: Display>(
        &mut self,
        ticket: &RequestTicket,
        result: std::result::Result<String, E>,
    ) -> Completion {
        if self.is_stale(ticket) {
            return Completion::Stale;
        }

        self.state.is_generating = false;
        match result {
            Ok(video_url) => {
                info!(request_id = %ticket.id, %video_url, "video generated");
                self.state.video_url = Some(video_url);
                self.notify(Notice::success(MSG_GENERATED));
            }
            Err(e) => {
                error!(request_id = %ticket.id, error = %e, "video generation failed");
                self.notify(Notice::error(MSG_GENERATE_FAILED));
            }
        }
        Completion::Applied
    }

    pub fn begin_status_check(&mut self) -> Result<RequestTicket> {
        let Some(video_url) = self.state.video_url.clone() else {
            self.notify(Notice::error(MSG_NO_VIDEO));
            return Err(Wiki2VidError::NoVideo);
        };
        if self.state.is_checking_status {
            self.notify(Notice::info(MSG_STATUS_BUSY));
            return Err(Wiki2VidError::AlreadyInFlight {
                operation: "status",
            });
        }

        self.state.is_checking_status = true;
        let ticket = self.issue(video_url);
        debug!(request_id = %ticket.id, video = %ticket.target, "status check requested");
        Ok(ticket)
    }

    pub fn finish_status_check<E: Display>(
        &mut self,
        ticket: &RequestTicket,
        result: std::result::Result<String, E>,
    ) -> Completion {
        if self.is_stale(ticket) {
            return Completion::Stale;
        }

        self.state.is_checking_status = false;
        match result {
            Ok(status) => {
                debug!(request_id = %ticket.id, %status, "status received");
                self.state.status_text = Some(format_status(&status));
            }
            Err(e) => {
                error!(request_id = %ticket.id, error = %e, "status check failed");
                self.notify(Notice::error(MSG_STATUS_FAILED));
            }
        }
        Completion::Applied
    }

    /// Back to the initial state. Requests still in flight become stale.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.state = FormState::default();
        debug!(epoch = self.epoch, "form reset");
    }

    /// Validate, call the backend and apply the result in one go
    pub async fn generate<B>(&mut self, backend: &B) -> Result<Completion>
    where
        B: VideoBackend + ?Sized,
    {
        let ticket = self.begin_generate()?;
        let result = backend.create_video(&ticket.target).await;
        Ok(self.finish_generate(&ticket, result))
    }

    pub async fn check_status<B>(&mut self, backend: &B) -> Result<Completion>
    where
        B: VideoBackend + ?Sized,
    {
        let ticket = self.begin_status_check()?;
        let result = backend.video_status(&ticket.target).await;
        Ok(self.finish_status_check(&ticket, result))
    }

    fn issue(&self, target: String) -> RequestTicket {
        RequestTicket {
            id: Uuid::new_v4(),
            epoch: self.epoch,
            target,
        }
    }

    fn is_stale(&self, ticket: &RequestTicket) -> bool {
        if ticket.epoch == self.epoch {
            return false;
        }
        debug!(
            request_id = %ticket.id,
            ticket_epoch = ticket.epoch,
            epoch = self.epoch,
            "dropping stale response"
        );
        true
    }
}
