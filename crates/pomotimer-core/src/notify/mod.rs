//! Completion side effects: the audio chime and the system notification.
//!
//! Both capabilities are optional. A backend that fails or is missing
//! costs the user a sound or a popup, never the countdown, so
//! [`NotificationEmitter`] logs failures and carries on.

mod chime;
mod messages;

pub use chime::{
    encode_wav, Chime, ChimeNote, Envelope, CHIME_FREQUENCIES_HZ, MAX_SAMPLE_RATE,
};
pub use messages::{Locale, Messages};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::NotifyError;
use crate::storage::Config;
use crate::timer::Mode;

/// Whether the user allows system notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Not asked yet.
    #[default]
    Default,
    Granted,
    Denied,
}

pub trait AudioSink {
    fn play(&mut self, chime: &Chime) -> Result<(), NotifyError>;
}

pub trait SystemNotifier {
    fn permission(&self) -> Permission;

    /// Ask the user for permission. The answer arrives later through
    /// [`SystemNotifier::permission`]; this must not block.
    fn request_permission(&mut self);

    fn show(&mut self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Audio sink for hosts without sound.
#[derive(Debug, Default)]
pub struct NoAudio;

impl AudioSink for NoAudio {
    fn play(&mut self, _chime: &Chime) -> Result<(), NotifyError> {
        Err(NotifyError::AudioUnavailable("no audio backend".into()))
    }
}

/// Notifier for hosts without system notifications.
#[derive(Debug, Default)]
pub struct NoNotifier;

impl SystemNotifier for NoNotifier {
    fn permission(&self) -> Permission {
        Permission::Denied
    }

    fn request_permission(&mut self) {}

    fn show(&mut self, _title: &str, _body: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Unsupported)
    }
}

/// What happened when a completion notification was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Shown,
    PermissionRequested,
    Suppressed,
    Failed,
}

pub struct NotificationEmitter {
    audio: Box<dyn AudioSink>,
    system: Box<dyn SystemNotifier>,
    chime: Chime,
    messages: Messages,
    sound_enabled: bool,
    notifications_enabled: bool,
}

impl NotificationEmitter {
    pub fn new(audio: Box<dyn AudioSink>, system: Box<dyn SystemNotifier>) -> Self {
        Self {
            audio,
            system,
            chime: Chime::default(),
            messages: Messages::for_locale(Locale::default()),
            sound_enabled: true,
            notifications_enabled: true,
        }
    }

    /// Apply the sound, notification and locale preferences.
    pub fn configured(mut self, config: &Config) -> Self {
        self.sound_enabled = config.notifications.sound;
        self.notifications_enabled = config.notifications.enabled;
        self.messages = Messages::for_locale(config.ui.locale);
        self
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Play the completion chime. Returns whether it was played.
    pub fn play_chime(&mut self) -> bool {
        if !self.sound_enabled {
            return false;
        }
        match self.audio.play(&self.chime) {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "chime not played");
                false
            }
        }
    }

    /// Tell the user that a `finished` session ended.
    pub fn notify_completion(&mut self, finished: Mode) -> NotifyOutcome {
        if !self.notifications_enabled {
            return NotifyOutcome::Suppressed;
        }
        match self.system.permission() {
            Permission::Granted => {
                let body = self.messages.body_for(finished);
                match self.system.show(self.messages.title, body) {
                    Ok(()) => NotifyOutcome::Shown,
                    Err(e) => {
                        debug!(error = %e, "notification not shown");
                        NotifyOutcome::Failed
                    }
                }
            }
            Permission::Default => {
                self.system.request_permission();
                NotifyOutcome::PermissionRequested
            }
            Permission::Denied => NotifyOutcome::Suppressed,
        }
    }

    /// Ask for permission if the user has not answered yet.
    pub fn request_permission_if_undetermined(&mut self) -> bool {
        if self.notifications_enabled && self.system.permission() == Permission::Default {
            self.system.request_permission();
            return true;
        }
        false
    }
}
