use std::process::{Command, Stdio};

use chime_core::Notifier;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

// System sounds used for start/complete alerts.
const MACOS_ALARM_SOUND: &str = "/System/Library/Sounds/Ping.aiff";
const MACOS_SUCCESS_SOUND: &str = "/System/Library/Sounds/Tink.aiff";
const LINUX_COMPLETE_SOUND: &str = "/usr/share/sounds/freedesktop/stereo/complete.oga";

/// Desktop notification sink: native popups plus an optional sound, spawned
/// as detached child processes so the execution unit never waits on them.
pub struct DesktopNotifier {
    sound: bool,
}

impl DesktopNotifier {
    pub fn new(sound: bool) -> Self {
        Self { sound }
    }

    fn popup(&self, title: &str, message: &str) {
        if cfg!(target_os = "macos") {
            // osascript needs quotes escaped inside the AppleScript string.
            let safe_title = title.replace('"', "\\\"");
            let safe_message = message.replace('"', "\\\"");
            let script =
                format!("display notification \"{safe_message}\" with title \"{safe_title}\"");
            spawn_detached(Command::new("osascript").args(["-e", &script]));
        } else if cfg!(target_os = "linux") {
            spawn_detached(Command::new("notify-send").args([title, message]));
        }
    }

    fn play_sound(&self, sound_file_macos: &str) {
        if !self.sound {
            return;
        }
        if cfg!(target_os = "macos") {
            spawn_detached(Command::new("afplay").arg(sound_file_macos));
        } else if cfg!(target_os = "linux") {
            spawn_detached(Command::new("paplay").arg(LINUX_COMPLETE_SOUND));
        }
    }
}

/// Spawn without waiting; a missing binary or spawn failure is logged at
/// debug and otherwise ignored.
fn spawn_detached(command: &mut Command) {
    if let Err(e) = command.stdout(Stdio::null()).stderr(Stdio::null()).spawn() {
        debug!(error = %e, "desktop notification command failed to spawn");
    }
}

impl Notifier for DesktopNotifier {
    fn notify_start(&self, job_name: &str) {
        info!(job = %job_name, "job started");
        self.popup("Job Execution", &format!("Job '{job_name}' is now running"));
        self.play_sound(MACOS_ALARM_SOUND);
    }

    fn notify_complete(&self, job_name: &str, next_run: Option<DateTime<Utc>>) {
        let message = match next_run {
            Some(next) => {
                info!(job = %job_name, next_run = %next.to_rfc3339(), "job completed");
                format!("Job completed. Next run: {}", next.to_rfc3339())
            }
            None => {
                info!(job = %job_name, "job completed (no further runs)");
                "Job completed.".to_string()
            }
        };
        self.popup(&format!("{job_name} completed"), &message);
        self.play_sound(MACOS_SUCCESS_SOUND);
    }
}
