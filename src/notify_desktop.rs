// src/notify_desktop.rs

//! Desktop notifications for build and start failures.

use std::fmt;
use std::process::{Command, Stdio};

use tracing::debug;

pub const APP_NAME: &str = "hotrun";

/// Reports a failure to the developer outside the terminal.
pub trait Notifier: Send + Sync + fmt::Debug {
    fn notify(&self, text: &str, title: &str);
}

/// Shells out to the platform's notification tool.
///
/// Best-effort: a missing tool or a failed spawn is logged at debug.
#[derive(Debug, Clone, Copy)]
pub struct DesktopNotifier {
    enabled: bool,
}

impl DesktopNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, text: &str, title: &str) {
        if !self.enabled {
            return;
        }
        let Some(mut cmd) = notification_command(text, title) else {
            debug!("desktop notifications unsupported on this platform");
            return;
        };
        cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());

        // Reap on a plain thread; callers may or may not be inside a runtime.
        std::thread::spawn(move || match cmd.status() {
            Ok(status) if !status.success() => debug!(%status, "notification tool failed"),
            Ok(_) => {}
            Err(err) => debug!(error = %err, "could not run notification tool"),
        });
    }
}

#[cfg(target_os = "linux")]
fn notification_command(text: &str, title: &str) -> Option<Command> {
    let mut cmd = Command::new("notify-send");
    cmd.args(["-a", APP_NAME, title, text]);
    Some(cmd)
}

#[cfg(target_os = "macos")]
fn notification_command(text: &str, title: &str) -> Option<Command> {
    let script = format!(
        "display notification {:?} with title {:?} subtitle {:?}",
        text, APP_NAME, title
    );
    let mut cmd = Command::new("osascript");
    cmd.args(["-e", &script]);
    Some(cmd)
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn notification_command(_text: &str, _title: &str) -> Option<Command> {
    None
}
