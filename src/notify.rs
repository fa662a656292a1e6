//! Notification of newly found links.
//!
//! A [`Message`] is composed from the new links and handed to a [`Transport`].
//! Transports receive structured fields and never build shell command lines.

use crate::LinkSet;
use std::io::Write;
use std::process::{Command, Stdio};
use thiserror::Error;

/// Separator placed between links in the message body
const BODY_SEPARATOR: &str = " and ";

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("failed to run mail command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("mail command exited with status {code:?}")]
    Failed { code: Option<i32> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl Message {
    /// Compose the message for `links`, or `None` when there is nothing to report
    pub fn compose(links: &LinkSet, keywords: &[String], recipient: &str) -> Option<Self> {
        if links.is_empty() {
            return None;
        }
        let body = links
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(BODY_SEPARATOR);
        Some(Self {
            recipient: recipient.to_string(),
            subject: format!("Found new entries containing {}", keywords.join(", ")),
            body,
        })
    }
}

/// Something that can deliver a [`Message`]
pub trait Transport {
    fn send(&self, message: &Message) -> Result<(), NotifyError>;
}

/// Delivers through a local `mail`-compatible program.
///
/// Runs `<command> -s <subject> -- <recipient>` directly (no shell) and writes
/// the body to its stdin.
#[derive(Debug, Clone)]
pub struct MailCommand {
    command: String,
}

impl MailCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Transport for MailCommand {
    fn send(&self, message: &Message) -> Result<(), NotifyError> {
        let spawn_error = |source| NotifyError::Spawn {
            command: self.command.clone(),
            source,
        };

        let mut child = Command::new(&self.command)
            .arg("-s")
            .arg(&message.subject)
            .arg("--")
            .arg(&message.recipient)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            let written = stdin
                .write_all(message.body.as_bytes())
                .and_then(|_| stdin.write_all(b"\n"));
            match written {
                // The exit status decides if a mailer that quit early failed
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                    return Err(spawn_error(e));
                }
                _ => {}
            }
        }

        let status = child.wait().map_err(spawn_error)?;
        if status.success() {
            Ok(())
        } else {
            Err(NotifyError::Failed {
                code: status.code(),
            })
        }
    }
}

/// Prints the message to stdout instead of sending it
#[derive(Debug, Clone, Default)]
pub struct DryRun;

impl Transport for DryRun {
    fn send(&self, message: &Message) -> Result<(), NotifyError> {
        println!("To: {}", message.recipient);
        println!("Subject: {}", message.subject);
        println!();
        println!("{}", message.body);
        Ok(())
    }
}

/// What happened when notification was attempted
#[derive(Debug)]
pub enum Delivery {
    /// No new links, nothing was sent
    Skipped,
    Sent,
    Failed(NotifyError),
}

/// Compose and deliver a message for `links`. Empty sets are a no-op.
pub fn notify(
    transport: &dyn Transport,
    links: &LinkSet,
    keywords: &[String],
    recipient: &str,
) -> Delivery {
    let Some(message) = Message::compose(links, keywords, recipient) else {
        log::info!("no new links, nothing to send");
        return Delivery::Skipped;
    };

    match transport.send(&message) {
        Ok(()) => {
            log::info!("sent {} links to {}", links.len(), recipient);
            Delivery::Sent
        }
        Err(e) => {
            log::error!("notification to {} failed: {}", recipient, e);
            Delivery::Failed(e)
        }
    }
}
