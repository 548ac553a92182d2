use std::io::{self, Write};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::config::NotifyConfig;
use crate::types::ResourceIdentity;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Could not run notifier {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("Notifier {program} exited with {status}")]
    Exit { program: String, status: String },
    #[error("Could not write notification: {0}")]
    Io(#[from] io::Error),
    #[error("Notification rejected: {0}")]
    Rejected(String),
}

/// Delivers a detected change. Formatting and transport are its own concern.
pub trait Notifier {
    fn notify(&self, identity: &ResourceIdentity, diff: &str) -> Result<(), NotifyError>;
}

/// A composed change message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn compose(identity: &ResourceIdentity, diff: &str) -> Self {
        Self {
            subject: format!("URL Updated : {}", identity.label()),
            body: format!("Regarding URL {}\n\nDIFF\n\n{}\n", identity.locator(), diff),
        }
    }

    /// RFC 5322 style rendering, suitable for `sendmail -t`.
    pub fn render(&self, from: Option<&str>, to: Option<&str>) -> String {
        let mut out = String::new();
        if let Some(from) = from {
            out.push_str(&format!("From: {from}\n"));
        }
        if let Some(to) = to {
            out.push_str(&format!("To: {to}\n"));
        }
        out.push_str(&format!("Subject: {}\n", self.subject));
        out.push_str("Content-Type: text/plain; charset=utf-8\n\n");
        out.push_str(&self.body);
        out
    }
}

/// Prints the composed message to standard output.
#[derive(Debug, Default)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, identity: &ResourceIdentity, diff: &str) -> Result<(), NotifyError> {
        let message = Notification::compose(identity, diff).render(None, None);
        let mut stdout = io::stdout().lock();
        stdout.write_all(message.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

/// Pipes the composed message into an external program's stdin.
/// A non-zero exit is a delivery failure.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: String,
    args: Vec<String>,
    from: Option<String>,
    to: Option<String>,
}

impl CommandNotifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            from: None,
            to: None,
        }
    }

    pub fn with_addresses(mut self, from: Option<String>, to: Option<String>) -> Self {
        self.from = from;
        self.to = to;
        self
    }
}

impl Notifier for CommandNotifier {
    fn notify(&self, identity: &ResourceIdentity, diff: &str) -> Result<(), NotifyError> {
        let message = Notification::compose(identity, diff)
            .render(self.from.as_deref(), self.to.as_deref());

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|source| NotifyError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A program that exits without reading stdin reports through its status.
            if let Err(e) = stdin.write_all(message.as_bytes()) {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(NotifyError::Exit {
                program: self.program.clone(),
                status: status.to_string(),
            });
        }

        tracing::info!(program = %self.program, "notification delivered");
        Ok(())
    }
}

/// Build the notifier selected by configuration.
pub fn from_config(config: &NotifyConfig) -> Box<dyn Notifier> {
    match config {
        NotifyConfig::Stdout => Box::new(StdoutNotifier),
        NotifyConfig::Command {
            program,
            args,
            from,
            to,
        } => Box::new(
            CommandNotifier::new(program.clone(), args.clone())
                .with_addresses(from.clone(), to.clone()),
        ),
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, identity: &ResourceIdentity, diff: &str) -> Result<(), NotifyError> {
        (**self).notify(identity, diff)
    }
}
