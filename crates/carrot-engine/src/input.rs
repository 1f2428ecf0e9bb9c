//! Stdin command reader.
//!
//! Each line is either a learner command (`start`, `pause`, `resume`,
//! `press`, `light on`, `light off`, `reset`, `save`, `quit`) or a JSON host message
//! such as `{"messageType":"studentWork", ...}`. End of input shuts the
//! session down.
//!
//! Lines are read on a detached OS thread. A blocked stdin read must never
//! hold up runtime shutdown, so the thread is not joined.

use std::io::BufRead;
use std::thread;

use carrot_core::{LearnerAction, SessionCommand};
use carrot_types::InboundMessage;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{EngineError, InputError};

/// Parse one input line. Blank lines and `#` comments yield `None`.
///
/// # Errors
///
/// Returns [`InputError`] if the line is neither a command nor a valid
/// host message.
pub fn parse_line(line: &str) -> Result<Option<SessionCommand>, InputError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    if line.starts_with('{') {
        let message: InboundMessage = serde_json::from_str(line)?;
        return Ok(Some(SessionCommand::Host(message)));
    }

    let words: Vec<String> = line
        .split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect();
    let words: Vec<&str> = words.iter().map(String::as_str).collect();
    let command = match words.as_slice() {
        ["start"] => SessionCommand::Learner(LearnerAction::Start),
        ["pause"] => SessionCommand::Learner(LearnerAction::Pause),
        ["resume"] => SessionCommand::Learner(LearnerAction::Resume),
        ["press" | "toggle"] => SessionCommand::Learner(LearnerAction::PressStart),
        ["light", "on"] | ["on"] => SessionCommand::Learner(LearnerAction::TurnLightOn),
        ["light", "off"] | ["off"] => SessionCommand::Learner(LearnerAction::TurnLightOff),
        ["reset"] => SessionCommand::Learner(LearnerAction::Reset),
        ["save"] => SessionCommand::Learner(LearnerAction::Save),
        ["quit" | "exit"] => SessionCommand::Shutdown,
        _ => {
            return Err(InputError::UnknownCommand {
                line: line.to_owned(),
            });
        }
    };
    Ok(Some(command))
}

/// Forward input lines to the session until end of input or `quit`.
///
/// # Errors
///
/// Returns [`EngineError::Io`] if the input cannot be read.
pub fn read_commands<R: BufRead>(
    input: R,
    commands: &mpsc::UnboundedSender<SessionCommand>,
) -> Result<(), EngineError> {
    for line in input.lines() {
        match parse_line(&line?) {
            Ok(Some(command)) => {
                let shutdown = command == SessionCommand::Shutdown;
                if commands.send(command).is_err() {
                    debug!("session loop gone, stopping input");
                    return Ok(());
                }
                if shutdown {
                    return Ok(());
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "ignoring input line"),
        }
    }
    debug!("end of input");
    let _ = commands.send(SessionCommand::Shutdown);
    Ok(())
}

/// Run [`read_commands`] on its own thread.
///
/// The handle may be dropped; the thread ends at end of input or on the
/// first send after the session loop is gone.
pub fn spawn_reader<R>(
    input: R,
    commands: mpsc::UnboundedSender<SessionCommand>,
) -> thread::JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        if let Err(e) = read_commands(input, &commands) {
            warn!(error = %e, "stdin reader failed");
            let _ = commands.send(SessionCommand::Shutdown);
        }
    })
}
