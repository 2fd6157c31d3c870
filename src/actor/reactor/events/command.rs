//! Messages from the control socket.
//!
//! A message is a whitespace (or NUL) separated command line. The reply is
//! written to the message's response stream, which is closed when the
//! message is dropped, whatever the outcome.

use std::fmt;
use std::io::{self, BufWriter, Write};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::actor::reactor::Reactor;
use crate::common::config::FocusFollowsMouse;

pub struct ControlMessage {
    pub payload: String,
    pub response: Box<dyn Write + Send>,
}

impl ControlMessage {
    pub fn new(payload: impl Into<String>, response: impl Write + Send + 'static) -> Self {
        Self {
            payload: payload.into(),
            response: Box::new(response),
        }
    }
}

impl fmt::Debug for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlMessage").field("payload", &self.payload).finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTarget {
    Windows,
    Applications,
    Spaces,
    Displays,
    Focused,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    Query(QueryTarget),
    SetFocusFollowsMouse(FocusFollowsMouse),
    SetMouseFollowsFocus(bool),
    SetWindowOpacity(bool),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControlError {
    #[error("empty message")]
    Empty,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("unknown query `{0}`")]
    UnknownQuery(String),
    #[error("unknown setting `{0}`")]
    UnknownSetting(String),
    #[error("missing value for `{0}`")]
    MissingArgument(String),
    #[error("invalid value `{value}` for `{setting}`")]
    InvalidValue { setting: String, value: String },
    #[error("unexpected argument `{0}`")]
    TrailingArgument(String),
}

fn parse_switch(setting: &str, value: &str) -> Result<bool, ControlError> {
    match value {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(ControlError::InvalidValue {
            setting: setting.to_string(),
            value: value.to_string(),
        }),
    }
}

impl FromStr for ControlCommand {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split(|c: char| c.is_whitespace() || c == '\0').filter(|w| !w.is_empty());
        let command = match words.next().ok_or(ControlError::Empty)? {
            "query" => {
                let target =
                    words.next().ok_or_else(|| ControlError::MissingArgument("query".into()))?;
                ControlCommand::Query(match target {
                    "windows" => QueryTarget::Windows,
                    "applications" | "apps" => QueryTarget::Applications,
                    "spaces" => QueryTarget::Spaces,
                    "displays" => QueryTarget::Displays,
                    "focused" => QueryTarget::Focused,
                    other => return Err(ControlError::UnknownQuery(other.to_string())),
                })
            }
            "config" => {
                let setting =
                    words.next().ok_or_else(|| ControlError::MissingArgument("config".into()))?;
                let value =
                    words.next().ok_or_else(|| ControlError::MissingArgument(setting.to_string()))?;
                match setting {
                    "focus_follows_mouse" => ControlCommand::SetFocusFollowsMouse(
                        value.parse().map_err(|_| ControlError::InvalidValue {
                            setting: setting.to_string(),
                            value: value.to_string(),
                        })?,
                    ),
                    "mouse_follows_focus" => {
                        ControlCommand::SetMouseFollowsFocus(parse_switch(setting, value)?)
                    }
                    "window_opacity" => {
                        ControlCommand::SetWindowOpacity(parse_switch(setting, value)?)
                    }
                    other => return Err(ControlError::UnknownSetting(other.to_string())),
                }
            }
            other => return Err(ControlError::UnknownCommand(other.to_string())),
        };
        if let Some(extra) = words.next() {
            return Err(ControlError::TrailingArgument(extra.to_string()));
        }
        Ok(command)
    }
}

pub struct CommandEventHandler;

impl CommandEventHandler {
    pub fn handle_daemon_message(reactor: &mut Reactor, message: ControlMessage) {
        let ControlMessage { payload, response } = message;
        let mut out = BufWriter::new(response);
        let result = match payload.parse::<ControlCommand>() {
            Ok(command) => Self::execute(reactor, command, &mut out),
            Err(err) => {
                debug!(%err, payload = %payload.trim_end_matches('\0'), "rejected control message");
                writeln!(out, "error: {err}")
            }
        };
        if let Err(err) = result.and_then(|()| out.flush()) {
            debug!(%err, "failed to write control response");
        }
    }

    fn execute(
        reactor: &mut Reactor,
        command: ControlCommand,
        out: &mut impl Write,
    ) -> io::Result<()> {
        match command {
            ControlCommand::Query(target) => match target {
                QueryTarget::Windows => write_json(out, &reactor.query_windows()),
                QueryTarget::Applications => write_json(out, &reactor.query_applications()),
                QueryTarget::Spaces => write_json(out, &reactor.query_spaces()),
                QueryTarget::Displays => write_json(out, &reactor.query_displays()),
                QueryTarget::Focused => write_json(out, &reactor.query_focused_window()),
            },
            ControlCommand::SetFocusFollowsMouse(mode) => {
                info!(?mode, "focus follows mouse changed");
                reactor.config.settings.focus_follows_mouse = mode;
                Ok(())
            }
            ControlCommand::SetMouseFollowsFocus(enabled) => {
                info!(enabled, "mouse follows focus changed");
                reactor.config.settings.mouse_follows_focus = enabled;
                Ok(())
            }
            ControlCommand::SetWindowOpacity(enabled) => {
                info!(enabled, "window opacity changed");
                reactor.config.settings.window_opacity = enabled;
                Self::refresh_window_opacity(reactor);
                Ok(())
            }
        }
    }

    fn refresh_window_opacity(reactor: &mut Reactor) {
        let settings = &reactor.config.settings;
        let (active, normal) = if settings.window_opacity {
            (settings.active_window_opacity, settings.normal_window_opacity)
        } else {
            (1.0, 1.0)
        };
        let focused = reactor.focus_manager.focused_window;
        let mut windows: Vec<_> =
            reactor.registry.windows().filter(|w| w.is_valid()).map(|w| w.id).collect();
        windows.sort_unstable();
        for wid in windows {
            let opacity = if Some(wid) == focused { active } else { normal };
            reactor.host.set_window_opacity(wid, opacity);
        }
    }
}

fn write_json(out: &mut impl Write, value: &impl Serialize) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_queries_and_settings() {
        assert_eq!(
            "query windows".parse::<ControlCommand>(),
            Ok(ControlCommand::Query(QueryTarget::Windows))
        );
        assert_eq!(
            "query\0focused\0".parse::<ControlCommand>(),
            Ok(ControlCommand::Query(QueryTarget::Focused))
        );
        assert_eq!(
            "config focus_follows_mouse autoraise".parse::<ControlCommand>(),
            Ok(ControlCommand::SetFocusFollowsMouse(FocusFollowsMouse::Autoraise))
        );
        assert_eq!(
            "config mouse_follows_focus off".parse::<ControlCommand>(),
            Ok(ControlCommand::SetMouseFollowsFocus(false))
        );
    }

    #[test]
    fn rejects_malformed_messages() {
        assert_eq!("".parse::<ControlCommand>(), Err(ControlError::Empty));
        assert_eq!(
            "frobnicate".parse::<ControlCommand>(),
            Err(ControlError::UnknownCommand("frobnicate".into()))
        );
        assert_eq!(
            "query".parse::<ControlCommand>(),
            Err(ControlError::MissingArgument("query".into()))
        );
        assert_eq!(
            "config window_opacity maybe".parse::<ControlCommand>(),
            Err(ControlError::InvalidValue {
                setting: "window_opacity".into(),
                value: "maybe".into()
            })
        );
        assert_eq!(
            "query spaces now".parse::<ControlCommand>(),
            Err(ControlError::TrailingArgument("now".into()))
        );
    }
}
