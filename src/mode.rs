//! Per-connection coding mode controller
//!
//! A two-state machine deciding whether a chat message is routed through
//! the line codec or forwarded as plain text. Each session owns its own
//! `CodingMode` value; routing is a pure step function that returns the
//! next mode instead of mutating shared state, so no session can toggle
//! another one's mode.

use crate::{hdb3, validate};

/// Chat token that switches coding mode on
pub const MODE_ON_TOKEN: &str = "hdb3";

/// Chat token that switches coding mode off
pub const MODE_OFF_TOKEN: &str = "hdb3off";

/// Coding mode of a single connection
///
/// Created `Off` at connection establishment; never shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodingMode {
    #[default]
    Off,
    On,
}

/// Which side of the link a session sits on
///
/// The originating side encodes before sending; the receiving side
/// decodes on receipt. Each direction has its own alphabet gate, since
/// coded text carries 'B'/'V' markers that plain binary input never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encode,
    Decode,
}

/// Outcome of routing one message through the mode controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routing {
    /// Activation token received; mode is now on (idempotent)
    Activated,
    /// Deactivation token received; mode is now off (idempotent)
    Deactivated,
    /// Message was coded/decoded while mode was on
    Transformed(String),
    /// Message failed the alphabet gate while mode was on: mode dropped
    /// to off and the untouched original must be forwarded after the peer
    /// is told about the forced deactivation
    Rejected(String),
    /// Mode is off and the message is not a token: forward as-is
    Passthrough(String),
}

impl CodingMode {
    pub fn is_on(self) -> bool {
        matches!(self, CodingMode::On)
    }

    /// Route one message, returning the next mode and what to do with it
    pub fn route(self, direction: Direction, text: &str) -> (CodingMode, Routing) {
        match text {
            MODE_ON_TOKEN => (CodingMode::On, Routing::Activated),
            MODE_OFF_TOKEN => (CodingMode::Off, Routing::Deactivated),
            _ if !self.is_on() => (CodingMode::Off, Routing::Passthrough(text.to_string())),
            _ => {
                let eligible = match direction {
                    Direction::Encode => validate::is_codeable(text),
                    Direction::Decode => validate::is_pulse_sequence(text),
                };
                if eligible {
                    let coded = match direction {
                        Direction::Encode => hdb3::encode(text),
                        Direction::Decode => hdb3::decode(text),
                    };
                    (CodingMode::On, Routing::Transformed(coded))
                } else {
                    (CodingMode::Off, Routing::Rejected(text.to_string()))
                }
            }
        }
    }
}
