//! Line commands from the host and the replies sent back.

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/// One host command, already framed into a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `GetState`: report the current position.
    GetState,
    /// `L<n>`: move to level `n` (clamped when applied).
    Level(i32),
    /// `M<n>`: `M1` mutes, any other number unmutes.
    Mute(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0:?}")]
    Unknown(String),
    #[error("invalid number in command {line:?}")]
    InvalidNumber { line: String },
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        line.parse()
    }
}

fn parse_number(rest: &str, line: &str) -> Result<i32, ParseError> {
    let n: i64 = rest.trim().parse().map_err(|_| ParseError::InvalidNumber {
        line: line.to_string(),
    })?;
    Ok(n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        if line.is_empty() {
            return Err(ParseError::Empty);
        }
        if line == "GetState" {
            return Ok(Command::GetState);
        }
        if let Some(rest) = line.strip_prefix('L') {
            return parse_number(rest, line).map(Command::Level);
        }
        if let Some(rest) = line.strip_prefix('M') {
            return parse_number(rest, line).map(|n| Command::Mute(n == 1));
        }
        Err(ParseError::Unknown(line.to_string()))
    }
}

/// Outgoing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Answer to `GetState`.
    Level(i32),
    /// Unsolicited position report (user moved the fader, or a clamped host value).
    Moved(i32),
    /// Committed click tally.
    Clicks(u32),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Level(v) => write!(f, "L{v}"),
            Reply::Moved(v) => write!(f, "LT{v}"),
            Reply::Clicks(n) => write!(f, "T{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("GetState", Command::GetState)]
    #[case("  GetState\r", Command::GetState)]
    #[case("L62", Command::Level(62))]
    #[case("L-5", Command::Level(-5))]
    #[case("L150", Command::Level(150))]
    #[case("L 7", Command::Level(7))]
    #[case("L99999999999", Command::Level(i32::MAX))]
    #[case("M1", Command::Mute(true))]
    #[case("M0", Command::Mute(false))]
    #[case("M7", Command::Mute(false))]
    fn parses_commands(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(Command::parse(line), Ok(expected));
    }

    #[rstest]
    #[case("", ParseError::Empty)]
    #[case("   ", ParseError::Empty)]
    #[case("Lxyz", ParseError::InvalidNumber { line: "Lxyz".into() })]
    #[case("L", ParseError::InvalidNumber { line: "L".into() })]
    #[case("M", ParseError::InvalidNumber { line: "M".into() })]
    #[case("getstate", ParseError::Unknown("getstate".into()))]
    #[case("X1", ParseError::Unknown("X1".into()))]
    fn rejects_malformed(#[case] line: &str, #[case] expected: ParseError) {
        assert_eq!(Command::parse(line), Err(expected));
    }

    #[test]
    fn replies_render_wire_format() {
        assert_eq!(Reply::Level(62).to_string(), "L62");
        assert_eq!(Reply::Moved(62).to_string(), "LT62");
        assert_eq!(Reply::Clicks(3).to_string(), "T3");
    }
}
