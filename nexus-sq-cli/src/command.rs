//! Parsing of single-line interpreter commands.

use thiserror::Error;

/// One interpreter command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `d`: print the line.
    Display,
    /// `l`: print the line length.
    Length,
    /// `g`: hand out a buzzer.
    Give,
    /// `s`: serve the front of the line.
    Seat,
    /// `k <id>`: remove a buzzer from the line.
    KickOut(i64),
    /// `b <id>`: move a buzzer to the front.
    Bribe(i64),
    /// `q`: leave the interpreter.
    Quit,
}

/// Why a line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The first character is not a command letter.
    #[error("unknown command '{0}'")]
    UnknownCommand(char),
    /// Wrong number of arguments for the command.
    #[error("'{command}' takes {expected} argument(s), got {found}")]
    Arity {
        command: char,
        expected: usize,
        found: usize,
    },
    /// The argument is not an integer.
    #[error("bad integer argument {0:?}")]
    BadArgument(String),
}

/// Parses one input line.
///
/// Blank lines parse to `None`. The command letter may be followed directly
/// by its argument (`k5` is `k 5`).
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    let mut chars = line.chars();
    let Some(letter) = chars.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = chars.as_str().split_whitespace().collect();

    let command = match (letter, args.as_slice()) {
        ('d', []) => Command::Display,
        ('l', []) => Command::Length,
        ('g', []) => Command::Give,
        ('s', []) => Command::Seat,
        ('q', []) => Command::Quit,
        ('k', [id]) => Command::KickOut(parse_int(id)?),
        ('b', [id]) => Command::Bribe(parse_int(id)?),
        ('d' | 'l' | 'g' | 's' | 'q', _) => {
            return Err(CommandError::Arity {
                command: letter,
                expected: 0,
                found: args.len(),
            });
        }
        ('k' | 'b', _) => {
            return Err(CommandError::Arity {
                command: letter,
                expected: 1,
                found: args.len(),
            });
        }
        _ => return Err(CommandError::UnknownCommand(letter)),
    };
    Ok(Some(command))
}

/// Parses an integer the way C's `%i` does: optional sign, then `0x` for
/// hex, a leading `0` for octal, decimal otherwise.
fn parse_int(text: &str) -> Result<i64, CommandError> {
    let bad = || CommandError::BadArgument(text.to_owned());

    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = if let Some(hex) = rest
        .strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))
    {
        (16, hex)
    } else if rest.len() > 1 && rest.starts_with('0') {
        (8, &rest[1..])
    } else {
        (10, rest)
    };

    // from_str_radix accepts its own sign; only one is allowed
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(bad());
    }

    let magnitude = i64::from_str_radix(digits, radix).map_err(|_| bad())?;
    Ok(if negative { -magnitude } else { magnitude })
}
