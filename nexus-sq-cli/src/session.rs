//! Runs interpreter commands against a service queue.
//!
//! Each accepted line makes exactly one queue call and prints its result in
//! a fixed format. Rejected lines print a generic message and leave the
//! queue alone.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use log::{debug, info};
use nexus_sq::{Buzzer, ServiceQueue};

use crate::command::{self, Command};

/// Startup text listing the commands.
pub const BANNER: &str = "
Welcome to the simple service-queue interactive program
   An empty service queue has been created for you
   Commands:
    d          : display queue
    l          : report length of queue
    g          : give out a buzzer
    s          : serve the first buzzer in line
    k <buzzer> : kick specified buzzer out!
    b <buzzer> : take a bribe to move specified buzzer to front!
    q          : quit
-----------------------------------

";

const PROMPT: &str = "cmd > ";
const BAD_COMMAND: &str = "    bad command. try again";

/// Whether the session should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Executes one parsed command, writing its report to `out`.
pub fn execute(queue: &mut ServiceQueue, command: Command, out: &mut impl Write) -> io::Result<Flow> {
    match command {
        Command::Display => {
            writeln!(out, "current-queue contents:")?;
            write!(out, "    [")?;
            for buzzer in queue.iter() {
                write!(out, " {buzzer} ")?;
            }
            writeln!(out, "]")?;
            writeln!(out)?;
        }
        Command::Length => writeln!(out, "  len: {}", queue.len())?,
        Command::Give => writeln!(out, "  buzzer: {}", queue.give_buzzer())?,
        Command::Seat => writeln!(out, "  serving buzzer: {}", Buzzer::code(queue.seat()))?,
        Command::KickOut(id) => {
            // Ids no buzzer can have are simply not in line
            if Buzzer::try_from(id).is_ok_and(|b| queue.kick_out(b)) {
                writeln!(out, "  {id} is outta here!")?;
            } else {
                writeln!(out, "  could not remove tkt {id}!")?;
            }
        }
        Command::Bribe(id) => {
            if Buzzer::try_from(id).is_ok_and(|b| queue.take_bribe(b)) {
                writeln!(out, "  VIP coming through!")?;
            } else {
                writeln!(out, "  Get in line, then bribe me!")?;
            }
        }
        Command::Quit => {
            writeln!(out, "  goodbye...")?;
            return Ok(Flow::Quit);
        }
    }
    Ok(Flow::Continue)
}

/// Parses and executes one input line.
pub fn run_line(queue: &mut ServiceQueue, line: &str, out: &mut impl Write) -> io::Result<Flow> {
    match command::parse(line) {
        Ok(None) => Ok(Flow::Continue),
        Ok(Some(command)) => execute(queue, command, out),
        Err(err) => {
            debug!("rejected {:?}: {err}", line.trim_end());
            writeln!(out, "{BAD_COMMAND}")?;
            Ok(Flow::Continue)
        }
    }
}

/// Reads lines from `input` until `q` or end of input.
///
/// With `prompt` set, `cmd > ` is written before every read.
pub fn run(
    queue: &mut ServiceQueue,
    mut input: impl BufRead,
    out: &mut impl Write,
    prompt: bool,
) -> anyhow::Result<()> {
    let mut buf = Vec::new();
    loop {
        if prompt {
            out.write_all(PROMPT.as_bytes())
                .and_then(|()| out.flush())
                .context("failed to write prompt")?;
        }

        buf.clear();
        let read = input
            .read_until(b'\n', &mut buf)
            .context("failed to read command")?;
        if read == 0 {
            info!("end of input, {} buzzer(s) still in line", queue.len());
            break;
        }

        let Ok(line) = std::str::from_utf8(&buf) else {
            debug!("rejected line that is not UTF-8: {}", buf.escape_ascii());
            writeln!(out, "{BAD_COMMAND}").context("failed to write output")?;
            continue;
        };

        let flow = run_line(queue, line, out).context("failed to write output")?;
        if flow == Flow::Quit {
            break;
        }
    }
    out.flush().context("failed to flush output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(input: &str) -> String {
        let mut queue = ServiceQueue::new();
        let mut out = Vec::new();
        run(&mut queue, input.as_bytes(), &mut out, false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn walkthrough_transcript() {
        let output = transcript("g\ng\ng\nd\nk 1\nd\nb 2\nd\ng\nd\ns\nl\nq\n");
        let expected = "  buzzer: 0
  buzzer: 1
  buzzer: 2
current-queue contents:
    [ 0  1  2 ]

  1 is outta here!
current-queue contents:
    [ 0  2 ]

  VIP coming through!
current-queue contents:
    [ 2  0 ]

  buzzer: 1
current-queue contents:
    [ 2  0  1 ]

  serving buzzer: 2
  len: 2
  goodbye...
";
        assert_eq!(output, expected);
    }

    #[test]
    fn empty_queue_transcript() {
        let output = transcript("s\nk 5\nb 0\nd\n");
        let expected = "  serving buzzer: -1
  could not remove tkt 5!
  Get in line, then bribe me!
current-queue contents:
    []

";
        assert_eq!(output, expected);
    }

    #[test]
    fn bad_lines_do_not_touch_queue() {
        let mut queue = ServiceQueue::new();
        let mut out = Vec::new();
        run(&mut queue, "g 1\nx\nk\nk abc\n\nquit\n".as_bytes(), &mut out, false).unwrap();

        assert_eq!(queue.len(), 0);
        assert_eq!(queue.issued(), 0);
        let output = String::from_utf8(out).unwrap();
        assert_eq!(output.lines().count(), 5);
        assert!(output.lines().all(|l| l == BAD_COMMAND));
    }

    #[test]
    fn out_of_range_ids_are_refused() {
        let output = transcript("g\nk -1\nb 99999999999\nk 0x0\n");
        let expected = "  buzzer: 0
  could not remove tkt -1!
  Get in line, then bribe me!
  0 is outta here!
";
        assert_eq!(output, expected);
    }

    #[test]
    fn non_utf8_line_is_a_bad_command() {
        let mut queue = ServiceQueue::new();
        let mut out = Vec::new();
        run(&mut queue, &b"g\n\xff\ng\nl\n"[..], &mut out, false).unwrap();

        let expected = "  buzzer: 0\n    bad command. try again\n  buzzer: 1\n  len: 2\n";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn stops_at_quit() {
        let output = transcript("q\ng\n");
        assert_eq!(output, "  goodbye...\n");
    }

    #[test]
    fn prompt_is_written_per_read() {
        let mut queue = ServiceQueue::new();
        let mut out = Vec::new();
        run(&mut queue, "l\n".as_bytes(), &mut out, true).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "cmd >   len: 0\ncmd > ");
    }
}
