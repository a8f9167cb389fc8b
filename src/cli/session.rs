#![forbid(unsafe_code)]

use std::io::{BufRead, Write};

use anyhow::Context as _;
use tracing::debug;

use crate::config::UiConfig;
use crate::task::{TaskManager, parse};

pub const QUIT_COMMAND: &str = "q";
pub const UNKNOWN_ACTION: &str = "Unknown action";

/// Interactive read loop.
///
/// Prints the list, then reads one command per line until `q` or end of
/// input. Bad commands are reported and the loop continues. The list is
/// saved exactly once, when the loop ends.
pub fn run(
    manager: &mut TaskManager,
    mut input: impl BufRead,
    mut out: impl Write,
    ui: &UiConfig,
) -> anyhow::Result<()> {
    writeln!(out, "{manager}")?;

    let mut buf = Vec::new();
    loop {
        write!(out, "{}", ui.prompt)?;
        out.flush()?;

        buf.clear();
        if input
            .read_until(b'\n', &mut buf)
            .context("failed to read command")?
            == 0
        {
            debug!("end of input");
            break;
        }
        // Invalid UTF-8 is replaced rather than ending the session.
        let line = String::from_utf8_lossy(&buf);
        let command = trim_line_ending(&line);
        if command == QUIT_COMMAND {
            break;
        }

        match parse(command) {
            Ok(Some(action)) => manager.execute(action),
            Ok(None) => writeln!(out, "{UNKNOWN_ACTION}")?,
            Err(err) => writeln!(out, "{err}")?,
        }
        if ui.show_after_command {
            writeln!(out, "{manager}")?;
        }
    }

    manager.save().with_context(|| {
        format!(
            "failed to save tasks to {}",
            manager.repository().path().display()
        )
    })
}

fn trim_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
