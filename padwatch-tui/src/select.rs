//! Interactive serial port selection.
//!
//! Used when no port is given on the command line: print the numbered list
//! and prompt on stdin, before any terminal takeover happens.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use padwatch_monitor::list_ports;

/// Prompt the user to pick a port. Returns `None` when cancelled
/// (`q`, empty input, or EOF) or when no ports exist.
pub fn prompt_for_port() -> Result<Option<String>> {
    let ports = list_ports()?;
    if ports.is_empty() {
        println!("No serial ports found.");
        return Ok(None);
    }

    println!("\nAvailable serial ports:");
    for (i, port) in ports.iter().enumerate() {
        println!("{}. {}", i + 1, port.label());
    }

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("\nSelect port (1-{}, q to cancel): ", ports.len());
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let choice = line.trim();
        if choice.is_empty() || choice.eq_ignore_ascii_case("q") {
            return Ok(None);
        }

        match choice.parse::<usize>() {
            Ok(n) if (1..=ports.len()).contains(&n) => {
                return Ok(Some(ports[n - 1].name.clone()));
            }
            _ => println!("Invalid choice. Please select 1-{}.", ports.len()),
        }
    }
}
