//! # Line REPL
//!
//! `You:` / `Assistant:` loop over stdin and stdout. Answers are streamed
//! as they arrive; `quit` exits.

use std::io::{self, Write};

use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::core::agent::Agent;
use crate::core::session::RETRY_HINT;

const BANNER: &str = "\
Welcome! I'm your Math AI assistant. Type 'quit' to exit.
You can ask me to:
  - Do arithmetic, powers and square roots
  - Solve linear and quadratic equations, factor and expand expressions
  - Find areas, volumes and missing sides of right triangles
  - Work with trigonometry, logarithms and exponentials
  - Compute mean, median, mode, variance and standard deviation
  - Find terms and sums of arithmetic and geometric sequences
  - Work out percentages and simplify ratios";

/// Runs the REPL on the process's stdin and stdout.
pub async fn run(agent: &Agent) -> io::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = io::stdout();
    run_with(agent, stdin, &mut stdout).await
}

pub async fn run_with<R, W>(agent: &Agent, input: R, out: &mut W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    writeln!(out, "{BANNER}")?;
    let mut lines = input.lines();

    loop {
        write!(out, "\nYou: ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let question = line.trim();
        if question.eq_ignore_ascii_case("quit") {
            break;
        }
        if question.is_empty() {
            continue;
        }

        info!("REPL question received");
        write!(out, "\nAssistant: ")?;
        out.flush()?;

        let mut write_error = None;
        let result = agent
            .answer(question, |delta| {
                if write_error.is_none()
                    && let Err(e) = out.write_all(delta.as_bytes()).and_then(|_| out.flush())
                {
                    write_error = Some(e);
                }
            })
            .await;
        if let Some(e) = write_error {
            return Err(e);
        }

        match result {
            Ok(_) => writeln!(out)?,
            Err(e) => {
                warn!("Answering failed: {}", e);
                writeln!(out, "\nError: {e}")?;
                writeln!(out, "{RETRY_HINT}")?;
            }
        }
    }

    writeln!(out, "Goodbye!")?;
    Ok(())
}
