//! # Interactive search loop
//!
//! A read-query-print loop over an opened collection. Each iteration prompts,
//! reads one line and either stops, skips or runs [`run_query`].
//!
//! ```text
//!            ┌──── empty line / query / recovered error ────┐
//!            v                                              │
//!   awaiting input ─────────────────────────────────────────┘
//!            │ quit | q | exit | 종료 (any case), interrupt, end of input
//!            v
//!       terminated
//! ```
//!
//! Failures inside one iteration (embedding or index errors) are printed and the
//! loop keeps going. The `interrupt` future passed in (Ctrl-C in the binary)
//! ends the loop immediately, even while a query is in flight.

use std::error::Error;
use std::future::Future;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::api::Embedder;
use crate::pretty::write_section;
use crate::search::run_query;
use crate::vector_store::Collection;

/// Inputs that end the loop, compared case-insensitively after trimming.
pub const EXIT_TOKENS: [&str; 4] = ["quit", "q", "exit", "종료"];

/// Result count used for interactive queries.
pub const INTERACTIVE_TOP_K: usize = 3;

const PROMPT: &str = "\n질문을 입력하세요: ";
const FAREWELL: &str = "검색을 종료합니다.";

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The user typed one of [`EXIT_TOKENS`].
    Quit,
    /// The interrupt future completed.
    Interrupted,
    /// Standard input was closed.
    EndOfInput,
}

enum Step {
    Exit(LoopExit),
    Skipped,
    Searched,
}

/// Whether `input` is one of [`EXIT_TOKENS`].
pub fn is_exit_token(input: &str) -> bool {
    let lowered = input.trim().to_lowercase();
    EXIT_TOKENS.contains(&lowered.as_str())
}

/// Run the loop until an exit token, the interrupt, or end of input.
///
/// # Errors
/// Only failures writing the farewell or error lines to `out` are returned;
/// everything raised inside an iteration is reported and recovered.
pub async fn interactive_search<E, R, W, I>(
    collection: &Collection,
    embedder: &E,
    top_k: usize,
    input: &mut R,
    out: &mut W,
    interrupt: I,
) -> io::Result<LoopExit>
where
    E: Embedder,
    R: AsyncBufRead + Unpin,
    W: Write,
    I: Future<Output = ()>,
{
    write_section(out, "💬 대화형 검색 모드 (종료: 'quit', 'q', 'exit')")?;
    tokio::pin!(interrupt);

    loop {
        let step = tokio::select! {
            biased;
            _ = &mut interrupt => Ok(Step::Exit(LoopExit::Interrupted)),
            step = iteration(collection, embedder, top_k, input, out) => step,
        };

        match step {
            Ok(Step::Exit(LoopExit::Quit)) => {
                writeln!(out, "{FAREWELL}")?;
                return Ok(LoopExit::Quit);
            }
            Ok(Step::Exit(exit)) => {
                debug!("Interactive loop stopped: {:?}", exit);
                writeln!(out, "\n\n{FAREWELL}")?;
                return Ok(exit);
            }
            Ok(Step::Skipped) | Ok(Step::Searched) => {}
            Err(e) => {
                warn!("Interactive query failed: {}", e);
                writeln!(out, "❌ 오류 발생: {e}")?;
            }
        }
    }
}

async fn iteration<E, R, W>(
    collection: &Collection,
    embedder: &E,
    top_k: usize,
    input: &mut R,
    out: &mut W,
) -> Result<Step, Box<dyn Error>>
where
    E: Embedder,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{PROMPT}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Ok(Step::Exit(LoopExit::EndOfInput));
    }

    let query = line.trim();
    if is_exit_token(query) {
        return Ok(Step::Exit(LoopExit::Quit));
    }
    if query.is_empty() {
        return Ok(Step::Skipped);
    }

    run_query(collection, embedder, query, top_k, out).await?;
    Ok(Step::Searched)
}
