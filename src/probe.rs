//! # Probe run
//!
//! The scripted sequence the binary executes:
//!
//! 1. Open the collection ([`load_collection`]); stop if the store or the
//!    collection is missing.
//! 2. Print statistics; stop if the collection is empty.
//! 3. Run the demonstration queries, pausing for `[Enter]` after each one.
//! 4. Ask whether to continue interactively, then run the
//!    [interactive loop](crate::interactive).
//!
//! Input, output and the interrupt signal are parameters so the whole run can be
//! driven from tests.
//!
//! ```no_run
//! use policy_probe::probe::{ProbeOptions, run_probe};
//! # use policy_probe::api::OpenAiEmbedder;
//! # async fn demo(embedder: OpenAiEmbedder) -> Result<(), Box<dyn std::error::Error>> {
//! let options = ProbeOptions::new(policy_probe::default_db_path(), "youth_policies");
//! let mut input = tokio::io::BufReader::new(tokio::io::stdin());
//! let mut out = std::io::stdout();
//! let outcome = run_probe(&options, &embedder, &mut input, &mut out, async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await?;
//! println!("{outcome:?}");
//! # Ok(()) }
//! ```

use std::error::Error;
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::api::Embedder;
use crate::interactive::{INTERACTIVE_TOP_K, LoopExit, interactive_search};
use crate::pretty::{rule, write_banner, write_section};
use crate::search::{report_stats, run_query};
use crate::vector_store::{Collection, OpenError};

/// Questions run by the scripted part of the probe.
pub const DEMO_QUERIES: [&str; 5] = [
    "취업 지원 프로그램이 있나요?",
    "창업 관련 정책을 알려주세요",
    "청년 주거 지원 정책은?",
    "해외 취업이나 인턴십 프로그램",
    "교육 바우처 지원",
];

/// Answers that start interactive mode (`ㅛ` is `y` on a Korean keyboard layout).
pub const AFFIRMATIVE: [&str; 3] = ["y", "yes", "ㅛ"];

/// Whether to enter the interactive loop after the demo queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractiveMode {
    /// Prompt `(y/n)` and follow the answer.
    Ask,
    Always,
    Never,
}

/// Knobs for one probe run.
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    pub db_path: PathBuf,
    pub collection_name: String,
    pub demo_queries: Vec<String>,
    pub top_k: usize,
    /// Wait for `[Enter]` after each demo query.
    pub pause_between: bool,
    pub interactive: InteractiveMode,
    /// Model used for query embeddings, compared against the collection's.
    pub embedding_model: Option<String>,
}

impl ProbeOptions {
    /// The scripted defaults: five demo queries, top 3, pauses, ask for interactive mode.
    pub fn new(db_path: impl Into<PathBuf>, collection_name: &str) -> Self {
        Self {
            db_path: db_path.into(),
            collection_name: collection_name.to_string(),
            demo_queries: DEMO_QUERIES.iter().map(|q| q.to_string()).collect(),
            top_k: INTERACTIVE_TOP_K,
            pause_between: true,
            interactive: InteractiveMode::Ask,
            embedding_model: None,
        }
    }
}

/// Where a probe run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    MissingStore,
    MissingCollection,
    EmptyCollection,
    /// Ran to the end; carries how the interactive loop ended, if it ran.
    Completed { interactive: Option<LoopExit> },
}

/// Whether an answer to the `(y/n)` prompt means yes.
pub fn is_affirmative(answer: &str) -> bool {
    let lowered = answer.trim().to_lowercase();
    AFFIRMATIVE.contains(&lowered.as_str())
}

/// Whether the collection's recorded embedding model and the query model are
/// both known and different. Distances are meaningless across models.
pub fn models_differ(built_with: Option<&str>, query_model: Option<&str>) -> bool {
    matches!((built_with, query_model), (Some(a), Some(b)) if a != b)
}

/// Open `name` under `db_path`, reporting failures to `out`.
///
/// Returns `Ok(Err(outcome))` when the run must stop.
pub fn load_collection<W: Write>(
    db_path: &Path,
    name: &str,
    out: &mut W,
) -> io::Result<Result<Collection, ProbeOutcome>> {
    if !db_path.is_dir() {
        writeln!(out, "❌ 벡터 DB를 찾을 수 없습니다: {}", db_path.display())?;
        return Ok(Err(ProbeOutcome::MissingStore));
    }

    writeln!(out, "📂 DB 경로: {}", db_path.display())?;

    match Collection::open(db_path, name) {
        Ok(collection) => {
            debug!(
                "Collection {} opened: {} items, dimension {}, built with {:?}",
                collection.name(),
                collection.count(),
                collection.dimension(),
                collection.embedding_model()
            );
            Ok(Ok(collection))
        }
        Err(OpenError::MissingStore(path)) => {
            writeln!(out, "❌ 벡터 DB를 찾을 수 없습니다: {}", path.display())?;
            Ok(Err(ProbeOutcome::MissingStore))
        }
        Err(OpenError::MissingCollection { reason, .. }) => {
            writeln!(out, "❌ 컬렉션을 찾을 수 없습니다: {reason}")?;
            Ok(Err(ProbeOutcome::MissingCollection))
        }
    }
}

async fn read_answer<R: AsyncBufRead + Unpin>(input: &mut R) -> io::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line).await?;
    Ok(line)
}

/// Execute the full probe sequence.
///
/// `interrupt` is only polled while the interactive loop runs.
///
/// # Errors
/// Failures during the stats step or the demo queries are returned; the
/// interactive loop recovers from its own.
pub async fn run_probe<E, R, W, I>(
    options: &ProbeOptions,
    embedder: &E,
    input: &mut R,
    out: &mut W,
    interrupt: I,
) -> Result<ProbeOutcome, Box<dyn Error>>
where
    E: Embedder,
    R: AsyncBufRead + Unpin,
    W: Write,
    I: Future<Output = ()>,
{
    write_banner(out, "벡터 DB 검증 및 테스트")?;

    let collection = match load_collection(&options.db_path, &options.collection_name, out)? {
        Ok(collection) => collection,
        Err(outcome) => {
            info!("Probe stopped early: {:?}", outcome);
            return Ok(outcome);
        }
    };

    if models_differ(collection.embedding_model(), options.embedding_model.as_deref()) {
        warn!(
            "Collection was embedded with {:?} but queries use {:?}",
            collection.embedding_model(),
            options.embedding_model
        );
    }

    let count = report_stats(&collection, out)?;
    if count == 0 {
        writeln!(
            out,
            "\n❌ DB가 비어있습니다. 벡터 DB 구축 스크립트를 먼저 실행하세요."
        )?;
        return Ok(ProbeOutcome::EmptyCollection);
    }

    if !options.demo_queries.is_empty() {
        write_section(out, "🧪 자동 테스트 쿼리")?;
    }
    for query in &options.demo_queries {
        run_query(&collection, embedder, query, options.top_k, out).await?;
        if options.pause_between {
            write!(out, "\n[Enter]를 눌러 다음 테스트로 진행...")?;
            out.flush()?;
            read_answer(input).await?;
        }
    }

    let enter_interactive = match options.interactive {
        InteractiveMode::Always => true,
        InteractiveMode::Never => false,
        InteractiveMode::Ask => {
            writeln!(out, "\n{}", rule('='))?;
            write!(out, "대화형 검색을 시작하시겠습니까? (y/n): ")?;
            out.flush()?;
            is_affirmative(&read_answer(input).await?)
        }
    };
    debug!("Interactive mode: {}", enter_interactive);

    let interactive = if enter_interactive {
        Some(interactive_search(&collection, embedder, options.top_k, input, out, interrupt).await?)
    } else {
        None
    };

    writeln!(out, "\n✅ 검증 완료!")?;
    out.flush()?;
    Ok(ProbeOutcome::Completed { interactive })
}
