//! # Stats and search reporting
//!
//! The two reporting steps of a probe run:
//!
//! - [`report_stats`] prints the item count and a small unranked sample.
//! - [`run_query`] embeds a question, queries the collection and prints the
//!   ranked hits.
//!
//! Both write to any [`Write`]; errors from the embedder or the index are
//! returned to the caller, which decides whether they are fatal.

use std::error::Error;
use std::io::{self, Write};
use tracing::{debug, info};

use crate::api::Embedder;
use crate::models::QueryResult;
use crate::pretty::{rule, write_hit, write_sample_item, write_section};
use crate::vector_store::Collection;

/// Items shown by [`report_stats`].
pub const SAMPLE_SIZE: usize = 3;

/// Result count when the caller has no preference.
pub const DEFAULT_TOP_K: usize = 5;

/// Print collection statistics and a sample of up to [`SAMPLE_SIZE`] items.
///
/// Returns the item count.
pub fn report_stats<W: Write>(collection: &Collection, out: &mut W) -> io::Result<usize> {
    write_section(out, "📊 벡터 DB 통계")?;

    let count = collection.count();
    info!("Collection {} holds {} items", collection.name(), count);
    writeln!(out, "✅ 저장된 정책 수: {count}개")?;

    let sample = collection.peek(SAMPLE_SIZE);
    writeln!(out, "\n📄 샘플 데이터 ({}개):", sample.len())?;
    writeln!(out, "{}", rule('-'))?;

    for (i, item) in sample.iter().enumerate() {
        write_sample_item(out, i + 1, item)?;
    }

    Ok(count)
}

/// Embed `query`, fetch the `top_k` nearest items and print them.
///
/// An empty result prints a notice and is not an error. The hits are returned
/// so callers can inspect what was shown.
///
/// # Errors
/// Propagates embedding, index and output failures.
pub async fn run_query<E, W>(
    collection: &Collection,
    embedder: &E,
    query: &str,
    top_k: usize,
    out: &mut W,
) -> Result<QueryResult, Box<dyn Error>>
where
    E: Embedder,
    W: Write,
{
    write_section(out, "🔍 검색 테스트")?;
    writeln!(out, "질문: {query}")?;
    writeln!(out, "검색 결과 수: {top_k}개\n")?;
    out.flush()?;

    debug!("Embedding query: {:?}", query);
    let embedding = embedder.embed(query).await?;
    let result = collection.query(&embedding, top_k)?;

    if result.is_empty() {
        writeln!(out, "❌ 검색 결과가 없습니다.")?;
        return Ok(result);
    }

    writeln!(out, "✅ {}개 결과 발견\n", result.len())?;
    for (i, hit) in result.hits.iter().enumerate() {
        write_hit(out, i + 1, hit)?;
    }
    out.flush()?;

    Ok(result)
}
