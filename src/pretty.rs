//! # Console report formatting
//!
//! Rendering helpers for the probe's console output: section banners, stored
//! item samples and ranked search hits. Everything writes to a generic
//! [`Write`] so the report can go to stdout or be captured in tests.
//!
//! Banner titles are emphasised with `crossterm` styling when stdout is a
//! terminal; piped output carries no escape codes.
//!
//! ## Layout
//!
//! ```text
//! ======================================================================
//! 🔍 검색 테스트
//! ======================================================================
//! [1] 청년 월세 지원
//!     📍 분야: 주거
//!     ...
//!     📏 유사도 거리: 0.1234
//!     📝 내용: 무주택 청년에게 월세를 지원합니다....
//! ```

use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use std::io::{self, Write};

use crate::models::{QueryHit, StoredItem, keys};

/// Width of the `=` / `-` rules.
pub const RULE_WIDTH: usize = 70;

/// Characters of document text shown per item.
pub const EXCERPT_CHARS: usize = 150;

const NOT_AVAILABLE: &str = "N/A";
const ZERO: &str = "0";

/// First `max_chars` characters of `text` followed by `...`.
///
/// Counts `char`s, not bytes, so Korean text is never split mid-character.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

pub fn rule(ch: char) -> String {
    std::iter::repeat_n(ch, RULE_WIDTH).collect()
}

/// `title` in bold when `styled`, verbatim otherwise.
pub fn banner_title(title: &str, styled: bool) -> String {
    if styled {
        title.bold().to_string()
    } else {
        title.to_string()
    }
}

/// `=` rule, title, `=` rule. The title is bold only when stdout is a terminal.
pub fn write_banner<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "{}", rule('='))?;
    writeln!(out, "{}", banner_title(title, io::stdout().is_tty()))?;
    writeln!(out, "{}", rule('='))
}

/// Blank line, then [`write_banner`].
pub fn write_section<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    write_banner(out, title)
}

/// One entry of the stats sample, numbered from 1.
pub fn write_sample_item<W: Write>(out: &mut W, number: usize, item: &StoredItem) -> io::Result<()> {
    writeln!(out, "\n[{number}] ID: {}", item.id)?;
    writeln!(out, "    정책명: {}", item.field_or(keys::POLICY_NAME, NOT_AVAILABLE))?;
    writeln!(out, "    분야: {}", item.field_or(keys::CATEGORY, NOT_AVAILABLE))?;
    writeln!(out, "    담당: {}", item.field_or(keys::ORGANIZATION, NOT_AVAILABLE))?;
    writeln!(out, "    내용: {}", excerpt(&item.document, EXCERPT_CHARS))
}

/// One ranked hit, numbered from 1, followed by a blank line.
pub fn write_hit<W: Write>(out: &mut W, number: usize, hit: &QueryHit) -> io::Result<()> {
    writeln!(out, "[{number}] {}", hit.field_or(keys::POLICY_NAME, NOT_AVAILABLE))?;
    writeln!(out, "    📍 분야: {}", hit.field_or(keys::CATEGORY, NOT_AVAILABLE))?;
    writeln!(out, "    🏢 담당: {}", hit.field_or(keys::ORGANIZATION, NOT_AVAILABLE))?;
    writeln!(
        out,
        "    👤 연령: {}세 ~ {}세",
        hit.field_or(keys::MIN_AGE, ZERO),
        hit.field_or(keys::MAX_AGE, ZERO)
    )?;
    writeln!(
        out,
        "    💰 지원금: {}원 ~ {}원",
        hit.field_or(keys::MIN_AMOUNT, ZERO),
        hit.field_or(keys::MAX_AMOUNT, ZERO)
    )?;
    writeln!(
        out,
        "    📅 신청기간: {}",
        hit.field_or(keys::APPLICATION_PERIOD, NOT_AVAILABLE)
    )?;
    writeln!(out, "    🔗 URL: {}", hit.field_or(keys::URL, NOT_AVAILABLE))?;
    writeln!(out, "    📏 유사도 거리: {:.4}", hit.display_distance())?;
    writeln!(out, "    📝 내용: {}", excerpt(&hit.document, EXCERPT_CHARS))?;
    writeln!(out)
}
