//! Colored terminal logging.
//!
//! ```text
//! [content] loaded 42 items from 3 sections
//! [feed] feed.rss (20 items)
//! [cache] sitemap.xml unchanged, reusing artifact (7 items)
//! ```
//!
//! Lines are cut to the terminal width. `[error]` lines go to stderr.

use colored::{ColoredString, Colorize};
use crossterm::{
    execute,
    terminal::{Clear, ClearType, size},
};
use std::{
    io::{Write, stderr, stdout},
    sync::OnceLock,
};

const FALLBACK_WIDTH: u16 = 120;

static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

fn terminal_width() -> usize {
    *TERMINAL_WIDTH.get_or_init(|| size().map_or(FALLBACK_WIDTH, |(w, _)| w)) as usize
}

/// `log!("feed"; "rendering {} entries", count)`
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

pub fn log(module: &str, message: &str) {
    // "[module] " takes the module name plus three columns
    let budget = terminal_width().saturating_sub(module.len() + 3);
    let line = format!("{} {}", prefix(module), fit(message, budget));

    if module.eq_ignore_ascii_case("error") {
        writeln!(stderr().lock(), "{line}").ok();
        return;
    }

    let mut out = stdout().lock();
    execute!(out, Clear(ClearType::UntilNewLine)).ok();
    writeln!(out, "{line}").ok();
    out.flush().ok();
}

fn prefix(module: &str) -> ColoredString {
    let tag = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "feed" | "sitemap" => tag.bright_blue().bold(),
        "cache" => tag.bright_magenta().bold(),
        "build" => tag.bright_green().bold(),
        "error" => tag.bright_red().bold(),
        _ => tag.bright_yellow().bold(),
    }
}

/// Longest prefix of `s` within `budget` bytes that ends on a char boundary.
fn fit(s: &str, budget: usize) -> &str {
    if s.len() <= budget {
        return s;
    }
    let end = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= budget)
        .last()
        .unwrap_or(0);
    &s[..end]
}
