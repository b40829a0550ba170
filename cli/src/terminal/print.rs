use std::fmt::Display;

use colored::*;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;

/// Events on this target are written verbatim, without a level symbol.
pub const PRINT_TARGET: &str = "kalium::print";

#[macro_export]
macro_rules! kprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

/// `fill` on both sides of `title`, `TOTAL_WIDTH` columns in all.
fn titled_rule(fill: &str, title: &str, paint: impl Fn(&str) -> ColoredString) -> String {
    let spare = TOTAL_WIDTH.saturating_sub(UnicodeWidthStr::width(title));
    let left = spare / 2;
    format!(
        "{}{}{}",
        fill.repeat(left).bright_black(),
        paint(title),
        fill.repeat(spare - left).bright_black()
    )
}

/// Dots from the end of `key` up to `width`, then the colon.
fn leader(key: &str, width: usize) -> ColoredString {
    format!("{}:", ".".repeat(width.saturating_sub(key.len()))).color(colors::SEPARATOR)
}

pub fn banner(q_level: u8) {
    if q_level == 0 {
        let title = format!("⟦ KALIUM v{} ⟧", env!("CARGO_PKG_VERSION"));
        print(&titled_rule("═", &title, |t| t.bright_green().bold()));
    }
}

pub fn header(msg: &str, q_level: u8) {
    if q_level == 0 {
        let title = format!("⟦ {} ⟧", msg.to_uppercase());
        print(&titled_rule("─", &title, |t| t.bright_green()));
    }
}

pub fn fat_separator() {
    print(&"═".repeat(TOTAL_WIDTH).bright_black().to_string());
}

/// `> key.....: value`. Colour the value before passing it in if it needs one.
pub fn aligned_line(key: &str, key_width: usize, value: impl Display) {
    print(&format!(
        "{} {}{} {value}",
        ">".color(colors::SEPARATOR),
        key.color(colors::PRIMARY),
        leader(key, key_width + 1),
    ));
}

pub fn print_status(msg: &str) {
    print(&format!("{} {}", ">".color(colors::SEPARATOR), msg.color(colors::TEXT_DEFAULT)));
}

/// `[idx] name`, the head of a block printed with [`branches`].
pub fn tree_head(idx: usize, name: &str) {
    print(&format!(
        "{}{}{} {}",
        "[".color(colors::SEPARATOR),
        idx.to_string().color(colors::ACCENT),
        "]".color(colors::SEPARATOR),
        name.color(colors::PRIMARY)
    ));
}

/// One `├─ key...: value` line per entry, the last drawn with `└─`.
pub fn branches(entries: &[(String, ColoredString)]) {
    let width = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let last = entries.len().saturating_sub(1);

    for (i, (key, value)) in entries.iter().enumerate() {
        let branch = if i == last { "└─" } else { "├─" };
        print(&format!(
            " {} {}{} {value}",
            branch.bright_black(),
            key.color(colors::TEXT_DEFAULT),
            leader(key, width),
        ));
    }
}

pub fn centerln(msg: &str) {
    let pad = TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2;
    print(&format!("{}{msg}", " ".repeat(pad)));
}
