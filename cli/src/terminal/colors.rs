use colored::Color;

pub const PRIMARY: Color = Color::BrightCyan;
pub const ACCENT: Color = Color::BrightYellow;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const SUCCESS: Color = Color::BrightGreen;
pub const WARNING: Color = Color::Yellow;
pub const DANGER: Color = Color::BrightRed;
pub const MUTED: Color = Color::BrightBlack;
