use colored::*;
use kalium_common::config::Config;
use kalium_common::models::scan::{ConfigField, DefaultValue, FieldKind, catalog as scan_catalog};

use crate::kprint;
use crate::terminal::{colors, print};

pub fn catalog(cfg: &Config) {
    for (idx, scan) in scan_catalog().iter().enumerate() {
        if idx > 0 {
            kprint!();
        }
        print::tree_head(idx + 1, &format!("{} ({})", scan.label, scan.kind));

        if cfg.quiet > 0 {
            continue;
        }
        print::print_status(scan.description);
        let fields: Vec<(String, ColoredString)> = scan
            .fields
            .iter()
            .map(|f| (f.id.to_string(), describe(f)))
            .collect();
        print::branches(&fields);
    }
}

fn describe(field: &ConfigField) -> ColoredString {
    let shape = match field.kind {
        FieldKind::Text => field.placeholder.unwrap_or("text").to_string(),
        FieldKind::Select => field
            .options
            .iter()
            .map(|o| o.value)
            .collect::<Vec<_>>()
            .join("|"),
        FieldKind::Number | FieldKind::Range => format!(
            "{}..={}",
            field.min.map_or_else(|| "?".to_string(), |n| n.to_string()),
            field.max.map_or_else(|| "?".to_string(), |n| n.to_string()),
        ),
    };

    let default = match field.default {
        Some(DefaultValue::Text(t)) => format!(" [default {t}]"),
        Some(DefaultValue::Number(n)) => format!(" [default {n}]"),
        None if field.required => " [required]".to_string(),
        None => String::new(),
    };

    format!("{shape}{default}").color(colors::TEXT_DEFAULT)
}
