//! Plain-text rendering of monitor output.

use std::fmt::Write as _;

use blogverse_store::{format_bytes, UsageInfo, UsageStatus};

/// Width of the usage bar in cells.
const BAR_WIDTH: usize = 30;

/// One resident key, as listed by `keys`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRow {
    pub key: String,
    /// Key + value length
    pub size: u64,
    pub compressed: bool,
    pub transient: bool,
}

/// `[#########.....................]`
pub fn usage_bar(percentage: f64) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

pub fn usage_report(info: &UsageInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Storage used: {} / {} ({:.1}%)",
        format_bytes(info.used),
        format_bytes(info.total),
        info.percentage
    );
    let _ = writeln!(out, "{} {}", usage_bar(info.percentage), info.status());
    let _ = writeln!(out, "Remaining: {}", format_bytes(info.remaining()));

    let status = info.status();
    if status.needs_attention() {
        let advice = if status == UsageStatus::Critical {
            "Storage critically low! Some features may not work properly."
        } else {
            "Storage is running low. Consider cleaning up old data."
        };
        let _ = writeln!(out, "{advice}");
    }
    out
}

pub fn cleanup_report(removed: usize, before: &UsageInfo, after: &UsageInfo) -> String {
    format!(
        "Removed {removed} transient key{}, freed {}\n{}",
        if removed == 1 { "" } else { "s" },
        format_bytes(before.used.saturating_sub(after.used)),
        usage_report(after)
    )
}

pub fn keys_report(rows: &[KeyRow]) -> String {
    if rows.is_empty() {
        return "No entries\n".to_string();
    }

    let key_width = rows.iter().map(|r| r.key.len()).max().unwrap_or(0);
    let mut out = String::new();
    for row in rows {
        let mut flags = Vec::new();
        if row.compressed {
            flags.push("lz4");
        }
        if row.transient {
            flags.push("transient");
        }
        let _ = writeln!(
            out,
            "{:<key_width$}  {:>10}  {}",
            row.key,
            format_bytes(row.size),
            flags.join(",")
        );
    }
    let total: u64 = rows.iter().map(|r| r.size).sum();
    let _ = writeln!(out, "{} entries, {}", rows.len(), format_bytes(total));
    out
}
