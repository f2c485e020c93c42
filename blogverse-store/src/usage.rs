//! Usage accounting for the storage monitor.

use std::fmt;

/// Usage snapshot, computed on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageInfo {
    /// Bytes resident (keys + values)
    pub used: u64,
    /// Nominal ceiling in bytes
    pub total: u64,
    /// `used / total * 100`
    pub percentage: f64,
}

impl UsageInfo {
    pub fn new(used: u64, total: u64) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            used as f64 / total as f64 * 100.0
        };
        Self {
            used,
            total,
            percentage,
        }
    }

    /// Bytes left before the nominal ceiling.
    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.used)
    }

    pub fn status(&self) -> UsageStatus {
        UsageStatus::from_percentage(self.percentage)
    }
}

impl fmt::Display for UsageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} ({:.1}%, {})",
            format_bytes(self.used),
            format_bytes(self.total),
            self.percentage,
            self.status()
        )
    }
}

/// Coarse usage level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UsageStatus {
    /// 50% or less
    Good,
    /// Above 50%
    Medium,
    /// Above 75%
    High,
    /// Above 90%
    Critical,
}

impl UsageStatus {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage > 90.0 {
            UsageStatus::Critical
        } else if percentage > 75.0 {
            UsageStatus::High
        } else if percentage > 50.0 {
            UsageStatus::Medium
        } else {
            UsageStatus::Good
        }
    }

    /// Whether the user should be told to free space.
    pub fn needs_attention(self) -> bool {
        self >= UsageStatus::High
    }

    pub fn label(self) -> &'static str {
        match self {
            UsageStatus::Good => "Good",
            UsageStatus::Medium => "Medium",
            UsageStatus::High => "High",
            UsageStatus::Critical => "Critical",
        }
    }
}

impl fmt::Display for UsageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size: base 1024, up to two decimals, trailing zeros dropped.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}
