use serde::Serialize;

/// A single headline number with its unit.
///
/// `value` is `None` when the warehouse had nothing to average over; it
/// renders blank instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub id: &'static str,
    pub label: String,
    pub value: Option<f64>,
    pub unit: String,
    /// Decimals shown in `display`.
    pub decimals: usize,
    pub display: String,
}

impl Metric {
    pub fn new(
        id: &'static str,
        label: impl Into<String>,
        value: Option<f64>,
        unit: impl Into<String>,
        decimals: usize,
    ) -> Self {
        let unit = unit.into();
        let display = match value {
            Some(v) => format!("{} {}", format_grouped(v, decimals), unit),
            None => String::new(),
        };
        Self {
            id,
            label: label.into(),
            value,
            unit,
            decimals,
            display,
        }
    }

    pub fn count(id: &'static str, label: impl Into<String>, value: u64, unit: &str) -> Self {
        Self::new(id, label, Some(value as f64), unit, 0)
    }
}

/// Format with thousands separators, e.g. `1234567.891` -> `1,234,567.89`.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}
