use std::{collections::BTreeMap, fmt::Write};

use crate::statistic::Trend;

pub fn render_trends(trends: &[Trend]) -> String {
    let mut out = String::new();
    for (tag, count) in trends {
        let _ = writeln!(out, "{tag}: {count}");
    }
    out
}

pub fn render_growth(rates: &BTreeMap<String, f64>) -> String {
    let mut out = String::new();
    for (tag, rate) in rates {
        let _ = writeln!(out, "{tag}: {rate:.2}");
    }
    out
}
