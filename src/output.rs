use crate::types::HistogramBinRow;
use crate::util::format_int;
use tabled::{settings::Style, Table, Tabled};

/// Width of the longest chart bar, in glyphs.
const BAR_WIDTH: usize = 40;

pub fn section_header(title: &str) {
    println!("\n{}", "═".repeat(72));
    println!("  {}", title);
    println!("{}\n", "═".repeat(72));
}

pub fn subsection(title: &str) {
    println!("{}", title);
    println!("{}", "─".repeat(64));
}

pub fn print_table<T>(rows: &[T])
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(rows.to_vec()).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Scale `value` against `max` into a bar of at most [`BAR_WIDTH`] glyphs.
/// Non-positive values get an empty bar; any positive value shows at
/// least one glyph so small groups stay visible.
fn bar(value: f64, max: f64) -> String {
    if value <= 0.0 || max <= 0.0 {
        return String::new();
    }
    let mut len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    if len == 0 {
        len = 1;
    }
    "█".repeat(len.min(BAR_WIDTH))
}

/// Horizontal bar chart: one labeled row per item, bars scaled to the
/// largest value, the rendered value appended after the bar.
pub fn bar_chart(items: &[(String, f64, String)]) {
    if items.is_empty() {
        println!("(no data)\n");
        return;
    }
    let label_width = items.iter().map(|(l, _, _)| l.chars().count()).max().unwrap_or(0);
    let max = items.iter().map(|(_, v, _)| *v).fold(f64::MIN, f64::max);
    for (label, value, rendered) in items {
        println!(
            "  {:<width$}  {:<bar_width$}  {}",
            label,
            bar(*value, max),
            rendered,
            width = label_width,
            bar_width = BAR_WIDTH
        );
    }
    println!();
}

/// Histogram rendering: the buckets come pre-labeled, so this is a bar
/// chart over counts.
pub fn histogram_chart(bins: &[HistogramBinRow]) {
    let items: Vec<(String, f64, String)> = bins
        .iter()
        .map(|b| (b.range.clone(), b.count as f64, format_int(b.count as i64)))
        .collect();
    bar_chart(&items);
}

/// Single headline figure, for the scalar-statistic views.
pub fn metric(label: &str, rendered: &str) {
    println!("  {}: {}\n", label, rendered);
}

/// Fixed per-view narrative block, printed after the table and chart.
pub fn commentary(lines: &[(&str, &str)]) {
    subsection("Commentary");
    let label_width = lines.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    for (label, text) in lines {
        println!("  {:<width$}  {}", format!("{}:", label), text, width = label_width + 1);
    }
    println!();
}
