/// Whole-dollar currency with thousands separators, e.g. `$126,720` or `-$7,000`.
pub fn format_currency(value: f64) -> String {
    let rounded = if value.is_finite() { value.round() } else { 0.0 };
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{}", rounded.abs() as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}")
}

/// Fraction rendered as a whole percent (half away from zero).
pub(crate) fn whole_percent(fraction: f64) -> i64 {
    (fraction * 100.0).round() as i64
}

pub(crate) fn format_square_feet(square_feet: f64) -> String {
    format_currency(square_feet).trim_start_matches('$').to_string()
}
