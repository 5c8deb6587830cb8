//! Number formatting for user-facing text

/// Format a value with comma thousands separators and a fixed number of decimals
///
/// ```
/// use realty_core::format_grouped;
/// assert_eq!(format_grouped(1338225.58, 0), "1,338,226");
/// assert_eq!(format_grouped(-2500.5, 1), "-2,500.5");
/// ```
pub fn format_grouped(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format a rupee amount rounded to whole rupees, e.g. `₹1,500,000`
pub fn format_inr(amount: f64) -> String {
    format!("₹{}", format_grouped(amount, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping() {
        assert_eq!(format_grouped(0.0, 0), "0");
        assert_eq!(format_grouped(999.0, 0), "999");
        assert_eq!(format_grouped(1000.0, 0), "1,000");
        assert_eq!(format_grouped(12345678.0, 0), "12,345,678");
        assert_eq!(format_grouped(1234.567, 2), "1,234.57");
    }

    #[test]
    fn test_inr() {
        assert_eq!(format_inr(5_250_000.0), "₹5,250,000");
        assert_eq!(format_inr(-0.2), "₹0");
    }
}
