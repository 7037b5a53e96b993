/// Keeps the first two whitespace-separated words of a display name.
pub fn first_two_names(input: &str) -> String {
    input.split_whitespace().take(2).collect::<Vec<_>>().join(" ")
}

/// Parses money text as the backend and admins write it: `"3000"`,
/// `"R$ 1.500,00"`, `"2,5"`, `"1.500"` (thousands) or `"10.50"` (decimal).
pub fn parse_amount(input: &str) -> Option<f64> {
    let raw = input.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.chars().all(|c| c.is_ascii_digit()) {
        return raw.parse().ok();
    }

    let only: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if only.is_empty() {
        return None;
    }

    let has_dot = only.contains('.');
    let has_comma = only.contains(',');
    let cleaned = if has_comma {
        only.replace('.', "").replace(',', ".")
    } else if has_dot {
        let last_dot = only.rfind('.').unwrap_or(0);
        let decimals = only.len() - last_dot - 1;
        if decimals == 3 {
            only.replace('.', "")
        } else {
            only
        }
    } else {
        only
    };
    cleaned.parse().ok()
}

/// Formats a value as Brazilian reais, e.g. `R$ 1.234,50`.
pub fn format_brl(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}R$ {grouped},{fraction:02}")
}

/// Renders a countdown as `mm:ss`.
pub fn format_countdown(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_two_names_trims_extra_words() {
        assert_eq!(first_two_names("  Ana  Maria da Silva "), "Ana Maria");
        assert_eq!(first_two_names("Ana"), "Ana");
        assert_eq!(first_two_names(""), "");
    }

    #[test]
    fn parse_amount_handles_brazilian_notation() {
        assert_eq!(parse_amount("3000"), Some(3000.0));
        assert_eq!(parse_amount("R$ 1.500,00"), Some(1500.0));
        assert_eq!(parse_amount("2,5"), Some(2.5));
        assert_eq!(parse_amount("1.500"), Some(1500.0));
        assert_eq!(parse_amount("10.50"), Some(10.5));
        assert_eq!(parse_amount("Prêmio"), None);
        assert_eq!(parse_amount("   "), None);
    }

    #[test]
    fn format_brl_groups_thousands() {
        assert_eq!(format_brl(1234.5), "R$ 1.234,50");
        assert_eq!(format_brl(0.99), "R$ 0,99");
        assert_eq!(format_brl(1_000_000.0), "R$ 1.000.000,00");
    }

    #[test]
    fn format_countdown_pads_minutes_and_seconds() {
        assert_eq!(format_countdown(300), "05:00");
        assert_eq!(format_countdown(59), "00:59");
        assert_eq!(format_countdown(0), "00:00");
    }
}
