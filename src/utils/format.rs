//! Text formatting helpers for Discord output.

/// Digits kept after the decimal point when showing token amounts.
const DISPLAY_DECIMALS: u32 = 4;

/// Format a raw integer token amount (e.g. wei) as a decimal string.
///
/// At most four decimals are shown and trailing zeros are trimmed. Non-zero
/// amounts too small to show become `<0.0001`.
///
/// # Examples
///
/// ```
/// use glyphbots::utils::format::format_token_amount;
///
/// assert_eq!(format_token_amount("1500000000000000000", 18), Some("1.5".to_string()));
/// assert_eq!(format_token_amount("not a number", 18), None);
/// ```
pub fn format_token_amount(raw: &str, decimals: u32) -> Option<String> {
    let value: u128 = raw.trim().parse().ok()?;
    let scale = 10u128.checked_pow(decimals)?;

    let whole = value / scale;
    let fraction = value % scale;
    let shown = if decimals >= DISPLAY_DECIMALS {
        fraction / 10u128.pow(decimals - DISPLAY_DECIMALS)
    } else {
        fraction * 10u128.pow(DISPLAY_DECIMALS - decimals)
    };

    if whole == 0 && shown == 0 && value != 0 {
        return Some("<0.0001".to_string());
    }

    Some(trim_fraction(format!("{}.{:04}", whole, shown)))
}

/// Format a floating point amount with at most four decimals.
pub fn format_decimal(value: f64) -> String {
    trim_fraction(format!("{:.4}", value))
}

fn trim_fraction(text: String) -> String {
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Shorten an address to `0x1234…abcd`.
pub fn short_address(address: &str) -> String {
    if address.len() <= 12 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}…{}", &address[..6], &address[address.len() - 4..])
}

/// Truncate text to at most `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

/// Discord user mention markup.
pub fn mention(user_id: u64) -> String {
    format!("<@{}>", user_id)
}

/// Discord relative timestamp markup (e.g. "in 2 minutes").
pub fn relative_time(unix_seconds: i64) -> String {
    format!("<t:{}:R>", unix_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_token_amount() {
        assert_eq!(format_token_amount("1000000000000000000", 18).as_deref(), Some("1"));
        assert_eq!(format_token_amount("250000000000000000", 18).as_deref(), Some("0.25"));
        assert_eq!(format_token_amount("123456789012345678", 18).as_deref(), Some("0.1234"));
        assert_eq!(format_token_amount("0", 18).as_deref(), Some("0"));
        assert_eq!(format_token_amount("1", 18).as_deref(), Some("<0.0001"));
        assert_eq!(format_token_amount("2500000", 6).as_deref(), Some("2.5"));
        assert_eq!(format_token_amount("15", 1).as_deref(), Some("1.5"));

        assert_eq!(format_token_amount("-5", 18), None);
        assert_eq!(format_token_amount("", 18), None);
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(0.0425), "0.0425");
        assert_eq!(format_decimal(12.5), "12.5");
        assert_eq!(format_decimal(3.0), "3");
    }

    #[test]
    fn test_short_address() {
        assert_eq!(
            short_address("0x52bd3b2dc8a0bf4e6c1e5f0a7b0c0d7e9f1a2b3c"),
            "0x52bd…2b3c"
        );
        assert_eq!(short_address("0x1234"), "0x1234");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("this is far too long", 8), "this is…");
        assert_eq!(truncate("ünïcödé text", 5), "ünïc…");
    }

    #[test]
    fn test_markup() {
        assert_eq!(mention(42), "<@42>");
        assert_eq!(relative_time(1_700_000_000), "<t:1700000000:R>");
    }
}
