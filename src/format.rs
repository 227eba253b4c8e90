//! Display and parsing helpers for money, dates and phone numbers.

use crate::error::{AppError, AppResult};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Accepted input date layouts, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Format an amount as Indian rupees with lakh/crore digit grouping.
///
/// `1234567.5` becomes `₹12,34,567.50`.
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let grouped = group_indian(int_part);
    format!("{}₹{}.{}", if negative { "-" } else { "" }, grouped, frac_part)
}

/// Last three digits, then groups of two
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Largest value a `NUMERIC(14, 2)` money column holds
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

/// Parse a money amount that may be zero, e.g. an auction bid
pub fn parse_amount_allow_zero(raw: &str, field: &str) -> AppResult<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let amount = Decimal::from_str(cleaned.trim())
        .map_err(|e| AppError::InvalidDecimal(format!("{}: {}", field, e)))?;
    if amount < Decimal::ZERO {
        return Err(AppError::Validation(format!("{} cannot be negative", field)));
    }
    if amount.scale() > 2 && amount != amount.round_dp(2) {
        return Err(AppError::Validation(format!(
            "{} cannot have more than two decimal places",
            field
        )));
    }
    check_amount_range(amount, field)?;
    Ok(amount.round_dp(2))
}

/// Reject amounts that do not fit the ledger's money columns
pub fn check_amount_range(amount: Decimal, field: &str) -> AppResult<()> {
    if amount > max_amount() {
        return Err(AppError::Validation(format!(
            "{} cannot exceed {}",
            field,
            format_inr(max_amount())
        )));
    }
    Ok(())
}

/// Parse a positive money amount from its wire form
pub fn parse_amount(raw: &str, field: &str) -> AppResult<Decimal> {
    let amount = parse_amount_allow_zero(raw, field)?;
    if amount.is_zero() {
        return Err(AppError::Validation(format!("{} must be positive", field)));
    }
    Ok(amount)
}

/// Parse a date in `YYYY-MM-DD`, `DD/MM/YYYY` or `DD-MM-YYYY`
pub fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| AppError::Validation(format!("Invalid date: {:?}", raw)))
}

/// Parse an optional date, falling back to `default` when blank
pub fn parse_date_or(raw: &str, default: NaiveDate) -> AppResult<NaiveDate> {
    if raw.trim().is_empty() {
        Ok(default)
    } else {
        parse_date(raw)
    }
}

/// Current local calendar date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Human-readable date, e.g. `05 Mar 2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

/// Wire form of a date
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Normalize a phone number to E.164, defaulting to the Indian country code
pub fn normalize_phone(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    let has_plus = trimmed.starts_with('+');
    let digits: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '+'))
        .collect();

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(format!("Invalid phone number: {}", raw)));
    }

    let normalized = if has_plus {
        format!("+{}", digits)
    } else if digits.len() == 10 {
        format!("+91{}", digits)
    } else if digits.len() == 12 && digits.starts_with("91") {
        format!("+{}", digits)
    } else {
        return Err(AppError::Validation(format!("Invalid phone number: {}", raw)));
    };

    let len = normalized.len() - 1;
    if !(10..=15).contains(&len) {
        return Err(AppError::Validation(format!("Invalid phone number: {}", raw)));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_inr_grouping() {
        assert_eq!(format_inr(dec("0")), "₹0.00");
        assert_eq!(format_inr(dec("999")), "₹999.00");
        assert_eq!(format_inr(dec("1000")), "₹1,000.00");
        assert_eq!(format_inr(dec("100000")), "₹1,00,000.00");
        assert_eq!(format_inr(dec("1234567.5")), "₹12,34,567.50");
        assert_eq!(format_inr(dec("123456789.99")), "₹12,34,56,789.99");
    }

    #[test]
    fn test_format_inr_rounding_and_sign() {
        assert_eq!(format_inr(dec("10.005")), "₹10.01");
        assert_eq!(format_inr(dec("-1000")), "-₹1,000.00");
        assert_eq!(format_inr(dec("-0.001")), "₹0.00");
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_date("2024-03-05").unwrap(), expected);
        assert_eq!(parse_date("05/03/2024").unwrap(), expected);
        assert_eq!(parse_date(" 05-03-2024 ").unwrap(), expected);
        assert!(parse_date("2024/03/05").is_err());
        assert!(parse_date("31/02/2024").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_date_or_default() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(parse_date_or("  ", today).unwrap(), today);
    }

    #[test]
    fn test_format_date() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_date(d), "05 Mar 2024");
        assert_eq!(iso_date(d), "2024-03-05");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("5,000", "amount").unwrap(), dec("5000"));
        assert_eq!(parse_amount("₹1,250.50", "amount").unwrap(), dec("1250.50"));
        assert!(matches!(parse_amount("0", "amount"), Err(AppError::Validation(_))));
        assert!(matches!(parse_amount("-5", "amount"), Err(AppError::Validation(_))));
        assert!(matches!(parse_amount("abc", "amount"), Err(AppError::InvalidDecimal(_))));
        assert!(parse_amount("1.005", "amount").is_err());
        assert_eq!(parse_amount_allow_zero("0", "bid").unwrap(), Decimal::ZERO);
        assert!(parse_amount_allow_zero("-1", "bid").is_err());
    }

    #[test]
    fn test_amount_must_fit_money_column() {
        assert_eq!(
            parse_amount("999999999999.99", "amount").unwrap(),
            dec("999999999999.99")
        );
        assert!(matches!(
            parse_amount("1000000000000", "amount"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_amount_allow_zero("1,00,00,00,00,00,000", "bid"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("98765 43210").unwrap(), "+919876543210");
        assert_eq!(normalize_phone("919876543210").unwrap(), "+919876543210");
        assert_eq!(normalize_phone("+1 (415) 555-2671").unwrap(), "+14155552671");
        assert!(normalize_phone("12345").is_err());
        assert!(normalize_phone("98765abcde").is_err());
        assert!(normalize_phone("").is_err());
    }
}
