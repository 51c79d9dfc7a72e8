//! Tolerant price parsing.
//!
//! Sheet prices are free-form: `"1,200 Tk"`, `"Tk 500"`, `"৳950"`,
//! `"2,450.50 BDT"`. Parsing drops thousands separators, discards every
//! whitespace-separated token that carries no digit (currency words), then
//! strips currency symbols glued to the remaining number.
//!
//! A dot right after a currency abbreviation (`"Tk.500"`) belongs to the
//! abbreviation; any other leading dot (`".99"`, `"৳.50"`) is a decimal
//! point. Prices are never negative, so a minus sign is unparsable.

use crate::error::CatalogError;

/// Parse a raw price string into a number.
///
/// Exactly one token containing digits must remain after currency tokens
/// are discarded; anything else is [`CatalogError::PriceUnparsable`].
pub fn parse_price(raw: &str) -> Result<f64, CatalogError> {
    let unparsable = || CatalogError::PriceUnparsable {
        raw: raw.to_string(),
    };

    let cleaned = raw.replace(',', "");
    let mut numeric = cleaned
        .split_whitespace()
        .filter(|token| token.chars().any(|c| c.is_ascii_digit()));

    let token = numeric.next().ok_or_else(unparsable)?;
    if numeric.next().is_some() {
        return Err(unparsable());
    }

    let body = token.trim_end_matches(|c: char| !c.is_ascii_digit());
    let start = body.find(|c: char| c.is_ascii_digit()).ok_or_else(unparsable)?;
    let (prefix, digits) = body.split_at(start);
    if prefix.contains('-') {
        return Err(unparsable());
    }

    let number = match prefix.strip_suffix('.') {
        Some(word) if word.ends_with(char::is_alphabetic) => digits.to_string(),
        Some(_) => format!("0.{}", digits),
        None => digits.to_string(),
    };

    number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(unparsable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_and_suffix() {
        assert_eq!(parse_price("1,200 Tk").unwrap(), 1200.0);
        assert_eq!(parse_price("2,450.50 BDT").unwrap(), 2450.5);
    }

    #[test]
    fn test_prefix_currency() {
        assert_eq!(parse_price("Tk 500").unwrap(), 500.0);
        assert_eq!(parse_price("Tk. 500").unwrap(), 500.0);
    }

    #[test]
    fn test_glued_symbols() {
        assert_eq!(parse_price("৳950").unwrap(), 950.0);
        assert_eq!(parse_price("1200Tk").unwrap(), 1200.0);
        assert_eq!(parse_price("Tk.1,000.").unwrap(), 1000.0);
        assert_eq!(parse_price("Tk.500").unwrap(), 500.0);
        assert_eq!(parse_price("Rs.1,250").unwrap(), 1250.0);
    }

    #[test]
    fn test_leading_decimal_point() {
        assert_eq!(parse_price(".99 Tk").unwrap(), 0.99);
        assert_eq!(parse_price("৳.50").unwrap(), 0.5);
        assert!(parse_price(".1.5").is_err());
    }

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_price("  850 ").unwrap(), 850.0);
        assert_eq!(parse_price("99.99").unwrap(), 99.99);
    }

    #[test]
    fn test_unparsable() {
        assert!(matches!(
            parse_price(""),
            Err(CatalogError::PriceUnparsable { .. })
        ));
        assert!(parse_price("Tk").is_err());
        assert!(parse_price("call for price").is_err());
        assert!(parse_price("500 - 700 Tk").is_err());
        assert!(parse_price("1.2.3").is_err());
        assert!(parse_price("-500").is_err());
        assert!(parse_price("Tk -500").is_err());
    }
}
