use thiserror::Error;

/// Amounts are integer cents, so $50.00 = 5000.
pub type Cents = i64;

/// Format cents as a plain decimal string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// `format_cents` for error messages, where fields arrive by reference.
pub(crate) fn dollars(cents: &Cents) -> String {
    format_cents(*cents)
}

/// Parse a decimal string into cents.
/// Accepts at most two fractional digits: "50", "50.5", "50.25", ".75".
/// A leading "$" is tolerated so prompts can be answered as "$20".
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let trimmed = input.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let rest = rest.strip_prefix('$').unwrap_or(rest);

    if rest.is_empty() {
        return Err(ParseCentsError::Empty);
    }

    let (units_str, fraction_str) = rest.split_once('.').unwrap_or((rest, ""));
    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !fraction_str.chars().all(|c| c.is_ascii_digit())
        || (units_str.is_empty() && fraction_str.is_empty())
    {
        return Err(ParseCentsError::InvalidFormat(input.to_string()));
    }
    if fraction_str.len() > 2 {
        return Err(ParseCentsError::TooPrecise(input.to_string()));
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str
            .parse()
            .map_err(|_| ParseCentsError::InvalidFormat(input.to_string()))?
    };
    let fraction: i64 = match fraction_str.len() {
        0 => 0,
        1 => fraction_str.parse::<i64>().unwrap_or(0) * 10,
        _ => fraction_str.parse().unwrap_or(0),
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .ok_or_else(|| ParseCentsError::OutOfRange(input.to_string()))?;
    Ok(if negative { -cents } else { cents })
}

/// Convert a floating point amount in whole units to cents, rounding to the nearest cent.
pub fn cents_from_units(units: f64) -> Cents {
    (units * 100.0).round() as Cents
}

/// Convert cents to whole units for arithmetic that needs fractions.
pub fn units_from_cents(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCentsError {
    #[error("amount is empty")]
    Empty,
    #[error("invalid amount '{0}', use a number like 50 or 50.25")]
    InvalidFormat(String),
    #[error("amount '{0}' has more than two decimal places")]
    TooPrecise(String),
    #[error("amount '{0}' is too large")]
    OutOfRange(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
        assert_eq!(format_cents(-1), "-0.01");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("50"), Ok(5000));
        assert_eq!(parse_cents("50.00"), Ok(5000));
        assert_eq!(parse_cents("12.5"), Ok(1250));
        assert_eq!(parse_cents(".75"), Ok(75));
        assert_eq!(parse_cents(" $20 "), Ok(2000));
        assert_eq!(parse_cents("-3.10"), Ok(-310));
        assert_eq!(parse_cents("0"), Ok(0));
    }

    #[test]
    fn test_parse_cents_rejects_garbage() {
        assert_eq!(parse_cents(""), Err(ParseCentsError::Empty));
        assert!(matches!(
            parse_cents("abc"),
            Err(ParseCentsError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_cents("1.2.3"),
            Err(ParseCentsError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_cents("."),
            Err(ParseCentsError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_cents("10.999"),
            Err(ParseCentsError::TooPrecise(_))
        ));
        assert!(matches!(
            parse_cents("99999999999999999999"),
            Err(ParseCentsError::InvalidFormat(_) | ParseCentsError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_unit_conversions() {
        assert_eq!(cents_from_units(800.0), 80000);
        assert_eq!(cents_from_units(8791.588723), 879159);
        assert_eq!(units_from_cents(1250), 12.5);
    }
}
