//! Human-friendly fraction strings for exposure times.
//!
//! Cameras store exposure time as a rational, often with both terms scaled by
//! powers of ten (`10/1250`, `100000/2500000`). [`format_fraction`] strips
//! those decimal factors so the result reads like a shutter speed (`1/125s`).
//! The reduction is decimal-only: `3/9` stays `3/9`.

/// An exposure value as it arrives from the EXIF decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum FractionValue {
    /// A pre-split rational.
    Rational { numerator: u64, denominator: u64 },
    /// A plain numeric string such as `"0.0125"` or `"2"`.
    Decimal(String),
}

impl FractionValue {
    pub fn rational(numerator: u64, denominator: u64) -> Self {
        FractionValue::Rational {
            numerator,
            denominator,
        }
    }
}

impl From<f64> for FractionValue {
    fn from(value: f64) -> Self {
        // Display gives the shortest round-tripping decimal, so parsing it
        // back is exact.
        FractionValue::Decimal(format!("{value}"))
    }
}

/// Format an exposure value followed by `unit`.
///
/// `None` formats as an empty string. A rational with a zero denominator is
/// not a number and also yields an empty string; a decimal that does not
/// parse is returned as written, without the unit.
pub fn format_fraction(value: Option<&FractionValue>, unit: &str) -> String {
    match value {
        None => String::new(),
        Some(FractionValue::Rational {
            numerator,
            denominator,
        }) => format_rational(*numerator, *denominator, unit),
        Some(FractionValue::Decimal(text)) => match parse_decimal(text) {
            Some((n, d)) => format!("{n}/{d}{unit}"),
            None => text.clone(),
        },
    }
}

fn format_rational(numerator: u64, denominator: u64, unit: &str) -> String {
    if denominator == 0 {
        return String::new();
    }
    if denominator == 1 {
        return format!("{numerator}{unit}");
    }
    if numerator == 0 {
        return format!("0{unit}");
    }
    if numerator == 1 {
        return format!("{numerator}/{denominator}{unit}");
    }
    if numerator == denominator {
        return format!("1{unit}");
    }

    if numerator < denominator {
        // Under a second: shrink the numerator first.
        let (num, times) = strip_powers_of_ten(numerator, 1);
        let (den, _) = strip_powers_of_ten(denominator, times);
        format!("{num}/{den}{unit}")
    } else {
        // Over a second: shrink the denominator first.
        let (den, times) = strip_powers_of_ten(denominator, 1);
        let (num, _) = strip_powers_of_ten(numerator, times);
        if den == 1 {
            format!("{num}{unit}")
        } else {
            format!("{num}/{den}{unit}")
        }
    }
}

/// Repeatedly divide `value` by `10^exponent` while it stays divisible.
///
/// Returns the reduced value and the number of divisions. An exponent of 0
/// or a zero value leaves the input untouched.
fn strip_powers_of_ten(value: u64, exponent: u32) -> (u64, u32) {
    if value == 0 || exponent == 0 {
        return (value, 0);
    }
    let Some(modulus) = 10u64.checked_pow(exponent) else {
        return (value, 0);
    };
    let mut result = value;
    let mut count = 0;
    while result % modulus == 0 {
        result /= modulus;
        count += 1;
    }
    (result, count)
}

/// Parse a decimal string into a reduced exact fraction `(numerator, denominator)`.
fn parse_decimal(text: &str) -> Option<(i128, u128)> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    // u128 holds 38 decimal digits.
    if int_part.len() + frac_part.len() > 36 {
        return None;
    }

    let combined = format!("{int_part}{frac_part}");
    let mut numerator: u128 = if combined.is_empty() {
        0
    } else {
        combined.parse().ok()?
    };
    let mut denominator: u128 = 10u128.pow(frac_part.len() as u32);

    let divisor = gcd(numerator, denominator);
    if divisor > 1 {
        numerator /= divisor;
        denominator /= divisor;
    }
    let numerator = numerator as i128;
    Some((if negative { -numerator } else { numerator }, denominator))
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
