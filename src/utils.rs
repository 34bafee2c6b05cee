use chrono::{DateTime, DurationRound, TimeDelta, Utc};

// Extra digits rendered past the rounding position. Rust prints exact digits,
// so the first tail digit decides the rounding direction.
const EXACT_TAIL: usize = 30;

/// Parse a provider reading the lenient way the dashboard always has: the
/// longest numeric prefix wins and anything else yields NaN.
///
/// `"23.5"` -> 23.5, `" 7 "` -> 7.0, `"12abc"` -> 12.0, `"abc"` -> NaN.
pub fn parse_reading(raw: &str) -> f64 {
    // The byte order mark counts as leading whitespace too.
    let text = raw.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}');
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    if text[end..].starts_with("Infinity") {
        return if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }

    // Exponent only counts when at least one digit follows it.
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    text[..end].parse::<f64>().unwrap_or(f64::NAN)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Lenient parse that only accepts finite numbers.
pub fn parse_finite(raw: &str) -> Option<f64> {
    let value = parse_reading(raw);
    value.is_finite().then_some(value)
}

/// Round to a fixed number of decimals, resolving exact ties away from zero.
///
/// Matches formatting the value with `digits` decimals and parsing the text
/// back, which is how the dashboard has always stored rounded metrics.
pub fn to_fixed(value: f64, digits: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let expanded = format!("{:.*}", digits + EXACT_TAIL, value.abs());
    let (kept, tail) = expanded.split_at(expanded.len() - EXACT_TAIL);
    let mut units: u128 = match kept.replace('.', "").parse() {
        Ok(units) => units,
        Err(_) => return value,
    };
    if tail.as_bytes()[0] >= b'5' {
        units += 1;
    }

    let magnitude: f64 = match format!("{}e-{}", units, digits).parse() {
        Ok(magnitude) => magnitude,
        Err(_) => return value,
    };
    if magnitude == 0.0 {
        0.0
    } else if value.is_sign_negative() {
        -magnitude
    } else {
        magnitude
    }
}

/// Parse an RFC 3339 provider timestamp, truncated to whole milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw.trim()).ok()?;
    parsed
        .with_timezone(&Utc)
        .duration_trunc(TimeDelta::milliseconds(1))
        .ok()
}
