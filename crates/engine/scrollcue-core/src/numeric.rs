//! Lenient numeric prefix parsing for attribute values.
//!
//! Attribute values are read the way browsers read them in script: the
//! longest valid numeric prefix wins and trailing text is ignored, so
//! `"10rem"` reads as `10.0` and `"150px"` reads as `150`.

/// Longest leading decimal integer (optional sign), ignoring leading whitespace.
pub fn int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    // Saturate on overflow rather than rejecting the value outright.
    s[..end].parse::<i64>().ok().or_else(|| {
        if bytes[0] == b'-' {
            Some(i64::MIN)
        } else {
            Some(i64::MAX)
        }
    })
}

/// Longest leading floating-point literal, ignoring leading whitespace.
///
/// Accepts an optional sign, digits with at most one decimal point, and an
/// exponent only when it is followed by at least one digit. `Infinity` is
/// accepted with an optional sign.
pub fn float_prefix(s: &str) -> Option<f64> {
    split_float_prefix(s).map(|(value, _)| value)
}

/// Like [`float_prefix`], also returning the unparsed remainder.
pub fn split_float_prefix(s: &str) -> Option<(f64, &str)> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        let inf = f64::INFINITY;
        let value = if bytes[0] == b'-' { -inf } else { inf };
        return Some((value, &s[end + "Infinity".len()..]));
    }

    let mut mantissa_digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        mantissa_digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac = end + 1;
        let mut frac_digits = 0;
        while frac < bytes.len() && bytes[frac].is_ascii_digit() {
            frac += 1;
            frac_digits += 1;
        }
        if mantissa_digits + frac_digits > 0 {
            end = frac;
            mantissa_digits += frac_digits;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
            exp += 1;
        }
        let exp_digits_start = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits_start {
            end = exp;
        }
    }

    let value = s[..end].parse::<f64>().ok()?;
    Some((value, &s[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_prefix_reads_leading_digits() {
        assert_eq!(int_prefix("150px"), Some(150));
        assert_eq!(int_prefix("  -20px"), Some(-20));
        assert_eq!(int_prefix("12.9px"), Some(12));
        assert_eq!(int_prefix("px"), None);
        assert_eq!(int_prefix("-"), None);
        assert_eq!(int_prefix(""), None);
    }

    #[test]
    fn float_prefix_matches_script_semantics() {
        assert_eq!(float_prefix("0.5"), Some(0.5));
        assert_eq!(float_prefix(".25"), Some(0.25));
        assert_eq!(float_prefix("3."), Some(3.0));
        assert_eq!(float_prefix("10rem"), Some(10.0));
        assert_eq!(float_prefix("1e2x"), Some(100.0));
        assert_eq!(float_prefix("1e"), Some(1.0));
        assert_eq!(float_prefix("-0.1"), Some(-0.1));
        assert_eq!(float_prefix("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(float_prefix("."), None);
        assert_eq!(float_prefix("abc"), None);
        assert_eq!(float_prefix("auto"), None);
    }

    #[test]
    fn split_keeps_unit_suffix() {
        assert_eq!(split_float_prefix("10rem"), Some((10.0, "rem")));
        assert_eq!(split_float_prefix(" 0.5"), Some((0.5, "")));
        assert_eq!(split_float_prefix("2.5vh "), Some((2.5, "vh ")));
    }
}
