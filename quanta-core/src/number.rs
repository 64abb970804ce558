//! Numeric helpers shared by arithmetic and rendering
//!
//! Magnitudes are plain `f64`. Two magnitudes are compared with a relative
//! tolerance; the absolute tolerance only applies against zero.

/// Relative tolerance for magnitude equality
pub const REL_TOL: f64 = 1e-9;

/// Absolute tolerance for comparisons against zero
pub const ABS_TOL: f64 = 1e-12;

/// Largest number of significant digits an `f64` can carry
pub const MAX_SIGNIFICANT_DIGITS: u8 = 17;

/// Tolerance under which a rendered value counts as an integer
const INTEGER_TOL: f64 = 1e-9;

/// `|a - b| <= REL_TOL * max(|a|, |b|)`
///
/// Purely relative, so `1e-13` and `9e-13` are distinct. Use [`is_zero`]
/// for the comparison against zero.
pub fn is_close(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    let diff = (a - b).abs();
    diff <= REL_TOL * a.abs().max(b.abs())
}

/// `|value| <= ABS_TOL`
pub fn is_zero(value: f64) -> bool {
    value.abs() <= ABS_TOL
}

/// Round to `ndigits` decimal places; negative rounds to tens, hundreds...
pub fn round_to(value: f64, ndigits: i32) -> f64 {
    if ndigits < 0 {
        let scale = 10f64.powi(-ndigits);
        return (value / scale).round() * scale;
    }
    let scale = 10f64.powi(ndigits);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}

/// Render a magnitude with `sigfigs` significant digits.
///
/// Integers render without a decimal point. Anything else renders with
/// `sigfigs` significant digits unless that would need an exponent marker,
/// in which case a fixed-point rendering is used. A fixed-point candidate
/// with `min(2, sigfigs)` decimals always competes and the longer of the two
/// strings wins.
pub fn format_significant(value: f64, sigfigs: u8) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let sigfigs = sigfigs.clamp(1, MAX_SIGNIFICANT_DIGITS) as i32;

    let rounded = value.round();
    if (value - rounded).abs() <= INTEGER_TOL * value.abs() {
        if rounded == 0.0 {
            return "0".to_string();
        }
        return format!("{:.0}", rounded);
    }

    let exp = decimal_exponent(value, sigfigs);
    let min_decimals = sigfigs.min(2);

    // Scientific notation kicks in outside [-4, sigfigs)
    let general = if exp < -4 || exp >= sigfigs {
        None
    } else {
        let decimals = (sigfigs - 1 - exp).max(0) as usize;
        Some(trim_fraction(format!("{:.prec$}", value, prec = decimals)))
    };

    let fixed_decimals = match general {
        Some(_) => min_decimals,
        None => min_decimals.max(sigfigs - 1 - exp),
    }
    .max(0) as usize;
    let fixed = format!("{:.prec$}", value, prec = fixed_decimals);

    match general {
        Some(general) if general.len() >= fixed.len() => general,
        _ => fixed,
    }
}

/// Base-10 exponent of `value` once rounded to `sigfigs` digits.
fn decimal_exponent(value: f64, sigfigs: i32) -> i32 {
    let sci = format!("{:.prec$e}", value, prec = (sigfigs - 1) as usize);
    sci.rsplit('e')
        .next()
        .and_then(|e| e.parse::<i32>().ok())
        .unwrap_or(0)
}

/// Strip trailing zeros (and a dangling point) from a fixed-point string
fn trim_fraction(s: String) -> String {
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}
