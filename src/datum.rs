//! Unit-aware numeric literals used by experiment files
//!
//! A datum is `(sign)(whole).(fraction)e(exponent)(unit)`, where every part
//! is optional:
//!
//! ```text
//! 1   -1   +1.0   -1.000e0   1m   1 m   -1e000cm   1.000 mm   .5ms
//! ```
//!
//! A datum that starts with letters is a named constant (`e`, `pm`, `nm`,
//! `em`, `na`, case-insensitive). The unit may carry one SI prefix.

use particle_physics::{ELECTRON_MASS, ELEMENTARY_CHARGE, NEUTRON_MASS, PROTON_MASS};

/// A parsed value and the index of the unit it was given in.
///
/// Unit 0 is the caller's default; an unknown unit falls back to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datum {
    pub value: f64,
    pub unit: usize,
}

fn si_prefix(prefix: char) -> Option<f64> {
    Some(match prefix {
        'P' => 1e15,
        'T' => 1e12,
        'G' => 1e9,
        'M' => 1e6,
        'k' => 1e3,
        'h' => 1e2,
        'd' => 1e-1,
        'c' => 1e-2,
        'm' => 1e-3,
        'u' => 1e-6,
        'n' => 1e-9,
        'p' => 1e-12,
        'f' => 1e-15,
        _ => return None,
    })
}

/// Named constants. Masses are in grams, the default mass unit.
fn constant(name: &str) -> Option<f64> {
    Some(match name {
        "e" => ELEMENTARY_CHARGE,
        "pm" => PROTON_MASS * 1e3,
        "nm" => NEUTRON_MASS * 1e3,
        "em" => ELECTRON_MASS * 1e3,
        "na" => 0.0,
        _ => return None,
    })
}

/// Parse one datum; `units[0]` is the default unit.
///
/// Malformed parts never fail the parse: they are logged and read as zero or
/// as the default unit.
pub fn parse_datum(text: &str, units: &[&str]) -> Datum {
    let text = text.trim();
    let (negative, rest) = match text.chars().next() {
        Some('-') => (true, &text[1..]),
        Some('+') => (false, &text[1..]),
        _ => (false, text),
    };
    let sign = if negative { -1.0 } else { 1.0 };

    if rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
        let name: String = rest
            .chars()
            .take_while(char::is_ascii_alphabetic)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let value = constant(&name).unwrap_or_else(|| {
            log::info!("unknown constant \"{name}\" used, assuming a value of 0");
            0.0
        });
        return Datum {
            value: sign * value,
            unit: 0,
        };
    }

    let (number, unit_text) = split_number(rest);
    let value = if number.is_empty() || number == "." {
        0.0
    } else {
        number.parse::<f64>().unwrap_or_else(|_| {
            log::info!("malformed number \"{number}\", assuming a value of 0");
            0.0
        })
    };

    let unit_text = unit_text.split_whitespace().next().unwrap_or("");
    let (unit, scale) = resolve_unit(unit_text, units);
    Datum {
        value: sign * value * scale,
        unit,
    }
}

/// Split `text` into its numeric literal and whatever follows it.
///
/// An `e` only starts an exponent when a digit or a sign follows; otherwise
/// it is the start of a unit (as in `1e`, one elementary charge).
fn split_number(text: &str) -> (&str, &str) {
    let bytes = text.as_bytes();
    let mut end = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end < bytes.len() && bytes[end] == b'e' {
        let mut exp = end + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        let digits_start = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > digits_start {
            end = exp;
        }
    }
    (&text[..end], text[end..].trim_start())
}

/// Match `text` against the permitted units by suffix, honouring one SI
/// prefix. Returns the unit index and the prefix multiplier.
fn resolve_unit(text: &str, units: &[&str]) -> (usize, f64) {
    if text.is_empty() {
        return (0, 1.0);
    }
    for (index, unit) in units.iter().enumerate() {
        let Some(prefix) = text.strip_suffix(unit) else {
            continue;
        };
        let mut chars = prefix.chars();
        let scale = match (chars.next(), chars.next()) {
            (None, _) => Some(1.0),
            (Some(p), None) => si_prefix(p),
            _ => None,
        };
        return match scale {
            Some(scale) => (index, scale),
            None => {
                log::info!("improper metric multiplier in \"{text}\", ignoring it but keeping the unit");
                (index, 1.0)
            }
        };
    }
    log::info!(
        "improper unit used in \"{text}\", using the default unit \"{}\" instead",
        units.first().copied().unwrap_or("")
    );
    (0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LENGTH: &[&str] = &["m"];
    const CHARGE: &[&str] = &["C", "e"];
    const MASS: &[&str] = &["g", "u"];

    fn value(text: &str, units: &[&str]) -> f64 {
        parse_datum(text, units).value
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs())
    }

    #[test]
    fn test_plain_numbers() {
        assert_eq!(value("1", LENGTH), 1.0);
        assert_eq!(value("-1", LENGTH), -1.0);
        assert_eq!(value("+1.0", LENGTH), 1.0);
        assert_eq!(value(".5", LENGTH), 0.5);
        assert_eq!(value("-1.000e0", LENGTH), -1.0);
        assert_eq!(value("2.5e3", LENGTH), 2500.0);
        assert_eq!(value("", LENGTH), 0.0);
    }

    #[test]
    fn test_units_and_prefixes() {
        assert_eq!(parse_datum("1m", LENGTH), Datum { value: 1.0, unit: 0 });
        assert_eq!(value("1 m", LENGTH), 1.0);
        assert!(close(value("-1e000cm", LENGTH), -0.01));
        assert!(close(value("1.000 mm", LENGTH), 1e-3));
        assert!(close(value("2km", LENGTH), 2000.0));
        assert!(close(value("1ms", &["s"]), 1e-3));
    }

    #[test]
    fn test_e_after_number_is_a_unit() {
        let datum = parse_datum("+1e", CHARGE);
        assert_eq!(datum, Datum { value: 1.0, unit: 1 });
        let datum = parse_datum("-2 e", CHARGE);
        assert_eq!(datum, Datum { value: -2.0, unit: 1 });
        assert_eq!(parse_datum("3e-1C", CHARGE).unit, 0);
        assert!(close(value("3e-1C", CHARGE), 0.3));
    }

    #[test]
    fn test_named_constants() {
        assert_eq!(value("e", CHARGE), ELEMENTARY_CHARGE);
        assert_eq!(value("-E", CHARGE), -ELEMENTARY_CHARGE);
        assert!(close(value("pm", MASS), PROTON_MASS * 1e3));
        assert!(close(value("EM", MASS), ELECTRON_MASS * 1e3));
        assert_eq!(value("na", MASS), 0.0);
        assert_eq!(value("xyz", MASS), 0.0);
    }

    #[test]
    fn test_unknown_unit_falls_back_to_default() {
        assert_eq!(parse_datum("4 furlongs", LENGTH), Datum { value: 4.0, unit: 0 });
        assert_eq!(parse_datum("12u", MASS), Datum { value: 12.0, unit: 1 });
    }

    #[test]
    fn test_bad_prefix_keeps_unit() {
        assert_eq!(parse_datum("3 xxg", MASS), Datum { value: 3.0, unit: 0 });
        assert_eq!(parse_datum("3 qu", MASS), Datum { value: 3.0, unit: 1 });
    }

    #[test]
    fn test_resolve_unit_scales() {
        assert_eq!(resolve_unit("", MASS), (0, 1.0));
        assert_eq!(resolve_unit("g", MASS), (0, 1.0));
        assert_eq!(resolve_unit("kg", MASS), (0, 1e3));
        assert_eq!(resolve_unit("Mu", MASS), (1, 1e6));
        assert_eq!(resolve_unit("xg", MASS), (0, 1.0));
        assert_eq!(resolve_unit("kkg", MASS), (0, 1.0));
    }
}
