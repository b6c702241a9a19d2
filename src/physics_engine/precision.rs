//! Decimal rounding for reported values.
//!
//! Audit records are compared against historical rows that were rounded in
//! decimal, half-up, starting from the shortest decimal form of the double.
//! Rounding the binary value directly (`(x * 100.0).round() / 100.0`) gives
//! different answers for inputs like `1.005`, so the rounding is done on the
//! digit string instead.

/// Round `value` half-up (away from zero on a tie) to `places` decimals.
///
/// Non-finite values pass through unchanged.
pub fn round_half_up(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }

    // Display for f64 is the shortest round-trip repr and never uses exponents
    let repr = format!("{}", value.abs());
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    if frac_part.len() <= places {
        return value;
    }

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(places))
        .map(|b| b - b'0')
        .collect();
    let mut int_len = int_part.len();

    if frac_part.as_bytes()[places] >= b'5' {
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == 9 {
                *d = 0;
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, 1);
            int_len += 1;
        }
    }

    let mut text = String::with_capacity(digits.len() + 1);
    for (i, d) in digits.iter().enumerate() {
        if i == int_len {
            text.push('.');
        }
        text.push(char::from(b'0' + d));
    }

    let magnitude = text.parse::<f64>().unwrap_or_else(|_| value.abs());
    if magnitude == 0.0 {
        0.0
    } else {
        magnitude.copysign(value)
    }
}

/// Round to the nearest whole number, ties away from zero, as an unsigned count.
pub fn round_to_count(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    // Saturating float-to-int cast
    value.round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tie_rounds_up_on_decimal_digits() {
        // 1.005 is stored as 1.00499999..., but its shortest repr is "1.005"
        assert_eq!(round_half_up(1.005, 2), 1.01);
        assert_eq!(round_half_up(2.5, 0), 3.0);
        assert_eq!(round_half_up(0.125, 2), 0.13);
    }

    #[test]
    fn test_carry_propagates_into_integer_part() {
        assert_eq!(round_half_up(9.9996, 3), 10.0);
        assert_eq!(round_half_up(99.5, 0), 100.0);
    }

    #[test]
    fn test_short_values_unchanged() {
        assert_eq!(round_half_up(72.0, 2), 72.0);
        assert_eq!(round_half_up(1.5, 3), 1.5);
    }

    #[test]
    fn test_negative_and_tiny() {
        assert_eq!(round_half_up(-1.005, 2), -1.01);
        assert_eq!(round_half_up(-0.0001, 2), 0.0);
        assert_eq!(round_half_up(1.234_567_890_12e-7, 10), 0.000_000_123_5);
    }

    #[test]
    fn test_non_finite_passthrough() {
        assert!(round_half_up(f64::NAN, 2).is_nan());
        assert_eq!(round_half_up(f64::INFINITY, 2), f64::INFINITY);
    }

    #[test]
    fn test_round_to_count() {
        assert_eq!(round_to_count(2.5), 3);
        assert_eq!(round_to_count(1e9), 1_000_000_000);
        assert_eq!(round_to_count(-4.0), 0);
    }
}
