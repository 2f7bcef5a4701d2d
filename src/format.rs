use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Display settings for chaos-denominated values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueFormat {
    /// Decimal places, rounded half away from zero.
    pub decimals: u32,
    /// Insert `,` thousands separators.
    pub grouping: bool,
}

impl Default for ValueFormat {
    fn default() -> Self {
        Self {
            decimals: 2,
            grouping: true,
        }
    }
}

/// Render a value for display. Trailing zeros are dropped; non-finite input renders as "0".
pub fn format_value(value: f64, format: ValueFormat) -> String {
    let Some(decimal) = Decimal::from_f64(value) else {
        return "0".to_string();
    };
    let rounded = decimal
        .round_dp_with_strategy(format.decimals, RoundingStrategy::MidpointAwayFromZero)
        .normalize();

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().to_string();
    let digits = if format.grouping {
        group_thousands(&digits)
    } else {
        digits
    };

    if negative {
        format!("-{digits}")
    } else {
        digits
    }
}

fn group_thousands(number: &str) -> String {
    let (int_part, frac_part) = match number.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (number, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{grouped}.{frac}"),
        None => grouped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_and_groups() {
        assert_eq!(format_value(1234567.456, ValueFormat::default()), "1,234,567.46");
        assert_eq!(format_value(1000.0, ValueFormat::default()), "1,000");
        assert_eq!(format_value(999.5, ValueFormat::default()), "999.5");
        assert_eq!(format_value(0.125, ValueFormat::default()), "0.13");
    }

    #[test]
    fn grouping_can_be_disabled() {
        let format = ValueFormat {
            decimals: 0,
            grouping: false,
        };
        assert_eq!(format_value(1234567.5, format), "1234568");
    }

    #[test]
    fn negative_and_non_finite_values() {
        assert_eq!(format_value(-1234.5, ValueFormat::default()), "-1,234.5");
        assert_eq!(format_value(f64::NAN, ValueFormat::default()), "0");
        assert_eq!(format_value(-0.001, ValueFormat::default()), "0");
    }
}
