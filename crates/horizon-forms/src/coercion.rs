//! Numeric coercion through a canonical decimal.
//!
//! A numeric widget is generic over its bound type. All arithmetic happens on
//! [`Decimal`]: the current value is converted in, stepped or clamped, and
//! converted back out. Integral targets round half-to-even; a result that does
//! not fit the target is a conversion failure and leaves the widget untouched.
//!
//! # Example
//!
//! ```
//! use horizon_forms::coercion::{step, NumericBounds, StepDirection, StepOutcome, StepSize};
//! use rust_decimal::Decimal;
//!
//! let bounds = NumericBounds::new(None, Some(Decimal::from(10))).unwrap();
//! assert_eq!(step(&9_i32, StepDirection::Up, StepSize::Any, &bounds), StepOutcome::Changed(10));
//! assert_eq!(step(&10_i32, StepDirection::Up, StepSize::Any, &bounds), StepOutcome::NoChange);
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

use horizon_forms_core::{Error, Result};

// ============================================================================
// Numeric Types
// ============================================================================

/// A type a numeric widget can bind to.
///
/// Implemented for `i32`, `u32`, `i64`, `u64`, `f32`, `f64`, [`Decimal`] and
/// `Option` of each. Binding any other type is a compile error.
pub trait NumericValue: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Short type name used in conversion errors.
    fn type_name() -> &'static str;

    /// The value as a decimal; `None` for an empty or non-finite value.
    fn to_decimal(&self) -> Option<Decimal>;

    /// Convert back from a decimal; `None` if the value does not fit.
    fn from_decimal(value: Decimal) -> Option<Self>;

    /// The value committed for an empty input, if the type has one.
    fn empty() -> Option<Self> {
        None
    }

    /// Whether this is the empty value of a nullable type.
    fn is_empty(&self) -> bool {
        false
    }

    /// Text shown in the input box.
    fn format(&self) -> String;
}

fn round_integral(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}

macro_rules! impl_integral {
    ($($ty:ty => $to:ident),* $(,)?) => {
        $(
            impl NumericValue for $ty {
                fn type_name() -> &'static str {
                    stringify!($ty)
                }

                fn to_decimal(&self) -> Option<Decimal> {
                    Some(Decimal::from(*self))
                }

                fn from_decimal(value: Decimal) -> Option<Self> {
                    round_integral(value).$to()
                }

                fn format(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_integral!(i32 => to_i32, u32 => to_u32, i64 => to_i64, u64 => to_u64);

// Floats cross into decimal through their shortest round-trip text, so a
// value typed as `0.1` stays `0.1` rather than its binary expansion.
macro_rules! impl_float {
    ($($ty:ty => $from:ident),* $(,)?) => {
        $(
            impl NumericValue for $ty {
                fn type_name() -> &'static str {
                    stringify!($ty)
                }

                fn to_decimal(&self) -> Option<Decimal> {
                    if !self.is_finite() {
                        return None;
                    }
                    Decimal::from_str(&self.to_string())
                        .ok()
                        .or_else(|| Decimal::$from(*self))
                }

                fn from_decimal(value: Decimal) -> Option<Self> {
                    <$ty>::from_str(&value.to_string())
                        .ok()
                        .filter(|v| v.is_finite())
                }

                fn format(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_float!(f32 => from_f32, f64 => from_f64);

impl NumericValue for Decimal {
    fn type_name() -> &'static str {
        "decimal"
    }

    fn to_decimal(&self) -> Option<Decimal> {
        Some(*self)
    }

    fn from_decimal(value: Decimal) -> Option<Self> {
        Some(value)
    }

    fn format(&self) -> String {
        self.to_string()
    }
}

impl<T: NumericValue> NumericValue for Option<T> {
    fn type_name() -> &'static str {
        T::type_name()
    }

    fn to_decimal(&self) -> Option<Decimal> {
        self.as_ref().and_then(T::to_decimal)
    }

    fn from_decimal(value: Decimal) -> Option<Self> {
        T::from_decimal(value).map(Some)
    }

    fn empty() -> Option<Self> {
        Some(None)
    }

    fn is_empty(&self) -> bool {
        self.is_none()
    }

    fn format(&self) -> String {
        self.as_ref().map(T::format).unwrap_or_default()
    }
}

// ============================================================================
// Step Size and Bounds
// ============================================================================

/// The increment applied by the up/down buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum StepSize {
    /// `"any"`: step by one.
    #[default]
    Any,
    /// A fixed decimal increment.
    Value(Decimal),
}

impl StepSize {
    /// The increment as a decimal.
    pub fn amount(self) -> Decimal {
        match self {
            Self::Any => Decimal::ONE,
            Self::Value(step) => step,
        }
    }
}

impl FromStr for StepSize {
    type Err = Error;

    /// Parse `"any"`, an empty string, or a decimal using `.` or `,`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("any") {
            return Ok(Self::Any);
        }
        Decimal::from_str(&trimmed.replace(',', "."))
            .map(Self::Value)
            .map_err(|_| Error::UnsupportedStep(s.to_owned()))
    }
}

impl TryFrom<String> for StepSize {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for StepSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Value(step) => write!(f, "{step}"),
        }
    }
}

/// Direction of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    /// Add the step.
    Up,
    /// Subtract the step.
    Down,
}

/// Optional inclusive bounds, validated so that `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumericBounds {
    min: Option<Decimal>,
    max: Option<Decimal>,
}

impl NumericBounds {
    /// No bounds.
    pub const UNBOUNDED: Self = Self {
        min: None,
        max: None,
    };

    /// Create bounds, rejecting `min > max`.
    pub fn new(min: Option<Decimal>, max: Option<Decimal>) -> Result<Self> {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(Error::InvalidBounds {
                    min: lo.to_string(),
                    max: hi.to_string(),
                });
            }
        }
        Ok(Self { min, max })
    }

    /// The lower bound.
    pub fn min(&self) -> Option<Decimal> {
        self.min
    }

    /// The upper bound.
    pub fn max(&self) -> Option<Decimal> {
        self.max
    }

    /// Whether `value` lies within the bounds.
    pub fn contains(&self, value: Decimal) -> bool {
        self.min.is_none_or(|lo| value >= lo) && self.max.is_none_or(|hi| value <= hi)
    }

    /// Clamp `value` into the bounds.
    pub fn clamp(&self, value: Decimal) -> Decimal {
        match (self.min, self.max) {
            (Some(lo), _) if value < lo => lo,
            (_, Some(hi)) if value > hi => hi,
            _ => value,
        }
    }
}

// ============================================================================
// Stepping
// ============================================================================

/// Result of [`step`].
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome<T> {
    /// The stepped value.
    Changed(T),
    /// Out of bounds, unchanged, or not representable in `T`.
    NoChange,
}

impl<T> StepOutcome<T> {
    /// The new value, if any.
    pub fn changed(self) -> Option<T> {
        match self {
            Self::Changed(value) => Some(value),
            Self::NoChange => None,
        }
    }
}

/// Step `current` by one increment.
///
/// An empty current value steps from zero. A present value with no decimal
/// form (NaN, infinities, floats beyond the decimal range) never steps.
pub fn step<T: NumericValue>(
    current: &T,
    direction: StepDirection,
    size: StepSize,
    bounds: &NumericBounds,
) -> StepOutcome<T> {
    let before = current.to_decimal();
    let base = match before {
        Some(value) => value,
        None if current.is_empty() => Decimal::ZERO,
        None => return StepOutcome::NoChange,
    };
    let next = match direction {
        StepDirection::Up => base.checked_add(size.amount()),
        StepDirection::Down => base.checked_sub(size.amount()),
    };
    let Some(next) = next else {
        return StepOutcome::NoChange;
    };

    if !bounds.contains(next) || before == Some(next) {
        return StepOutcome::NoChange;
    }

    match T::from_decimal(next) {
        Some(value) if value != *current => StepOutcome::Changed(value),
        _ => StepOutcome::NoChange,
    }
}

// ============================================================================
// Text Input
// ============================================================================

/// Decimal and group separators used to read and display numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NumberFormat {
    /// Separates the integral and fractional parts.
    pub decimal_separator: char,
    /// Separates digit groups; ignored when parsing.
    pub group_separator: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::INVARIANT
    }
}

impl NumberFormat {
    /// `.` decimal and `,` group separators.
    pub const INVARIANT: Self = Self {
        decimal_separator: '.',
        group_separator: ',',
    };

    /// Create a format with the given separators.
    pub fn new(decimal_separator: char, group_separator: char) -> Self {
        Self {
            decimal_separator,
            group_separator,
        }
    }

    /// Render a number rendered with `.` in this format.
    pub fn localize(&self, text: &str) -> String {
        if self.decimal_separator == '.' {
            return text.to_owned();
        }
        text.replace('.', &self.decimal_separator.to_string())
    }

    /// Parse sanitised text; `None` if it is not a number.
    pub fn parse(&self, text: &str) -> Option<Decimal> {
        let normalized: String = text
            .chars()
            .filter(|&c| c != self.group_separator)
            .map(|c| if c == self.decimal_separator { '.' } else { c })
            .collect();
        Decimal::from_str(&normalized).ok()
    }
}

// ============================================================================
// Display Format
// ============================================================================

/// A display pattern for numbers.
///
/// Accepted forms:
/// - standard: `N2` (grouped, two decimals), `F0` (fixed, no decimals);
///   the digit count defaults to 2
/// - custom: `#,##0.0#` where `0` is a required digit, `#` an optional one
///   and a `,` in the integral part turns on grouping; text before the first
///   or after the last digit placeholder is kept as a literal (`$#,##0.00`)
/// - composite: either of the above wrapped as `{0:...}`, with literal text
///   around the braces (`{0:N1} km/h`)
///
/// Values are rounded half away from zero.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct DisplayFormat {
    prefix: String,
    suffix: String,
    grouping: bool,
    min_fraction: u32,
    max_fraction: Option<u32>,
}

impl DisplayFormat {
    /// Shortest decimal text, no grouping.
    pub const GENERAL: Self = Self {
        prefix: String::new(),
        suffix: String::new(),
        grouping: false,
        min_fraction: 0,
        max_fraction: None,
    };

    /// Format `value` with the separators of `separators`.
    pub fn format_decimal(&self, value: Decimal, separators: &NumberFormat) -> String {
        let rounded = match self.max_fraction {
            Some(dp) => value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
            None => value,
        };
        let text = rounded.abs().normalize().to_string();
        let (integral, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

        let mut out = String::with_capacity(text.len() + self.prefix.len() + self.suffix.len() + 4);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            out.push('-');
        }
        out.push_str(&self.prefix);
        let digits = integral.len();
        for (i, c) in integral.chars().enumerate() {
            if self.grouping && i > 0 && (digits - i) % 3 == 0 {
                out.push(separators.group_separator);
            }
            out.push(c);
        }
        let padding = (self.min_fraction as usize).saturating_sub(fraction.len());
        if !fraction.is_empty() || padding > 0 {
            out.push(separators.decimal_separator);
            out.push_str(fraction);
            out.extend(std::iter::repeat_n('0', padding));
        }
        out.push_str(&self.suffix);
        out
    }

    /// Format a float; values with no decimal form fall back to their
    /// default text.
    pub fn format_f64(&self, value: f64, separators: &NumberFormat) -> String {
        match value.to_decimal() {
            Some(decimal) => self.format_decimal(decimal, separators),
            None => value.to_string(),
        }
    }

    fn parse_pattern(pattern: &str) -> Option<Self> {
        if pattern.is_empty() {
            return Some(Self::GENERAL);
        }
        if let Some(format) = Self::parse_standard(pattern) {
            return Some(format);
        }

        let first = pattern.find(['0', '#'])?;
        let last = pattern.rfind(['0', '#'])?;
        let core = &pattern[first..=last];
        if !core.chars().all(|c| matches!(c, '0' | '#' | ',' | '.')) || core.matches('.').count() > 1 {
            return None;
        }
        let (integral, fraction) = core.split_once('.').unwrap_or((core, ""));
        let min_fraction = fraction.chars().filter(|&c| c == '0').count() as u32;
        let max_fraction = fraction.chars().filter(|&c| c != ',').count() as u32;
        Some(Self {
            prefix: pattern[..first].to_owned(),
            suffix: pattern[last + 1..].to_owned(),
            grouping: integral.contains(','),
            min_fraction,
            max_fraction: Some(max_fraction),
        })
    }

    fn parse_standard(pattern: &str) -> Option<Self> {
        let mut chars = pattern.chars();
        let grouping = match chars.next()? {
            'N' | 'n' => true,
            'F' | 'f' => false,
            _ => return None,
        };
        let digits = chars.as_str();
        let decimals = if digits.is_empty() {
            2
        } else if digits.chars().all(|c| c.is_ascii_digit()) {
            digits.parse::<u32>().ok().filter(|&d| d <= 28)?
        } else {
            return None;
        };
        Some(Self {
            grouping,
            min_fraction: decimals,
            max_fraction: Some(decimals),
            ..Self::GENERAL
        })
    }
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self::GENERAL
    }
}

impl FromStr for DisplayFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidFormat(s.to_owned());
        let (before, pattern, after) = match (s.find("{0"), s.rfind('}')) {
            (Some(open), Some(close)) if close > open => {
                let inner = &s[open + 2..close];
                let pattern = match inner.strip_prefix(':') {
                    Some(pattern) => pattern,
                    None if inner.is_empty() => "",
                    None => return Err(invalid()),
                };
                (&s[..open], pattern, &s[close + 1..])
            }
            _ => ("", s, ""),
        };

        let mut format = Self::parse_pattern(pattern).ok_or_else(invalid)?;
        format.prefix.insert_str(0, before);
        format.suffix.push_str(after);
        Ok(format)
    }
}

impl TryFrom<String> for DisplayFormat {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// ASCII punctuation that is not kept by [`sanitize`]: these are symbols,
/// not punctuation.
const SYMBOLS: &[char] = &['+', '<', '=', '>', '|', '~', '$', '^', '`'];

/// Keep only digits, punctuation and the format's separators.
pub fn sanitize(raw: &str, format: &NumberFormat) -> String {
    raw.chars()
        .filter(|&c| {
            c.is_ascii_digit()
                || c == format.decimal_separator
                || c == format.group_separator
                || (c.is_ascii_punctuation() && !SYMBOLS.contains(&c))
        })
        .collect()
}

/// Turn raw input text into a bound value.
///
/// Empty input yields the type's empty value (nullable types only). Parsed
/// input is clamped to `bounds` before conversion.
pub fn coerce_input<T: NumericValue>(
    raw: &str,
    format: &NumberFormat,
    bounds: &NumericBounds,
) -> Result<T> {
    let cleaned = sanitize(raw, format);
    if cleaned.is_empty() {
        return T::empty().ok_or_else(|| Error::conversion(raw, T::type_name()));
    }

    let parsed = format
        .parse(&cleaned)
        .ok_or_else(|| Error::conversion(cleaned.clone(), T::type_name()))?;
    let clamped = bounds.clamp(parsed);
    if clamped != parsed {
        tracing::trace!(target: "horizon_forms::numeric", %parsed, %clamped, "input clamped");
    }
    T::from_decimal(clamped).ok_or_else(|| Error::conversion(cleaned, T::type_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn bounds(min: Option<&str>, max: Option<&str>) -> NumericBounds {
        NumericBounds::new(min.map(dec), max.map(dec)).unwrap()
    }

    #[test]
    fn test_step_size_parsing() {
        assert_eq!("any".parse::<StepSize>().unwrap(), StepSize::Any);
        assert_eq!("".parse::<StepSize>().unwrap(), StepSize::Any);
        assert_eq!("0,5".parse::<StepSize>().unwrap(), StepSize::Value(dec("0.5")));
        assert_eq!(
            "fast".parse::<StepSize>(),
            Err(Error::UnsupportedStep("fast".into()))
        );
        assert_eq!(StepSize::Any.amount(), Decimal::ONE);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        assert!(matches!(
            NumericBounds::new(Some(dec("5")), Some(dec("1"))),
            Err(Error::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_step_stops_at_bounds() {
        let b = bounds(Some("0"), Some("10"));
        assert_eq!(step(&10, StepDirection::Up, StepSize::Any, &b), StepOutcome::NoChange);
        assert_eq!(step(&0u32, StepDirection::Down, StepSize::Any, &b), StepOutcome::NoChange);
        assert_eq!(step(&9, StepDirection::Up, StepSize::Any, &b), StepOutcome::Changed(10));
    }

    #[test]
    fn test_step_from_empty_starts_at_zero() {
        let outcome = step(&None::<i64>, StepDirection::Up, StepSize::Value(dec("5")), &NumericBounds::UNBOUNDED);
        assert_eq!(outcome, StepOutcome::Changed(Some(5)));
    }

    #[test]
    fn test_fractional_step_on_integer_rounds_half_even() {
        let half = StepSize::Value(dec("0.5"));
        // 0 + 0.5 rounds to 0: unchanged.
        assert_eq!(step(&0, StepDirection::Up, half, &NumericBounds::UNBOUNDED), StepOutcome::NoChange);
        // 1 + 0.5 = 1.5 rounds to 2.
        assert_eq!(step(&1, StepDirection::Up, half, &NumericBounds::UNBOUNDED), StepOutcome::Changed(2));
    }

    #[test]
    fn test_float_step_is_exact_in_decimal() {
        let tenth = StepSize::Value(dec("0.1"));
        let outcome = step(&0.2_f64, StepDirection::Up, tenth, &NumericBounds::UNBOUNDED);
        assert_eq!(outcome, StepOutcome::Changed(0.3));
    }

    #[test]
    fn test_unsigned_overflow_is_no_change() {
        assert_eq!(
            step(&0u32, StepDirection::Down, StepSize::Any, &NumericBounds::UNBOUNDED),
            StepOutcome::NoChange
        );
    }

    #[test]
    fn test_float_outside_decimal_range_never_steps() {
        let unbounded = NumericBounds::UNBOUNDED;
        for current in [1e30_f64, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(
                step(&current, StepDirection::Up, StepSize::Any, &unbounded),
                StepOutcome::NoChange
            );
        }
        assert_eq!(
            step(&Some(1e30_f32), StepDirection::Down, StepSize::Any, &unbounded),
            StepOutcome::NoChange
        );
        assert!(None::<f64>.is_empty());
        assert!(!f64::NAN.is_empty());
    }

    #[test]
    fn test_display_format_patterns() {
        let invariant = NumberFormat::INVARIANT;
        let show = |pattern: &str, value: &str| {
            pattern
                .parse::<DisplayFormat>()
                .unwrap()
                .format_decimal(dec(value), &invariant)
        };

        assert_eq!(show("N2", "1234567.891"), "1,234,567.89");
        assert_eq!(show("F0", "2.5"), "3");
        assert_eq!(show("F0", "-2.5"), "-3");
        assert_eq!(show("n", "0.5"), "0.50");
        assert_eq!(show("0.0#", "2"), "2.0");
        assert_eq!(show("0.0#", "1.456"), "1.46");
        assert_eq!(show("#,##0", "-9876.4"), "-9,876");
        assert_eq!(show("$#,##0.00", "1500"), "$1,500.00");
        assert_eq!(show("{0:N1} km/h", "88.25"), "88.3 km/h");
        assert_eq!(show("{0}%", "12.50"), "12.5%");
        assert_eq!(show("", "-0.0001"), "-0.0001");
        assert_eq!(show("F1", "-0.01"), "0.0");
    }

    #[test]
    fn test_display_format_localized_and_rejected() {
        let german = NumberFormat::new(',', '.');
        let format: DisplayFormat = "N2".parse().unwrap();
        assert_eq!(format.format_decimal(dec("1234.5"), &german), "1.234,50");
        assert_eq!(format.format_f64(f64::NAN, &german), "NaN");

        assert_eq!(
            "0.0.0".parse::<DisplayFormat>(),
            Err(Error::InvalidFormat("0.0.0".into()))
        );
        assert!("{1:N2}".parse::<DisplayFormat>().is_err());
        assert!("C2".parse::<DisplayFormat>().is_err());
    }

    #[test]
    fn test_sanitize_keeps_digits_and_punctuation() {
        let f = NumberFormat::default();
        assert_eq!(sanitize("$ 1,234.50 USD", &f), "1,234.50");
        assert_eq!(sanitize("-12", &f), "-12");
        assert_eq!(sanitize("+12", &f), "12");
    }

    #[test]
    fn test_coerce_clamps_to_bounds() {
        let b = bounds(Some("1"), Some("100"));
        let f = NumberFormat::default();
        assert_eq!(coerce_input::<i32>("250", &f, &b), Ok(100));
        assert_eq!(coerce_input::<i32>("-3", &f, &b), Ok(1));
        assert_eq!(coerce_input::<i32>("1,000", &f, &NumericBounds::UNBOUNDED), Ok(1000));
    }

    #[test]
    fn test_coerce_with_comma_decimal_format() {
        let f = NumberFormat::new(',', '.');
        let parsed = coerce_input::<Decimal>("1.234,5", &f, &NumericBounds::UNBOUNDED);
        assert_eq!(parsed, Ok(dec("1234.5")));
        assert_eq!(f.localize("2.5"), "2,5");
    }

    #[test]
    fn test_coerce_failures() {
        let f = NumberFormat::default();
        assert!(matches!(
            coerce_input::<i32>("abc", &f, &NumericBounds::UNBOUNDED),
            Err(Error::Conversion { .. })
        ));
        assert!(matches!(
            coerce_input::<i32>("1.2.3", &f, &NumericBounds::UNBOUNDED),
            Err(Error::Conversion { .. })
        ));
        assert!(matches!(
            coerce_input::<u32>("-5", &f, &NumericBounds::UNBOUNDED),
            Err(Error::Conversion { .. })
        ));
    }

    #[test]
    fn test_empty_input_only_for_nullable() {
        let f = NumberFormat::default();
        assert_eq!(coerce_input::<Option<f64>>("", &f, &NumericBounds::UNBOUNDED), Ok(None));
        assert!(coerce_input::<f64>("", &f, &NumericBounds::UNBOUNDED).is_err());
    }

    #[test]
    fn test_format() {
        assert_eq!(None::<i32>.format(), "");
        assert_eq!(Some(7u64).format(), "7");
        assert_eq!(2.5_f32.format(), "2.5");
    }

    fn assert_inverse<T: NumericValue>(value: T, size: StepSize) {
        let b = NumericBounds::UNBOUNDED;
        let up = step(&value, StepDirection::Up, size, &b)
            .changed()
            .expect("step up");
        let back = step(&up, StepDirection::Down, size, &b)
            .changed()
            .expect("step down");
        assert_eq!(back, value);
    }

    proptest! {
        #[test]
        fn prop_i32_step_inverse(v in -1_000_000i32..1_000_000, s in 1i64..1000) {
            assert_inverse(v, StepSize::Value(Decimal::from(s)));
        }

        #[test]
        fn prop_u32_step_inverse(v in 0u32..1_000_000, s in 1i64..1000) {
            assert_inverse(v, StepSize::Value(Decimal::from(s)));
        }

        #[test]
        fn prop_i64_step_inverse(v in -1_000_000_000i64..1_000_000_000, s in 1i64..1000) {
            assert_inverse(v, StepSize::Value(Decimal::from(s)));
        }

        #[test]
        fn prop_u64_step_inverse(v in 0u64..1_000_000_000, s in 1i64..1000) {
            assert_inverse(v, StepSize::Value(Decimal::from(s)));
        }

        #[test]
        fn prop_f64_step_inverse(cents in -100_000i64..100_000, s in 1i64..100) {
            let value = cents as f64 / 100.0;
            assert_inverse(value, StepSize::Value(Decimal::new(s, 1)));
        }

        #[test]
        fn prop_f32_step_inverse(units in -10_000i32..10_000) {
            assert_inverse(units as f32 / 4.0, StepSize::Value(dec("0.25")));
        }

        #[test]
        fn prop_decimal_step_inverse(mantissa in -1_000_000i64..1_000_000, scale in 0u32..4) {
            assert_inverse(Decimal::new(mantissa, scale), StepSize::Value(dec("0.01")));
        }

        #[test]
        fn prop_nullable_step_inverse(v in -1000i32..1000) {
            assert_inverse(Some(v), StepSize::Any);
        }

        #[test]
        fn prop_coerced_input_is_within_bounds(v in -10_000i64..10_000) {
            let b = bounds(Some("-100"), Some("100"));
            let coerced: i64 = coerce_input(&v.to_string(), &NumberFormat::default(), &b).unwrap();
            prop_assert!((-100..=100).contains(&coerced));
        }
    }
}
