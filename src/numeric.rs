//! Culture-invariant numeric text codec.
//!
//! Integers are `i32`, reals are `f32`. Reals are written in their shortest
//! round-trip form with `.` as the decimal separator.

/// Parses `<integer>` text. Surrounding whitespace is ignored.
pub fn parse_integer(text: &str) -> Option<i32> {
    atoi_simd::parse::<i32, false, false>(text.trim().as_bytes()).ok()
}

/// Parses `<real>` text. Surrounding whitespace is ignored; `inf` and `nan`
/// are accepted.
pub fn parse_real(text: &str) -> Option<f32> {
    fast_float2::parse::<f32, _>(text.trim()).ok()
}

pub fn format_integer(value: i32) -> String {
    itoa::Buffer::new().format(value).to_owned()
}

pub fn format_real(value: f32) -> String {
    ryu::Buffer::new().format(value).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers() {
        assert_eq!(parse_integer("696969"), Some(696969));
        assert_eq!(parse_integer(" -42\n"), Some(-42));
        assert_eq!(parse_integer("12a"), None);
        assert_eq!(parse_integer(""), None);
        assert_eq!(format_integer(i32::MIN), "-2147483648");
        assert_eq!(parse_integer("2147483647"), Some(i32::MAX));
        assert_eq!(parse_integer("-2147483648"), Some(i32::MIN));
        assert_eq!(parse_integer("2147483648"), None);
        assert_eq!(parse_integer("0"), Some(0));
    }

    #[test]
    fn reals_use_invariant_format() {
        assert_eq!(format_real(1.5), "1.5");
        assert_eq!(parse_real("1.5"), Some(1.5));
        assert_eq!(parse_real("-0.25"), Some(-0.25));
        assert_eq!(parse_real("1,5"), None);
        for v in [0.1_f32, 3.4028235e38, -1.0e-20, 123456.79] {
            assert_eq!(parse_real(&format_real(v)), Some(v));
        }
    }
}
