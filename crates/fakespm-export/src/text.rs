//! Plain-text dump of heightmap samples.
//!
//! One line per image row, samples separated by a single space, each
//! written in C `%.18e` notation (`5.000000000000000000e-01`). This is
//! the layout `numpy.loadtxt` and most plotting tools read without any
//! options.
//!
//! This is a pure function with no I/O; it returns a `String`.

use fakespm_pipeline::Heightmap;

/// Serialize `image` as whitespace-delimited rows of samples.
///
/// Every row, including the last, ends with `\n`. An image with zero
/// rows produces an empty string.
///
/// # Examples
///
/// ```
/// use fakespm_pipeline::Heightmap;
///
/// let image = Heightmap::from_shape_vec((1, 2), vec![0.5, -2.0]).unwrap();
/// assert_eq!(
///     fakespm_export::to_text(&image),
///     "5.000000000000000000e-01 -2.000000000000000000e+00\n",
/// );
/// ```
#[must_use]
pub fn to_text(image: &Heightmap) -> String {
    let mut out = String::new();
    for row in image.rows() {
        for (i, &v) in row.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            push_sample(&mut out, v);
        }
        out.push('\n');
    }
    out
}

/// Append `v` in `%.18e` notation: two-digit minimum exponent with an
/// explicit sign.
fn push_sample(out: &mut String, v: f64) {
    if v.is_nan() {
        out.push_str("nan");
        return;
    }
    if v.is_infinite() {
        out.push_str(if v > 0.0 { "inf" } else { "-inf" });
        return;
    }

    // Rust renders `1.5e-3` style exponents; re-shape to `1.5e-03`.
    let formatted = format!("{v:.18e}");
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        out.push_str(&formatted);
        return;
    };
    let (sign, digits) = exponent
        .strip_prefix('-')
        .map_or(('+', exponent), |rest| ('-', rest));
    out.push_str(&format!("{mantissa}e{sign}{digits:0>2}"));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fmt(v: f64) -> String {
        let mut s = String::new();
        push_sample(&mut s, v);
        s
    }

    #[test]
    fn formats_like_printf() {
        assert_eq!(fmt(0.5), "5.000000000000000000e-01");
        assert_eq!(fmt(1.0), "1.000000000000000000e+00");
        assert_eq!(fmt(0.0), "0.000000000000000000e+00");
        assert_eq!(fmt(-0.25), "-2.500000000000000000e-01");
        assert_eq!(fmt(12_345.0), "1.234500000000000000e+04");
        assert_eq!(fmt(0.001_953_125), "1.953125000000000000e-03");
    }

    #[test]
    fn three_digit_exponents_are_not_padded() {
        assert_eq!(fmt(f64::MAX), "1.797693134862315708e+308");
        assert_eq!(fmt(-f64::MAX), "-1.797693134862315708e+308");
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(fmt(f64::NAN), "nan");
        assert_eq!(fmt(f64::INFINITY), "inf");
        assert_eq!(fmt(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn one_line_per_row() {
        let image = Heightmap::from_shape_fn((3, 4), |(r, c)| (r * 4 + c) as f64);
        let text = to_text(&image);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert_eq!(line.split(' ').count(), 4);
        }
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn values_parse_back() {
        let image = Heightmap::from_shape_fn((2, 3), |(r, c)| (r as f64).mul_add(0.1, c as f64) / 7.0);
        let text = to_text(&image);
        for (line, row) in text.lines().zip(image.rows()) {
            for (token, &expected) in line.split(' ').zip(row.iter()) {
                let parsed: f64 = token.parse().unwrap();
                assert!((parsed - expected).abs() < 1e-15);
            }
        }
    }

    #[test]
    fn empty_image_is_empty_string() {
        assert_eq!(to_text(&Heightmap::zeros((0, 5))), "");
    }
}
