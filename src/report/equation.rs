//! One-line equation records written to the per-core output files.
//!
//! ```text
//! 0 <=x< 60; y= 40.0 + 0.06667x;  least squares
//! 0 <=x< 30; y_0= 40.0000 + 0.0667x; interpolation
//! ```

use crate::domain::{FitRecord, InterpolationRecord};

/// Fractional digits printed for interpolation coefficients.
pub const INTERPOLATION_DECIMALS: usize = 4;

pub fn format_fit_record(rec: &FitRecord) -> String {
    format!(
        "{} <=x< {}; y= {} + {}x;  least squares",
        fmt_time(rec.start),
        fmt_time(rec.end),
        fmt_coeff(rec.intercept),
        fmt_coeff(rec.slope),
    )
}

pub fn format_interpolation_record(rec: &InterpolationRecord) -> String {
    format!(
        "{} <=x< {}; y_{}= {:.prec$} + {:.prec$}x; interpolation",
        fmt_time(rec.start),
        fmt_time(rec.end),
        rec.segment,
        positive_zero(rec.intercept),
        positive_zero(rec.slope),
        prec = INTERPOLATION_DECIMALS,
    )
}

/// Time offsets: integral values without a fractional part.
pub fn fmt_time(v: f64) -> String {
    let v = positive_zero(v);
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Coefficients: shortest round-trip form, with at least one fractional digit.
pub fn fmt_coeff(v: f64) -> String {
    let v = positive_zero(v);
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

fn positive_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CoreId, FitQuality};

    #[test]
    fn least_squares_line() {
        let rec = FitRecord {
            core: CoreId(0),
            start: 0.0,
            end: 60.0,
            intercept: 40.0,
            slope: 0.06667,
            quality: FitQuality {
                sse: 0.0,
                rmse: 0.0,
                gradient_norm: 0.0,
            },
        };
        assert_eq!(format_fit_record(&rec), "0 <=x< 60; y= 40.0 + 0.06667x;  least squares");
    }

    #[test]
    fn interpolation_line() {
        let rec = InterpolationRecord {
            core: CoreId(1),
            segment: 3,
            start: 90.0,
            end: 120.0,
            intercept: 40.0,
            slope: 2.0 / 30.0,
        };
        assert_eq!(
            format_interpolation_record(&rec),
            "90 <=x< 120; y_3= 40.0000 + 0.0667x; interpolation"
        );
    }

    #[test]
    fn number_forms() {
        assert_eq!(fmt_time(30.0), "30");
        assert_eq!(fmt_time(46.5), "46.5");
        assert_eq!(fmt_time(-0.0), "0");
        assert_eq!(fmt_coeff(-0.1), "-0.1");
        assert_eq!(fmt_coeff(-0.0), "0.0");
        assert_eq!(fmt_coeff(12350.0), "12350.0");
    }
}
