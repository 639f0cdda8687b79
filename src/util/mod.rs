pub mod dates;
pub mod text;

/// Rounds to two decimal places for report output.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
