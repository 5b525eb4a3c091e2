/// Strict decimal float parse of a raw CSV field.
///
/// No trimming, thousands separators or currency symbols. Values that do not
/// fit a finite `f64` (`inf`, `NaN`, `1e400`) are rejected.
pub fn infer_numeric(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}
