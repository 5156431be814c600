/// Maximum number of /100 rescaling steps applied to a raw confidence.
const MAX_RESCALE_STEPS: usize = 5;

/// Map a confidence of unknown units (fraction, percent, or larger scale)
/// into [0, 1].
///
/// The value is divided by 100 while it stays above 1, at most five times,
/// then clamped. Values already in [0, 1] come back unchanged. Returns
/// `None` for NaN or infinite input.
pub fn normalize_confidence(raw: f64) -> Option<f64> {
    if !raw.is_finite() {
        return None;
    }

    let mut value = raw;
    for _ in 0..MAX_RESCALE_STEPS {
        if value <= 1.0 {
            break;
        }
        value /= 100.0;
    }

    Some(value.clamp(0.0, 1.0))
}
