/// Computes the statistical median. Even-sized input averages the two middle
/// values. Returns `None` for empty input.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some(sorted[mid - 1] + (sorted[mid] - sorted[mid - 1]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
