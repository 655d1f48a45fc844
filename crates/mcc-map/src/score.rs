//! Completeness scoring.

/// Fraction of required fields that were mapped.
///
/// Zero required fields scores `0.0`: there is nothing to be complete about.
pub fn compute_completeness_score(missing_count: usize, total_required: usize) -> f64 {
    if total_required == 0 {
        return 0.0;
    }
    let present = total_required.saturating_sub(missing_count);
    present as f64 / total_required as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_required_scores_zero() {
        assert_eq!(compute_completeness_score(0, 0), 0.0);
    }

    #[test]
    fn half_missing_scores_half() {
        assert_eq!(compute_completeness_score(1, 2), 0.5);
    }

    #[test]
    fn nothing_missing_scores_one() {
        assert_eq!(compute_completeness_score(0, 7), 1.0);
    }
}
