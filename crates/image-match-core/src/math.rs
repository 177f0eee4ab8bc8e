//! Shared math utilities.

/// L1 (Manhattan) distance between two equal-length vectors.
///
/// Extra trailing elements of the longer slice are ignored; callers check
/// lengths beforehand.
pub fn l1_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l1_distance() {
        let d = l1_distance(&[0.0, 0.5, 1.0], &[1.0, 0.25, 1.0]);
        assert!((d - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_l1_distance_identical_is_zero() {
        let v = [0.1, 0.2, 0.3];
        assert_eq!(l1_distance(&v, &v), 0.0);
    }

    #[test]
    fn test_l1_distance_symmetric() {
        let a = [0.9, 0.0, 0.4];
        let b = [0.1, 0.7, 0.2];
        assert_eq!(l1_distance(&a, &b), l1_distance(&b, &a));
    }
}
