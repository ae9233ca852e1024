use super::*;

#[test]
fn hash_unit3_is_stable_and_bounded() {
    let a = hash_unit3(42);
    assert_eq!(a, hash_unit3(42));
    assert_ne!(a, hash_unit3(43));
    for seed in 0..500 {
        for v in hash_unit3(seed) {
            assert!((-1.0..=1.0).contains(&v));
        }
    }
}

#[test]
fn wrap01_handles_negatives_and_whole_numbers() {
    assert_eq!(wrap01(0.0), 0.0);
    assert_eq!(wrap01(1.0), 0.0);
    assert!((wrap01(1.25) - 0.25).abs() < 1e-12);
    assert!((wrap01(-0.25) - 0.75).abs() < 1e-12);
}

#[test]
fn spherical_axes() {
    let top = spherical_to_cartesian(2.0, 0.0, 0.0);
    assert!((top - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-6);

    let front = spherical_to_cartesian(3.0, 0.0, std::f32::consts::FRAC_PI_2);
    assert!((front - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-5);

    let side = spherical_to_cartesian(
        1.0,
        std::f32::consts::FRAC_PI_2,
        std::f32::consts::FRAC_PI_2,
    );
    assert!((side - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
}

#[test]
fn lerp_endpoints() {
    assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
    assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
}
