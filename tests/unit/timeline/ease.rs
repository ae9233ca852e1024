use super::*;

const ALL: [Ease; 8] = [
    Ease::Linear,
    Ease::InQuad,
    Ease::OutQuad,
    Ease::InOutQuad,
    Ease::InCubic,
    Ease::OutCubic,
    Ease::InOutCubic,
    Ease::SmoothStep,
];

#[test]
fn endpoints_are_fixed() {
    for e in ALL {
        assert_eq!(e.apply(0.0), 0.0, "{e:?}");
        assert!((e.apply(1.0) - 1.0).abs() < 1e-12, "{e:?}");
    }
}

#[test]
fn eases_are_monotonic() {
    for e in ALL {
        let mut prev = e.apply(0.0);
        for i in 1..=200 {
            let v = e.apply(i as f64 / 200.0);
            assert!(v >= prev - 1e-12, "{e:?} not monotonic at {i}");
            prev = v;
        }
    }
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::SmoothStep.apply(-2.0), 0.0);
    assert_eq!(Ease::SmoothStep.apply(4.0), 1.0);
}

#[test]
fn smooth_step_midpoint_and_name() {
    assert_eq!(Ease::SmoothStep.apply(0.5), 0.5);
    assert!(Ease::SmoothStep.apply(0.25) < 0.25);
    assert_eq!(Ease::default(), Ease::SmoothStep);
    let e: Ease = serde_json::from_str("\"smooth_step\"").unwrap();
    assert_eq!(e, Ease::SmoothStep);
}

#[test]
fn in_out_curves_are_symmetric_about_the_midpoint() {
    for e in [Ease::InOutQuad, Ease::InOutCubic] {
        assert!((e.apply(0.5) - 0.5).abs() < 1e-12, "{e:?}");
        for i in 1..10 {
            let t = i as f64 / 20.0;
            assert!((e.apply(t) + e.apply(1.0 - t) - 1.0).abs() < 1e-12, "{e:?} at {t}");
        }
    }
    assert!((Ease::InOutCubic.apply(0.25) - 0.0625).abs() < 1e-12);
}

#[test]
fn sped_up_curve_saturates_early() {
    let e = Ease::Linear;
    assert!((e.apply_sped_up(0.25, 2.0) - 0.5).abs() < 1e-12);
    assert_eq!(e.apply_sped_up(0.5, 2.0), 1.0);
    assert_eq!(e.apply_sped_up(0.9, 2.0), 1.0);
}

#[test]
fn hold_pins_start_of_segment() {
    assert_eq!(held_progress(0.2, 2.0, 0.5), 0.0);
    assert!((held_progress(1.25, 2.0, 0.5) - 0.5).abs() < 1e-12);
    assert_eq!(held_progress(3.0, 2.0, 0.5), 1.0);
    // Hold longer than the segment: flat 0, then 1 once it has elapsed.
    assert_eq!(held_progress(0.5, 1.0, 2.0), 0.0);
    assert_eq!(held_progress(2.0, 1.0, 2.0), 1.0);
}
