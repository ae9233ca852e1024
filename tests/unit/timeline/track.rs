use crate::{
    foundation::core::GridSize,
    layout::kind::LayoutKind,
    timeline::{
        clock::{FixedTime, VirtualClock},
        ease::Ease,
        keyframe::Snap,
        playback::{Playback, PlaybackState},
    },
};

use super::*;

fn key(time: f64, radius: f32, layout: LayoutKind, n: u32, spacing: f32) -> Keyframe {
    Keyframe {
        time,
        camera: CameraPose {
            radius,
            theta: time as f32 * 0.1,
            phi: 1.0,
        },
        config: FrameConfig {
            layout,
            n: GridSize::new(n).unwrap(),
            spacing,
            cube_size: spacing * 0.5,
            start_hour: time,
        },
    }
}

fn three_keys(tuning: SceneTuning) -> Timeline {
    Timeline::new(
        vec![
            key(0.0, 10.0, LayoutKind::Cube, 4, 1.0),
            key(2.0, 20.0, LayoutKind::Sphere, 8, 2.0),
            key(5.0, 30.0, LayoutKind::Scatter, 12, 3.0),
        ],
        tuning,
    )
    .unwrap()
}

fn linear_tuning() -> SceneTuning {
    SceneTuning {
        hold_delay_secs: 0.0,
        ease: Ease::Linear,
        snap: None,
    }
}

#[test]
fn progress_is_zero_at_segment_start() {
    let tl = three_keys(SceneTuning::default());
    let s = tl.sample(2.0);
    assert_eq!(s.segment, 1);
    assert_eq!(s.linear, 0.0);
    assert_eq!(s.progress, 0.0);
    assert_eq!(s.camera.radius, 20.0);
}

#[test]
fn hold_delay_pins_progress() {
    let tl = three_keys(SceneTuning {
        hold_delay_secs: 1.0,
        ..linear_tuning()
    });
    assert_eq!(tl.sample(2.5).linear, 0.0);
    assert_eq!(tl.sample(2.999).linear, 0.0);
    // Remaining 2s of the 3s segment map to [0, 1].
    assert!((tl.sample(4.0).linear - 0.5).abs() < 1e-12);
}

#[test]
fn hold_longer_than_segment_keeps_progress_at_zero() {
    let tl = three_keys(SceneTuning {
        hold_delay_secs: 2.5,
        ..linear_tuning()
    });
    // Segment 0 lasts 2s, all of it inside the hold.
    assert_eq!(tl.sample(1.99).linear, 0.0);
    // Segment 1 lasts 3s: 0.5s of motion after the hold.
    assert!((tl.sample(4.75).linear - 0.5).abs() < 1e-12);
}

#[test]
fn progress_is_monotonic_within_segment() {
    let tl = three_keys(SceneTuning {
        hold_delay_secs: 0.4,
        ..SceneTuning::default()
    });
    let mut prev = -1.0;
    for i in 0..200 {
        let s = tl.sample(2.0 + 3.0 * i as f64 / 200.0);
        assert_eq!(s.segment, 1);
        assert!((0.0..=1.0).contains(&s.progress));
        assert!(s.progress >= prev);
        prev = s.progress;
    }
}

#[test]
fn camera_and_continuous_fields_interpolate() {
    let tl = three_keys(linear_tuning());
    let s = tl.sample(1.0);
    assert_eq!(s.camera.radius, 15.0);
    assert_eq!(s.config.spacing, 1.5);
    assert_eq!(s.config.cube_size, 0.75);
    let expected = spherical_to_cartesian(15.0, s.camera.theta, 1.0);
    assert!((s.eye - expected).length() < 1e-6);
}

#[test]
fn discrete_fields_come_from_segment_start() {
    let tl = three_keys(SceneTuning::default());
    for i in 0..500 {
        let t = 5.5 * i as f64 / 500.0;
        let s = tl.sample(t);
        let allowed = [
            (LayoutKind::Cube, 4, 0.0),
            (LayoutKind::Sphere, 8, 2.0),
            (LayoutKind::Scatter, 12, 5.0),
        ];
        let got = (s.config.layout, s.config.n.get(), s.config.start_hour);
        assert!(allowed.contains(&got), "t={t} got {got:?}");
        let expected = tl.keyframes()[s.segment].config;
        assert_eq!(s.config.layout, expected.layout);
        assert_eq!(s.config.n, expected.n);
    }
}

#[test]
fn final_state_is_frozen_and_idempotent() {
    let tl = three_keys(SceneTuning::default());
    let last = tl.keyframes()[2];
    let at = tl.sample(5.0);
    for t in [5.0, 5.0, 6.0, 1000.0, f64::INFINITY, f64::NAN] {
        let s = tl.sample(t);
        assert!(s.finished);
        assert_eq!(s.camera, last.camera);
        assert_eq!(s.config, last.config);
        assert_eq!(s, at);
    }
}

#[test]
fn before_first_key_holds_first_values() {
    let tl = Timeline::new(
        vec![
            key(1.0, 10.0, LayoutKind::Cube, 4, 1.0),
            key(2.0, 20.0, LayoutKind::Sphere, 8, 2.0),
        ],
        SceneTuning::default(),
    )
    .unwrap();
    let s = tl.sample(0.25);
    assert_eq!(s.segment, 0);
    assert_eq!(s.progress, 0.0);
    assert_eq!(s.camera.radius, 10.0);
    assert!(!s.finished);
}

#[test]
fn snap_curve_runs_ahead_of_camera() {
    let tl = three_keys(SceneTuning {
        hold_delay_secs: 0.0,
        ease: Ease::Linear,
        snap: Some(Snap {
            ease: Ease::Linear,
            speed: 2.0,
        }),
    });
    let s = tl.sample(1.0);
    assert_eq!(s.progress, 0.5);
    assert_eq!(s.config_progress, 1.0);
    assert_eq!(s.config.spacing, 2.0);
    assert_eq!(s.camera.radius, 15.0);
}

#[test]
fn single_keyframe_is_always_final() {
    let tl = Timeline::new(
        vec![key(0.0, 5.0, LayoutKind::Sphere, 3, 1.0)],
        SceneTuning::default(),
    )
    .unwrap();
    assert!(tl.sample(0.0).finished);
    assert_eq!(tl.duration_secs(), 0.0);
}

#[test]
fn invalid_timelines_are_rejected() {
    assert!(Timeline::new(vec![], SceneTuning::default()).is_err());
    assert!(
        Timeline::new(
            vec![
                key(2.0, 10.0, LayoutKind::Cube, 4, 1.0),
                key(1.0, 10.0, LayoutKind::Cube, 4, 1.0),
            ],
            SceneTuning::default()
        )
        .is_err()
    );
    assert!(
        Timeline::new(
            vec![key(0.0, 10.0, LayoutKind::Cube, 4, -1.0)],
            SceneTuning::default()
        )
        .is_err()
    );
    assert!(
        Timeline::new(
            vec![key(0.0, 10.0, LayoutKind::Cube, 4, 1.0)],
            SceneTuning {
                hold_delay_secs: -1.0,
                ..SceneTuning::default()
            }
        )
        .is_err()
    );
}

#[test]
fn sample_with_clock_matches_sample() {
    let tl = three_keys(SceneTuning::default());
    let mut clock = VirtualClock::new(crate::foundation::core::Fps::whole(30).unwrap());
    clock.set_frame(crate::foundation::core::FrameIndex(75));
    assert_eq!(tl.sample_with(&clock), tl.sample(2.5));
    assert_eq!(tl.sample_with(&FixedTime(3.0)), tl.sample(3.0));
}

#[test]
fn playback_goes_idle_after_final_keyframe() {
    let tl = three_keys(SceneTuning::default());
    let mut pb = Playback::new(FixedTime(1.0));
    assert_eq!(pb.tick(&tl), None);
    pb.play();
    assert_eq!(pb.state(), PlaybackState::Playing);
    assert!(pb.tick(&tl).is_some());

    *pb.clock_mut() = FixedTime(9.0);
    let last = pb.tick(&tl).unwrap();
    assert!(last.finished);
    assert_eq!(pb.state(), PlaybackState::Idle);
    assert_eq!(pb.tick(&tl), None);
}

#[test]
fn stop_handle_halts_playback_on_next_tick() {
    let tl = three_keys(SceneTuning::default());
    let mut pb = Playback::new(FixedTime(1.0));
    pb.play();
    let handle = pb.stop_handle();
    handle.stop();
    assert_eq!(pb.tick(&tl), None);
    assert_eq!(pb.state(), PlaybackState::Idle);

    pb.play();
    assert!(pb.tick(&tl).is_some());
}
