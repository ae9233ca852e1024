use glam::{Mat4, Vec4};

use super::*;

fn live(state_positions: &[f32]) -> (InstanceState, InstanceBuffer) {
    let mut st = InstanceState::new();
    st.snap_to(state_positions).unwrap();
    let mut buf = InstanceBuffer::new();
    buf.set_count(st.count()).unwrap();
    buf.take_dirty();
    (st, buf)
}

#[test]
fn fast_path_writes_scale_and_scaled_translation() {
    let (mut st, mut buf) = live(&[1.0, -2.0, 3.0]);
    update_instances(
        LayoutKind::Cube,
        &mut st,
        &mut buf,
        &UpdateParams {
            progress: 1.0,
            spacing: 2.0,
            cube_size: 0.5,
        },
    );
    let m = buf.transform(0).unwrap();
    let expected = Mat4::from_cols(
        Vec4::new(0.5, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 0.5, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 0.5, 0.0),
        Vec4::new(2.0, -4.0, 6.0, 1.0),
    );
    assert_eq!(m, expected);
}

#[test]
fn slow_path_faces_origin() {
    let (mut st, mut buf) = live(&[3.0, 1.0, -2.0, 0.0, 5.0, 0.0]);
    update_instances(
        LayoutKind::Sphere,
        &mut st,
        &mut buf,
        &UpdateParams {
            progress: 1.0,
            spacing: 1.5,
            cube_size: 2.0,
        },
    );

    for i in 0..2 {
        let m = buf.transform(i).unwrap();
        let pos = m.w_axis.truncate();
        let z = m.z_axis.truncate();
        let to_origin = (-pos).normalize();
        assert!((z.length() - 2.0).abs() < 1e-4);
        assert!(z.normalize().dot(to_origin) > 0.9999, "instance {i}");
        // Orthogonal basis.
        assert!(m.x_axis.truncate().dot(z).abs() < 1e-4);
        assert!(m.y_axis.truncate().dot(z).abs() < 1e-4);
        assert!(m.x_axis.truncate().dot(m.y_axis.truncate()).abs() < 1e-4);
    }
    let m0 = buf.transform(0).unwrap();
    assert!((m0.w_axis.truncate() - Vec3::new(4.5, 1.5, -3.0)).length() < 1e-5);
}

#[test]
fn slow_path_at_origin_keeps_identity_orientation() {
    let (mut st, mut buf) = live(&[0.0, 0.0, 0.0]);
    update_instances(
        LayoutKind::Sphere,
        &mut st,
        &mut buf,
        &UpdateParams {
            progress: 1.0,
            spacing: 1.0,
            cube_size: 1.0,
        },
    );
    assert_eq!(buf.transform(0).unwrap(), Mat4::IDENTITY);
}

#[test]
fn progress_blends_start_and_target() {
    let (mut st, mut buf) = live(&[0.0, 0.0, 0.0]);
    st.retarget(&[10.0, 0.0, 0.0]).unwrap();
    update_instances(
        LayoutKind::Scatter,
        &mut st,
        &mut buf,
        &UpdateParams {
            progress: 0.3,
            spacing: 1.0,
            cube_size: 1.0,
        },
    );
    assert!((buf.transform(0).unwrap().w_axis.x - 3.0).abs() < 1e-5);
}

#[test]
fn marks_dirty_once_per_tick() {
    let (mut st, mut buf) = live(&[0.0; 30]);
    assert!(!buf.is_dirty());
    update_instances(
        LayoutKind::Cube,
        &mut st,
        &mut buf,
        &UpdateParams {
            progress: 0.0,
            spacing: 1.0,
            cube_size: 1.0,
        },
    );
    assert!(buf.take_dirty());
    assert!(!buf.take_dirty());
}

#[test]
fn both_paths_agree_on_translation() {
    let positions: Vec<f32> = (0..60).map(|i| (i as f32 * 0.37).sin() * 4.0).collect();
    let mut fast = vec![0.0; 20 * 16];
    let mut slow = vec![0.0; 20 * 16];
    write_axis_aligned(&positions, 1.25, 1.0, &mut fast);
    write_facing_origin(&positions, 1.25, 1.0, &mut slow);
    for (a, b) in fast.chunks_exact(16).zip(slow.chunks_exact(16)) {
        assert_eq!(&a[12..16], &b[12..16]);
    }
}
