//! Angle and Rotation tests
//!
//! Tests for:
//! - Euler round trips through the quaternion representation
//! - Representation consistency (quaternion, matrix, Euler)
//! - Slerp and angle measurement
//! - Direction constructors

use arbor::prelude::*;

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-3;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

fn same_rotation(a: &Rotation, b: &Rotation) -> bool {
    [Vec3::X, Vec3::Y, Vec3::Z, Vec3::ONE]
        .into_iter()
        .all(|v| vec3_approx(a * v, b * v))
}

// ============================================================================
// Euler round trip
// ============================================================================

#[test]
fn euler_round_trip_through_quaternion() {
    let cases = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(45.0, 0.0, 0.0),
        Vec3::new(0.0, 90.0, 0.0),
        Vec3::new(0.0, 0.0, 90.0),
        Vec3::new(45.0, 45.0, 0.0),
        Vec3::new(90.0, 90.0, 90.0),
        Vec3::new(180.0, 0.0, 0.0),
    ];

    for e in cases {
        let original = Rotation::from_euler(e.x, e.y, e.z);
        // Forget the written Euler angles
        let from_quat = Rotation::from_quaternion(original.quaternion());
        let read = from_quat.euler_angles();
        let rebuilt = Rotation::from_euler(read.x, read.y, read.z);

        assert!(
            vec3_approx(from_quat * Vec3::ONE, rebuilt * Vec3::ONE),
            "round trip failed for {e}: read back {read}"
        );
    }
}

#[test]
fn euler_read_back_is_normalized() {
    let r = Rotation::from_euler(-90.0, 450.0, -30.0);
    let e = r.euler_angles();
    assert!(vec3_approx(e, Vec3::new(270.0, 90.0, 330.0)));

    let extracted = Rotation::from_quaternion(r.quaternion()).euler_angles();
    for c in extracted.to_array() {
        assert!((0.0..360.0).contains(&c), "{extracted}");
    }
}

#[test]
fn euler_axes_follow_yaw_pitch_roll_order() {
    // Yaw first, then pitch about the yawed X, then roll
    let r = Rotation::from_euler(30.0, 60.0, 10.0);
    let expected = Quat::from_rotation_y(60f32.to_radians())
        * Quat::from_rotation_x(30f32.to_radians())
        * Quat::from_rotation_z(10f32.to_radians());
    assert!(r.quaternion().abs_diff_eq(expected, 1e-5));
}

#[test]
fn gimbal_lock_still_reproduces_orientation() {
    for e in [Vec3::new(90.0, 30.0, 20.0), Vec3::new(270.0, 10.0, 50.0)] {
        let r = Rotation::from_quaternion(Rotation::from_euler(e.x, e.y, e.z).quaternion());
        let read = r.euler_angles();
        let rebuilt = Rotation::from_euler(read.x, read.y, read.z);
        assert!(same_rotation(&r, &rebuilt), "{e} -> {read}");
    }
}

#[test]
fn near_gimbal_round_trip_is_stable() {
    let pairs = [(30.0, 20.0), (123.0, 77.0), (-45.0, 170.0), (0.0, 0.0)];
    for pole in [90.0f32, 270.0, -90.0] {
        for i in -400..=400 {
            let pitch = pole + i as f32 * 0.0005;
            for (yaw, roll) in pairs {
                let q = Rotation::from_euler(pitch, yaw, roll).quaternion();
                let r = Rotation::from_quaternion(q);
                let read = r.euler_angles();
                let rebuilt = Rotation::from_euler(read.x, read.y, read.z);
                assert!(
                    vec3_approx(r * Vec3::ONE, rebuilt * Vec3::ONE),
                    "({pitch}, {yaw}, {roll}) -> {read}"
                );
            }
        }
    }
}

// ============================================================================
// Representations
// ============================================================================

#[test]
fn matrix_and_quaternion_agree() {
    let r = Rotation::from_euler(20.0, -35.0, 80.0);
    let m = r.matrix();
    let v = Vec3::new(0.3, -1.2, 2.0);
    assert!(vec3_approx(m * v, r.rotate_vector(v)));

    let back = Rotation::from_matrix(m);
    assert!(same_rotation(&r, &back));
}

#[test]
fn setters_replace_every_representation() {
    let mut r = Rotation::identity();
    r.set_euler_angles(Vec3::new(0.0, 90.0, 0.0));
    assert!(vec3_approx(r.forward(), Vec3::X));

    r.set_quaternion(Quat::from_rotation_x(90f32.to_radians()));
    assert!(vec3_approx(r.euler_angles(), Vec3::new(90.0, 0.0, 0.0)));
    assert!(vec3_approx(r.matrix() * Vec3::Y, Vec3::Z));

    r.set_matrix(Mat3::IDENTITY);
    assert_eq!(r, Rotation::identity());
    assert!(vec3_approx(r.euler_angles(), Vec3::ZERO));
}

#[test]
fn composition_applies_right_operand_first() {
    let yaw = Rotation::from_euler(0.0, 90.0, 0.0);
    let pitch = Rotation::from_euler(90.0, 0.0, 0.0);
    let combined = &yaw * &pitch;
    // pitch: Z -> -Y, then yaw leaves -Y alone
    assert!(vec3_approx(combined.forward(), -Vec3::Y));
    assert!(same_rotation(&(&combined * &combined.inverse()), &Rotation::identity()));
}

// ============================================================================
// Interpolation and measurement
// ============================================================================

#[test]
fn slerp_endpoints_and_midpoint() {
    let a = Rotation::identity();
    let b = Rotation::from_euler(0.0, 90.0, 0.0);

    assert!(same_rotation(&Rotation::slerp(&a, &b, 0.0), &a));
    assert!(same_rotation(&Rotation::slerp(&a, &b, 1.0), &b));

    let mid = Rotation::slerp(&a, &b, 0.5);
    assert!((mid.angle_to(&a).degrees() - 45.0).abs() < EPSILON);
    assert!((mid.angle_to(&b).degrees() - 45.0).abs() < EPSILON);
}

#[test]
fn slerp_takes_the_short_way_round() {
    let a = Rotation::from_euler(0.0, 10.0, 0.0);
    let b = Rotation::from_euler(0.0, 350.0, 0.0);
    let mid = Rotation::slerp(&a, &b, 0.5);
    assert!(same_rotation(&mid, &Rotation::identity()));
}

#[test]
fn slerp_extrapolates_past_one() {
    let a = Rotation::identity();
    let b = Rotation::from_euler(0.0, 40.0, 0.0);
    let past = Rotation::slerp(&a, &b, 2.0);
    assert!((past.angle_to(&a).degrees() - 80.0).abs() < 0.05);
}

#[test]
fn angle_to_is_symmetric() {
    let a = Rotation::from_euler(10.0, 20.0, 30.0);
    let b = Rotation::from_euler(-40.0, 5.0, 0.0);
    let ab = a.angle_to(&b).degrees();
    let ba = b.angle_to(&a).degrees();
    assert!((ab - ba).abs() < EPSILON);
    assert!(a.angle_to(&a).degrees() < 0.1);
}

#[test]
fn angle_helpers() {
    assert!((Angle::from_degrees(370.0).clamped().degrees() - 10.0).abs() < EPSILON);
    assert!((Angle::from_degrees(-30.0).clamped().degrees() - 330.0).abs() < EPSILON);

    let d = Angle::diff(Angle::from_degrees(350.0), Angle::from_degrees(10.0));
    assert!((d.degrees() - 20.0).abs() < EPSILON);

    let l = Angle::lerp(Angle::from_degrees(350.0), Angle::from_degrees(10.0), 0.5);
    assert!((l.clamped().degrees()).abs() < EPSILON);

    assert!((Angle::between(Vec3::X, Vec3::Y).degrees() - 90.0).abs() < EPSILON);
    assert_eq!(Angle::between(Vec3::ZERO, Vec3::Y), Angle::ZERO);
}

// ============================================================================
// Direction constructors
// ============================================================================

#[test]
fn from_direction_points_forward() {
    for dir in [Vec3::X, -Vec3::X, Vec3::new(1.0, 1.0, 1.0), -Vec3::Z] {
        let r = Rotation::from_direction(dir);
        assert!(vec3_approx(r.forward(), dir.normalize()), "{dir}");
    }
}

#[test]
fn from_direction_keeps_up_when_possible() {
    let r = Rotation::from_direction(Vec3::new(1.0, 0.0, 1.0));
    assert!(r.up().y > 0.99);
    assert!(r.right().y.abs() < EPSILON);
}

#[test]
fn from_direction_handles_vertical_and_zero() {
    let up = Rotation::from_direction(Vec3::Y);
    assert!(vec3_approx(up.forward(), Vec3::Y));
    let down = Rotation::from_direction(-Vec3::Y);
    assert!(vec3_approx(down.forward(), -Vec3::Y));

    assert_eq!(Rotation::from_direction(Vec3::ZERO), Rotation::identity());
}

#[test]
fn look_at_from_offset_eye() {
    let r = Rotation::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    assert!(vec3_approx(r.forward(), -Vec3::Z));
}
