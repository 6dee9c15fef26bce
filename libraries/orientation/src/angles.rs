use crate::QuaternionSample;

/// Half of the wrap period used by [`wrap_angle`]
pub const WRAP_LIMIT: f64 = 360.0;

const WRAP_PERIOD: f64 = 2.0 * WRAP_LIMIT;

// |sin(roll)| this close to 1 puts yaw and pitch on the same axis
const GIMBAL_LOCK_EPSILON: f64 = 1e-9;

/// Decompose an intrinsic Y-Z-X rotation into `(yaw, roll, pitch)` in degrees.
///
/// Yaw is about the vertical Y axis and is applied first, then roll about Z,
/// then pitch about X. Yaw and pitch land in (-180, 180], roll in [-90, 90].
/// At gimbal lock the pitch is folded into yaw and reported as 0.
pub fn euler_from_quaternion(sample: &QuaternionSample) -> (f64, f64, f64) {
    let rotation = sample.to_unit_quaternion().to_rotation_matrix();
    let m = rotation.matrix();

    // R = Ry(yaw) * Rz(roll) * Rx(pitch)
    let sin_roll = m[(1, 0)].clamp(-1.0, 1.0);
    let roll = sin_roll.asin();

    let (yaw, pitch) = if 1.0 - sin_roll.abs() < GIMBAL_LOCK_EPSILON {
        (m[(0, 2)].atan2(m[(2, 2)]), 0.0)
    } else {
        ((-m[(2, 0)]).atan2(m[(0, 0)]), (-m[(1, 2)]).atan2(m[(1, 1)]))
    };

    (yaw.to_degrees(), roll.to_degrees(), pitch.to_degrees())
}

/// Bring an angle into [-360, 360] by steps of 720°.
///
/// Values already in range are returned untouched, so the function is
/// idempotent. Values above the range land in (-360, 360], values below it
/// in [-360, 360). Non-finite input is returned as-is.
pub fn wrap_angle(angle: f64) -> f64 {
    if !angle.is_finite() || (-WRAP_LIMIT..=WRAP_LIMIT).contains(&angle) {
        return angle;
    }

    if angle > WRAP_LIMIT {
        let excess = (angle - WRAP_LIMIT) % WRAP_PERIOD;
        if excess == 0.0 {
            WRAP_LIMIT
        } else {
            excess - WRAP_LIMIT
        }
    } else {
        let excess = (-WRAP_LIMIT - angle) % WRAP_PERIOD;
        if excess == 0.0 {
            -WRAP_LIMIT
        } else {
            WRAP_LIMIT - excess
        }
    }
}
