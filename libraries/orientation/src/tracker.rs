use crate::angles::{euler_from_quaternion, wrap_angle};
use crate::QuaternionSample;

/// Raw angle magnitude beyond which a sign flip counts as a seam crossing
const SEAM_THRESHOLD: f64 = 90.0;
const FULL_TURN: f64 = 360.0;

/// Roll/pitch targets produced for one telemetry tick.
///
/// Angles are whole degrees in [-360, 360]. Inactive ticks report 0/0.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OrientationOutput {
    pub roll: i32,
    pub pitch: i32,
    pub active: bool,
}

/// One axis of continuity state.
#[derive(Debug, Default, Clone, Copy)]
struct ContinuousAxis {
    /// Last raw decoded angle, before the offset was applied
    previous: f64,
    /// Accumulated multiple of ±360°
    offset: f64,
}

impl ContinuousAxis {
    fn update(&mut self, raw: f64) -> f64 {
        if raw < -SEAM_THRESHOLD && self.previous > SEAM_THRESHOLD {
            self.offset += FULL_TURN;
        } else if raw > SEAM_THRESHOLD && self.previous < -SEAM_THRESHOLD {
            self.offset -= FULL_TURN;
        }

        // the detector compares raw against raw, never against corrected output
        self.previous = raw;

        wrap_angle(raw + self.offset)
    }
}

/// Turns a stream of quaternion samples into continuous roll/pitch.
///
/// Decomposed angles jump by 360° whenever they cross ±180°. The tracker
/// watches consecutive raw angles for that jump and keeps a running offset
/// per axis so the output keeps moving smoothly instead.
///
/// Samples must arrive in order. A true rotation of more than 180° between
/// two ticks cannot be told apart from a seam crossing and will be
/// misread.
///
/// One tracker lives for one telemetry connection. Offsets start at zero
/// and are never reset while it lives; build a new tracker to reset.
#[derive(Debug, Default)]
pub struct OrientationTracker {
    roll: ContinuousAxis,
    pitch: ContinuousAxis,
    active: bool,
}

impl OrientationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one sample. `active` is the simulator's in-play flag.
    pub fn update(&mut self, sample: &QuaternionSample, active: bool) -> OrientationOutput {
        if !active {
            return self.suspend();
        }

        let (_yaw, roll, pitch) = euler_from_quaternion(sample);
        self.update_angles(roll, pitch, true)
    }

    /// Process already decomposed raw angles, in degrees within (-180, 180].
    pub fn update_angles(&mut self, roll: f64, pitch: f64, active: bool) -> OrientationOutput {
        if !active {
            return self.suspend();
        }

        let roll = self.roll.update(roll);
        let pitch = self.pitch.update(pitch);
        self.active = true;

        // the actuator protocol takes whole degrees, truncated toward zero
        OrientationOutput {
            roll: roll as i32,
            pitch: pitch as i32,
            active: true,
        }
    }

    // History stays frozen while inactive so continuity resumes from before the gap
    fn suspend(&mut self) -> OrientationOutput {
        self.active = false;
        OrientationOutput::default()
    }

    /// Whether the last processed sample was in play
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn roll_offset(&self) -> f64 {
        self.roll.offset
    }

    pub fn pitch_offset(&self) -> f64 {
        self.pitch.offset
    }
}
