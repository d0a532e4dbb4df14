use serde::Serialize;

/// Fold an angle in degrees into the band `[-90, 90]`.
///
/// An axis and its negation describe the same line, so angles derived from
/// principal axes are only meaningful up to 180°. A single fold is applied:
/// inputs in `(-270, 270)`, which covers every `atan2` result, land in the band.
///
/// # Arguments
///
/// * `angle` - The angle in degrees.
///
/// # Returns
///
/// The folded angle in degrees.
///
/// Example:
///
/// ```
/// use vbr_orient::normalize_angle;
///
/// assert_eq!(normalize_angle(120.0), -60.0);
/// assert_eq!(normalize_angle(-150.0), 30.0);
/// assert_eq!(normalize_angle(45.0), 45.0);
/// ```
pub fn normalize_angle(angle: f64) -> f64 {
    if angle > 90.0 {
        angle - 180.0
    } else if angle < -90.0 {
        angle + 180.0
    } else {
        angle
    }
}

/// Pitch, roll and yaw in degrees.
///
/// Pitch is measured in the YZ plane, roll in the XZ plane and yaw in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct OrientationAngles {
    /// Angle of the major axis in the YZ plane.
    pub pitch: f64,
    /// Angle of the intermediate axis in the XZ plane.
    pub roll: f64,
    /// Angle of the minor axis in the XY plane.
    pub yaw: f64,
}

impl OrientationAngles {
    /// Create the angles from their components in degrees.
    pub fn new(pitch: f64, roll: f64, yaw: f64) -> Self {
        Self { pitch, roll, yaw }
    }

    /// Fold every component with [`normalize_angle`].
    pub fn normalized(&self) -> Self {
        Self {
            pitch: normalize_angle(self.pitch),
            roll: normalize_angle(self.roll),
            yaw: normalize_angle(self.yaw),
        }
    }

    /// Components as `[pitch, roll, yaw]`.
    pub fn to_array(&self) -> [f64; 3] {
        [self.pitch, self.roll, self.yaw]
    }
}
