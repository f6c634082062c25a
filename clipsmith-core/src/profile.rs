//! Built-in camera profiles.
//!
//! A profile names a camera model and, optionally, the region of the frame
//! where that camera burns in its date and time.

use serde::Serialize;
use std::fmt;

/// A rectangle in percent of frame width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentRect {
    pub top_left: (f64, f64),
    pub bottom_right: (f64, f64),
}

impl fmt::Display for PercentRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}%, {}%) - ({}%, {}%)",
            self.top_left.0, self.top_left.1, self.bottom_right.0, self.bottom_right.1
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Profile {
    pub id: &'static str,
    /// Where the camera overlays its timestamp, if it does
    pub datetime_region: Option<PercentRect>,
}

pub const DEFAULT_PROFILE: Profile = Profile {
    id: "default",
    datetime_region: None,
};

pub const GARMIN_DASHCAM_MINI2: Profile = Profile {
    id: "garmin-dashcam-mini2",
    datetime_region: Some(PercentRect {
        top_left: (80.0, 0.0),
        bottom_right: (100.0, 20.0),
    }),
};

/// All built-in profiles, default first.
#[must_use]
pub fn all_profiles() -> &'static [Profile] {
    &[DEFAULT_PROFILE, GARMIN_DASHCAM_MINI2]
}

/// Looks up a built-in profile by id.
#[must_use]
pub fn find_profile(id: &str) -> Option<&'static Profile> {
    all_profiles().iter().find(|p| p.id == id)
}
