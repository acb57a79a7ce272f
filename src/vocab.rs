//! Controlled vocabularies for document assembly.
//!
//! Pure immutable lookup data: device-model names, sport-category display
//! names, the coarse TCX sport enumeration, and attribution descriptions.
//! Unknown codes fall back to a generic `Other` label instead of failing.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Fallback label for every unknown vocabulary code.
pub const OTHER_LABEL: &str = "Other";

/// Attribution code for a workout autodetected by a device and not yet
/// confirmed by the user.
pub const ATTRIB_AUTODETECTED: u32 = 5;

/// Coarse sport category of the output document. TCX restricts the
/// activity sport to this fixed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sport {
    Running,
    Biking,
    Other,
}

impl Sport {
    /// Schema spelling of the sport attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Sport::Running => "Running",
            Sport::Biking => "Biking",
            Sport::Other => "Other",
        }
    }
}

static DEVICE_MODELS: Lazy<HashMap<u32, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (51, "Withings Pulse"),
        (52, "Withings Activite"),
        (53, "Withings Activite Pop"),
        (54, "Withings Go"),
        (55, "Withings Activite Steel HR"),
        (58, "Withings Pulse HR"),
        (59, "Withings Activite Steel HR Sport Edition"),
        (90, "Withings Move"),
        (91, "Withings Move ECG"),
        (93, "Withings ScanWatch"),
    ])
});

/// Display name of a device model code.
pub fn device_model_name(code: u32) -> &'static str {
    DEVICE_MODELS.get(&code).copied().unwrap_or(OTHER_LABEL)
}

/// Map a sport category code to the coarse output sport.
pub const fn sport_for_category(code: u32) -> Sport {
    match code {
        // Run, indoor running
        2 | 307 => Sport::Running,
        // Bicycling, BMX, indoor cycling
        5 | 6 | 308 => Sport::Biking,
        _ => Sport::Other,
    }
}

/// Display name of a sport category code.
pub const fn category_name(code: u32) -> &'static str {
    match code {
        1 => "Walk",
        2 => "Run",
        3 => "Hiking",
        4 => "Skating",
        5 => "BMX",
        6 => "Bicycling",
        7 => "Swimming",
        8 => "Surfing",
        9 => "Kitesurfing",
        10 => "Windsurfing",
        11 => "Bodyboard",
        12 => "Tennis",
        13 => "Table tennis",
        14 => "Squash",
        15 => "Badminton",
        16 => "Lifting weights",
        17 => "Calisthenics",
        18 => "Elliptical",
        19 => "Pilates",
        20 => "Basketball",
        21 => "Soccer",
        22 => "Football",
        23 => "Rugby",
        24 => "Volleyball",
        25 => "Water polo",
        26 => "Horse riding",
        27 => "Golf",
        28 => "Yoga",
        29 => "Dancing",
        30 => "Boxing",
        31 => "Fencing",
        32 => "Wrestling",
        33 => "Martial arts",
        34 => "Skiing",
        35 => "Snowboarding",
        187 => "Rowing",
        188 => "Zumba",
        191 => "Baseball",
        192 => "Handball",
        193 => "Hockey",
        194 => "Ice hockey",
        195 => "Climbing",
        196 => "Ice skating",
        272 => "Multi-sport",
        306 => "Indoor walk",
        307 => "Indoor running",
        308 => "Indoor cycling",
        _ => OTHER_LABEL,
    }
}

/// Confirmation description of an attribution code.
pub const fn attrib_description(code: u32) -> &'static str {
    match code {
        0 => "Captured by a device, owner confirmed",
        1 => "Captured by a device, owner ambiguous",
        2 => "Entered manually",
        4 => "Entered manually at user creation",
        5 => "Autodetected by a device, unconfirmed",
        7 => "Autodetected by a device, confirmed by the user",
        _ => OTHER_LABEL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_model_lookup() {
        assert_eq!(device_model_name(55), "Withings Activite Steel HR");
        assert_eq!(device_model_name(9999), OTHER_LABEL);
    }

    #[test]
    fn test_sport_mapping() {
        assert_eq!(sport_for_category(2), Sport::Running);
        assert_eq!(sport_for_category(307), Sport::Running);
        assert_eq!(sport_for_category(6), Sport::Biking);
        assert_eq!(sport_for_category(308), Sport::Biking);
        assert_eq!(sport_for_category(7), Sport::Other);
        assert_eq!(sport_for_category(9999), Sport::Other);
    }

    #[test]
    fn test_category_names() {
        assert_eq!(category_name(6), "Bicycling");
        assert_eq!(category_name(187), "Rowing");
        assert_eq!(category_name(9999), OTHER_LABEL);
    }

    #[test]
    fn test_attrib_descriptions() {
        assert_eq!(
            attrib_description(ATTRIB_AUTODETECTED),
            "Autodetected by a device, unconfirmed"
        );
        assert_eq!(attrib_description(42), OTHER_LABEL);
    }

    #[test]
    fn test_sport_as_str() {
        assert_eq!(Sport::Running.as_str(), "Running");
        assert_eq!(Sport::Biking.as_str(), "Biking");
        assert_eq!(Sport::Other.as_str(), "Other");
    }
}
