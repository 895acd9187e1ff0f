//! Constants for the LIVISI Smart Home integration

/// Integration domain
pub const DOMAIN: &str = "livisi";

/// API port of Avatar controllers
pub const AVATAR_PORT: u16 = 9090;
/// API port of classic SHC controllers
pub const CLASSIC_PORT: u16 = 8080;

/// Seconds between device state polls
pub const DEVICE_POLLING_DELAY: u64 = 60;

/// Event type of button and motion events raised for device triggers
pub const LIVISI_EVENT: &str = "livisi_event";

pub const SWITCH_DEVICE_TYPES: &[&str] = &["ISS", "ISS2", "PSS", "PSSO"];
pub const MOTION_DEVICE_TYPES: &[&str] = &["WMD", "WMDO"];

pub const BATTERY_POWERED_DEVICES: &[&str] =
    &["WDS", "ISC2", "BRM8", "WMD", "WMDO", "VRCC", "WSD", "WSD2"];

/// Number of physical buttons per model; models not listed have none
pub const BUTTON_COUNT: &[(&str, u8)] = &[
    ("BRC8", 8),
    ("ISC2", 2),
    ("ISD2", 2),
    ("ISR2", 2),
    ("ISS2", 2),
    ("WSC2", 2),
];

/// Upper bound for configured button counts
pub const MAX_BUTTONS: u8 = 8;

pub const EVENT_BUTTON_PRESSED: &str = "button_press";
pub const EVENT_BUTTON_LONG_PRESSED: &str = "button_long_press";
pub const EVENT_MOTION_DETECTED: &str = "motion_detected";

/// Event data keys of button events
pub const ATTR_BUTTON_INDEX: &str = "button_index";
pub const ATTR_PRESS_TYPE: &str = "press_type";

/// Manufacturer recorded on registered devices
pub const MANUFACTURER: &str = "RWE";
