//! Clock faces
//!
//! Pure mapping from a clock reading to what a face shows: the digital
//! readout strings, or the analog hand angles, tick marks and numerals.
//! Angles are degrees clockwise from 12 o'clock.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock_state::ClockTimeInfo;

/// Faces at or above this diameter show hour numerals
pub const NUMERAL_MIN_DIAMETER: f32 = 120.0;

/// How clocks are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    #[default]
    Digital,
    Analog,
    Hybrid,
}

impl ClockMode {
    pub fn all() -> &'static [ClockMode] {
        &[ClockMode::Digital, ClockMode::Analog, ClockMode::Hybrid]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClockMode::Digital => "digital",
            ClockMode::Analog => "analog",
            ClockMode::Hybrid => "hybrid",
        }
    }

    /// Button label
    pub fn label(&self) -> &'static str {
        match self {
            ClockMode::Digital => "DIGITAL",
            ClockMode::Analog => "ANALOG",
            ClockMode::Hybrid => "HYBRID",
        }
    }
}

impl std::fmt::Display for ClockMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown clock mode: {0}")]
pub struct ParseClockModeError(String);

impl FromStr for ClockMode {
    type Err = ParseClockModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "digital" => Ok(ClockMode::Digital),
            "analog" => Ok(ClockMode::Analog),
            "hybrid" => Ok(ClockMode::Hybrid),
            other => Err(ParseClockModeError(other.to_string())),
        }
    }
}

/// Display size of a face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    /// Nominal face diameter in pixels
    pub fn diameter(&self) -> f32 {
        match self {
            SizeClass::Small => 80.0,
            SizeClass::Medium => 128.0,
            SizeClass::Large => 160.0,
        }
    }

    pub fn shows_numerals(&self) -> bool {
        self.diameter() >= NUMERAL_MIN_DIAMETER
    }
}

/// Hand angles in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandAngles {
    pub hour: f64,
    pub minute: f64,
    /// Absent on hybrid faces
    pub second: Option<f64>,
}

/// One of the twelve hour marks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickMark {
    pub index: u32,
    pub angle: f64,
    /// Every third mark (12, 3, 6, 9)
    pub emphasized: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Numeral {
    pub label: String,
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DigitalFace {
    /// "HH:MM" or "HH:MM:SS" at the largest size
    pub time: String,
    pub date: String,
    /// "UTC+HH:MM"
    pub offset: String,
    pub day_night: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalogFace {
    pub hands: HandAngles,
    pub ticks: Vec<TickMark>,
    /// Empty below `NUMERAL_MIN_DIAMETER`
    pub numerals: Vec<Numeral>,
    pub day_night: &'static str,
    pub diameter: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HybridFace {
    /// Dial without a second hand
    pub dial: AnalogFace,
    /// "HH:MM" drawn over the center
    pub center_time: String,
}

/// A renderable face
#[derive(Debug, Clone, PartialEq)]
pub enum ClockFace {
    Digital(DigitalFace),
    Analog(AnalogFace),
    Hybrid(HybridFace),
}

pub fn hour_hand_angle(hours: u32, minutes: u32) -> f64 {
    (hours % 12) as f64 * 30.0 + minutes as f64 * 0.5
}

pub fn minute_hand_angle(minutes: u32, seconds: u32) -> f64 {
    minutes as f64 * 6.0 + seconds as f64 * 0.1
}

pub fn second_hand_angle(smooth_seconds: f64) -> f64 {
    smooth_seconds * 6.0
}

pub fn hand_angles(info: &ClockTimeInfo) -> HandAngles {
    let snap = &info.snapshot;
    HandAngles {
        hour: hour_hand_angle(snap.hours, snap.minutes),
        minute: minute_hand_angle(snap.minutes, snap.seconds),
        second: Some(second_hand_angle(info.smooth_seconds)),
    }
}

/// 12-hour numeral for an hour position; 0 and 12 both read "12"
pub fn numeral_for_hour(hours: u32) -> u32 {
    match hours % 12 {
        0 => 12,
        h => h,
    }
}

pub fn tick_marks() -> Vec<TickMark> {
    (0..12)
        .map(|i| TickMark {
            index: i,
            angle: i as f64 * 30.0,
            emphasized: i % 3 == 0,
        })
        .collect()
}

pub fn numerals() -> Vec<Numeral> {
    (0..12)
        .map(|i| Numeral {
            label: numeral_for_hour(i).to_string(),
            angle: i as f64 * 30.0,
        })
        .collect()
}

/// Point at `radius` from `center` along a clockwise-from-12 angle, in y-up
/// coordinates
pub fn polar_point(center: (f32, f32), radius: f32, angle_deg: f64) -> (f32, f32) {
    let rad = angle_deg.to_radians() as f32;
    (center.0 + radius * rad.sin(), center.1 + radius * rad.cos())
}

fn digital_face(info: &ClockTimeInfo, size: SizeClass) -> DigitalFace {
    let snap = &info.snapshot;
    let time = if size == SizeClass::Large {
        snap.formatted_time.clone()
    } else {
        snap.format_hh_mm()
    };
    DigitalFace {
        time,
        date: snap.formatted_date.clone(),
        offset: snap.format_utc_offset(),
        day_night: info.day_night_label,
    }
}

fn analog_face(info: &ClockTimeInfo, size: SizeClass) -> AnalogFace {
    AnalogFace {
        hands: hand_angles(info),
        ticks: tick_marks(),
        numerals: if size.shows_numerals() { numerals() } else { Vec::new() },
        day_night: info.day_night_label,
        diameter: size.diameter(),
    }
}

/// Build the face for a reading in the given mode and size
pub fn render_face(info: &ClockTimeInfo, mode: ClockMode, size: SizeClass) -> ClockFace {
    match mode {
        ClockMode::Digital => ClockFace::Digital(digital_face(info, size)),
        ClockMode::Analog => ClockFace::Analog(analog_face(info, size)),
        ClockMode::Hybrid => {
            let mut dial = analog_face(info, size);
            dial.hands.second = None;
            ClockFace::Hybrid(HybridFace {
                dial,
                center_time: info.snapshot.format_hh_mm(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_engine::{compute_snapshot_at, parse_timezone};
    use chrono::{TimeZone, Utc};

    fn info_at(h: u32, m: u32, s: u32, millis: i64) -> ClockTimeInfo {
        let instant = Utc.with_ymd_and_hms(2024, 7, 15, h, m, s).unwrap()
            + chrono::Duration::milliseconds(millis);
        let snap = compute_snapshot_at(parse_timezone("UTC").unwrap(), instant);
        ClockTimeInfo::from_snapshot(snap)
    }

    #[test]
    fn test_hour_hand_continuous_across_wrap() {
        let before = hour_hand_angle(11, 59);
        assert!((before - 359.5).abs() < 1e-9);
        assert!(before < 360.0);
        assert_eq!(hour_hand_angle(0, 0), 0.0);
        assert_eq!(hour_hand_angle(12, 0), 0.0);
        assert_eq!(hour_hand_angle(23, 59), before);
    }

    #[test]
    fn test_minute_and_second_hands() {
        assert!((minute_hand_angle(59, 59) - 359.9).abs() < 1e-9);
        assert!((second_hand_angle(59.5) - 357.0).abs() < 1e-9);

        let hands = hand_angles(&info_at(3, 15, 30, 500));
        assert!((hands.hour - 97.5).abs() < 1e-9);
        assert!((hands.minute - 93.0).abs() < 1e-9);
        assert!((hands.second.unwrap() - 183.0).abs() < 1e-9);
    }

    #[test]
    fn test_numerals_and_ticks() {
        assert_eq!(numeral_for_hour(0), 12);
        assert_eq!(numeral_for_hour(12), 12);
        assert_eq!(numeral_for_hour(13), 1);

        let ticks = tick_marks();
        assert_eq!(ticks.len(), 12);
        let emphasized: Vec<u32> = ticks.iter().filter(|t| t.emphasized).map(|t| t.index).collect();
        assert_eq!(emphasized, vec![0, 3, 6, 9]);
        assert_eq!(ticks[4].angle, 120.0);

        let labels: Vec<String> = numerals().into_iter().map(|n| n.label).collect();
        assert_eq!(labels[0], "12");
        assert_eq!(labels[11], "11");
    }

    #[test]
    fn test_digital_seconds_only_at_large() {
        let info = info_at(14, 5, 9, 0);
        match render_face(&info, ClockMode::Digital, SizeClass::Large) {
            ClockFace::Digital(face) => {
                assert_eq!(face.time, "14:05:09");
                assert_eq!(face.offset, "UTC+00:00");
                assert_eq!(face.day_night, "[DAY]");
                assert_eq!(face.date, "Mon, Jul 15");
            }
            other => panic!("expected digital face, got {:?}", other),
        }
        match render_face(&info, ClockMode::Digital, SizeClass::Medium) {
            ClockFace::Digital(face) => assert_eq!(face.time, "14:05"),
            other => panic!("expected digital face, got {:?}", other),
        }
    }

    #[test]
    fn test_analog_numerals_follow_size() {
        let info = info_at(20, 0, 0, 0);
        match render_face(&info, ClockMode::Analog, SizeClass::Small) {
            ClockFace::Analog(face) => {
                assert!(face.numerals.is_empty());
                assert_eq!(face.day_night, "[NIGHT]");
                assert!(face.hands.second.is_some());
            }
            other => panic!("expected analog face, got {:?}", other),
        }
        match render_face(&info, ClockMode::Analog, SizeClass::Medium) {
            ClockFace::Analog(face) => assert_eq!(face.numerals.len(), 12),
            other => panic!("expected analog face, got {:?}", other),
        }
    }

    #[test]
    fn test_hybrid_drops_second_hand() {
        let info = info_at(0, 7, 30, 0);
        match render_face(&info, ClockMode::Hybrid, SizeClass::Large) {
            ClockFace::Hybrid(face) => {
                assert_eq!(face.center_time, "00:07");
                assert!(face.dial.hands.second.is_none());
                assert!((face.dial.hands.hour - 3.5).abs() < 1e-9);
            }
            other => panic!("expected hybrid face, got {:?}", other),
        }
    }

    #[test]
    fn test_clock_mode_parse() {
        assert_eq!("analog".parse::<ClockMode>().unwrap(), ClockMode::Analog);
        assert_eq!(" hybrid\n".parse::<ClockMode>().unwrap(), ClockMode::Hybrid);
        assert!("sundial".parse::<ClockMode>().is_err());
        assert_eq!(ClockMode::default(), ClockMode::Digital);
        assert_eq!(ClockMode::Analog.to_string(), "analog");
    }

    #[test]
    fn test_polar_point() {
        let (x, y) = polar_point((0.0, 0.0), 10.0, 0.0);
        assert!(x.abs() < 1e-5 && (y - 10.0).abs() < 1e-5);
        let (x, y) = polar_point((5.0, 5.0), 10.0, 90.0);
        assert!((x - 15.0).abs() < 1e-4 && (y - 5.0).abs() < 1e-4);
    }
}
