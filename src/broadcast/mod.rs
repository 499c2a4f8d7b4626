pub mod data_producer;

use std::collections::BTreeMap;

/// Where a car currently is relative to the racing line and the pits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarLocation {
    None,
    Track,
    Pitlane,
    PitEntry,
    PitExit,
}

impl Default for CarLocation {
    fn default() -> Self {
        CarLocation::None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverInfo {
    pub first_name: String,
    pub last_name: String,
    pub short_name: String,
    pub nationality: u16,
    pub category: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackUpdate {
    pub track_id: i32,
    pub track_name: String,
    pub track_meters: f32,
    /// Camera set name -> camera names in that set.
    pub camera_sets: BTreeMap<String, Vec<String>>,
    pub hud_pages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryListUpdate {
    pub car_index: u16,
    pub race_number: i32,
    pub team_name: String,
    pub car_model_type: u8,
    pub cup_category: u8,
    pub current_driver_index: usize,
    pub drivers: Vec<DriverInfo>,
}

/// Session wide state. Receiving one of these is what drives a director tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeUpdate {
    /// Session time in milliseconds.
    pub session_time: f32,
    /// Car the broadcast feed is showing right now, whoever chose it.
    pub focused_car_index: u16,
    pub active_camera_set: String,
    pub active_camera: String,
    pub current_hud_page: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeCarUpdate {
    pub car_index: u16,
    pub driver_index: usize,
    pub spline_position: f32,
    pub position: u16,
    pub track_position: u16,
    pub car_location: CarLocation,
    pub kmh: u16,
    pub laps: u16,
    pub delta_ms: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Track(TrackUpdate),
    EntryList(EntryListUpdate),
    Realtime(RealtimeUpdate),
    RealtimeCar(RealtimeCarUpdate),
}
