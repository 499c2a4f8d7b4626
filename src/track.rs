use std::collections::BTreeMap;

use crate::broadcast::{ RealtimeUpdate, TrackUpdate };

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: i32,
    pub name: String,
    pub meters: f32,
    pub camera_sets: BTreeMap<String, Vec<String>>,
    pub hud_pages: Vec<String>,

    pub active_camera_set: String,
    pub active_camera: String,
    pub current_hud_page: String,
}

impl Track {
    pub fn new(update: &TrackUpdate) -> Track {
        Track {
            id: update.track_id,
            name: update.track_name.clone(),
            meters: update.track_meters,
            camera_sets: update.camera_sets.clone(),
            hud_pages: update.hud_pages.clone(),
            active_camera_set: String::new(),
            active_camera: String::new(),
            current_hud_page: String::new(),
        }
    }

    /// Gaps can only be converted to meters once the length is known.
    pub fn has_length(&self) -> bool {
        self.meters > 0.0 && self.meters.is_finite()
    }

    pub fn has_camera_set(&self, camera_set: &str) -> bool {
        self.camera_sets.contains_key(camera_set)
    }

    /// Track cameras and HUD pages may change while the track stays the same.
    fn refresh(&mut self, update: &TrackUpdate) {
        self.camera_sets = update.camera_sets.clone();
        self.hud_pages = update.hud_pages.clone();
    }

    pub fn update_realtime(&mut self, update: &RealtimeUpdate) {
        if self.active_camera_set != update.active_camera_set || self.active_camera != update.active_camera {
            debug!["Active camera is now {}/{}", update.active_camera_set, update.active_camera];
        }
        self.active_camera_set = update.active_camera_set.clone();
        self.active_camera = update.active_camera.clone();
        self.current_hud_page = update.current_hud_page.clone();
    }
}

/// Applies a track update to the currently known track. A different track id
/// replaces the whole model, the same id only refreshes cameras and HUD pages.
pub fn apply_track_update(current: &mut Option<Track>, update: &TrackUpdate) {
    match current {
        Some(track) if track.id == update.track_id => track.refresh(update),
        _ => {
            info!("New track {} ({}), {} m", update.track_name, update.track_id, update.track_meters);
            if update.track_meters <= 0.0 {
                warn!("Track {} reports no length, gaps stay unknown until it does", update.track_name);
            }
            *current = Some(Track::new(update));
        }
    }
}
