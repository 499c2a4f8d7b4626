use std::time::Duration;

use rand::{ RngCore, SeedableRng };
use rand::rngs::StdRng;

use crate::broadcast::{ CarLocation, EntryListUpdate, RealtimeCarUpdate, RealtimeUpdate, TrackUpdate, Update };
use crate::car::{ Car, CarTable };
use crate::clock::{ Clock, SystemClock };
use crate::config::DirectorConfig;
use crate::error::DirectorError;
use crate::gap;
use crate::sink::{ CommandSink, FocusCommand };
use crate::track::{ self, Track };
use crate::weight;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorMode {
    /// Gaps are kept up to date, focus is left alone.
    Idle,
    /// Focus follows the broadcast weight ranking.
    Armed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorStats {
    pub ticks: u64,
    pub switches: u64,
    pub failed_ticks: u64,
    pub dropped_updates: u64,
}

/// Cars that may be put on screen: something in front of them, out of the
/// pit lane and actually moving.
pub fn is_candidate(car: &Car) -> bool {
    car.gap_front_meters > 0.0 && car.location != CarLocation::Pitlane && car.kmh > 0
}

/// Candidate car indices, best first. Every candidate draws a random key for
/// this call only; sorting by the key and then stably by adjusted weight makes
/// exact ties land on a uniformly random car.
pub fn rank_candidates(cars: &CarTable, rng: &mut dyn RngCore) -> Vec<u16> {
    let mut candidates: Vec<(u64, i32, u16)> = cars.iter()
        .filter(|car| is_candidate(car))
        .map(|car| (rng.next_u64(), weight::adjusted_weight(car), car.index))
        .collect();

    candidates.sort_by_key(|&(key, _, _)| key);
    candidates.sort_by(|(_, a, _), (_, b, _)| b.cmp(a));

    candidates.into_iter().map(|(_, _, index)| index).collect()
}

pub struct Director {
    config: DirectorConfig,
    mode: DirectorMode,

    track: Option<Track>,
    cars: CarTable,

    focused_car_index: Option<u16>,
    /// Last automatic switch, gates the next one.
    last_switch: Duration,
    /// When the focused car went on screen, by either kind of switch.
    focused_since: Duration,
    stats: DirectorStats,

    clock: Box<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
    sink: Box<dyn CommandSink>,
}

impl Director {
    pub fn new(config: &DirectorConfig, sink: Box<dyn CommandSink>) -> Director {
        let mode = if config.auto_switch_enabled { DirectorMode::Armed } else { DirectorMode::Idle };

        Director {
            config: config.clone(),
            mode,
            track: None,
            cars: CarTable::new(),
            focused_car_index: None,
            last_switch: Duration::ZERO,
            focused_since: Duration::ZERO,
            stats: DirectorStats::default(),
            clock: Box::new(SystemClock),
            rng: Box::new(StdRng::from_entropy()),
            sink,
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Director {
        self.clock = clock;
        self
    }

    pub fn with_rng(mut self, rng: Box<dyn RngCore + Send>) -> Director {
        self.rng = rng;
        self
    }

    pub fn mode(&self) -> DirectorMode {
        self.mode
    }

    pub fn enable_auto_switch(&mut self) {
        if self.mode != DirectorMode::Armed {
            info!("Auto switch enabled");
        }
        self.mode = DirectorMode::Armed;
    }

    pub fn disable_auto_switch(&mut self) {
        if self.mode != DirectorMode::Idle {
            info!("Auto switch disabled");
        }
        self.mode = DirectorMode::Idle;
    }

    pub fn toggle_auto_switch(&mut self) {
        match self.mode {
            DirectorMode::Idle => self.enable_auto_switch(),
            DirectorMode::Armed => self.disable_auto_switch(),
        }
    }

    pub fn focused_car_index(&self) -> Option<u16> {
        self.focused_car_index
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn cars(&self) -> &CarTable {
        &self.cars
    }

    pub fn stats(&self) -> &DirectorStats {
        &self.stats
    }

    pub fn handle(&mut self, update: &Update) {
        match update {
            Update::Track(track_update) => self.on_track_update(track_update),
            Update::EntryList(entry) => self.on_entry_list_update(entry),
            Update::Realtime(realtime) => {
                self.on_realtime_update(realtime);
            },
            Update::RealtimeCar(car_update) => {
                if let Err(err) = self.on_realtime_car_update(car_update) {
                    debug!("Dropping car update: {}", err);
                }
            },
        }
    }

    pub fn on_track_update(&mut self, update: &TrackUpdate) {
        track::apply_track_update(&mut self.track, update);
    }

    pub fn on_entry_list_update(&mut self, update: &EntryListUpdate) {
        self.cars.upsert_entry(update);
    }

    pub fn on_realtime_car_update(&mut self, update: &RealtimeCarUpdate) -> Result<(), DirectorError> {
        self.cars.apply_realtime(update).map_err(|err| {
            self.stats.dropped_updates += 1;
            err
        })
    }

    /// One director tick. Returns the newly focused car if the tick switched focus.
    pub fn on_realtime_update(&mut self, update: &RealtimeUpdate) -> Option<u16> {
        self.stats.ticks += 1;

        if let Some(track) = &mut self.track {
            track.update_realtime(update);
        }
        self.cars.set_focused(update.focused_car_index);

        let result = self.update_gaps().and_then(|_| match self.mode {
            DirectorMode::Armed => self.auto_switch(),
            DirectorMode::Idle => Ok(None),
        });

        match result {
            Ok(switched) => switched,
            Err(err @ DirectorError::MissingTrack) | Err(err @ DirectorError::EmptyCandidateSet) => {
                debug!["Tick {} skipped: {}", self.stats.ticks, err];
                None
            },
            Err(err) => {
                warn!["Tick {} failed: {}", self.stats.ticks, err];
                self.stats.failed_ticks += 1;
                None
            },
        }
    }

    fn update_gaps(&mut self) -> Result<usize, DirectorError> {
        let meters = match &self.track {
            Some(track) if track.has_length() => track.meters,
            _ => return Err(DirectorError::MissingTrack),
        };
        gap::update_front_gaps(&mut self.cars, meters)
    }

    fn auto_switch(&mut self) -> Result<Option<u16>, DirectorError> {
        let now = self.clock.now();
        let since_switch = now.saturating_sub(self.last_switch);
        if since_switch < self.config.minimum_switch_interval {
            return Ok(None);
        }

        let order = self.cars.spline_order();
        let on_screen = now.saturating_sub(self.focused_since);
        let shown_for_secs = i32::try_from(on_screen.as_secs()).unwrap_or(i32::MAX);
        weight::refresh(&mut self.cars, &order, self.focused_car_index, shown_for_secs);

        let ranking = rank_candidates(&self.cars, &mut *self.rng);
        let best = *ranking.first().ok_or(DirectorError::EmptyCandidateSet)?;
        if Some(best) == self.focused_car_index {
            return Ok(None);
        }

        if let Some(car) = self.cars.get(best) {
            info!(
                "Switching focus {:?} -> {} (#{}, weight {}, gap {:.1} m)",
                self.focused_car_index, best, car.race_number, car.broadcast_weight, car.gap_front_meters
            );
        }

        self.sink.send(FocusCommand::SetFocus(best));
        self.focused_car_index = Some(best);
        self.last_switch = now;
        self.focused_since = now;
        self.stats.switches += 1;

        Ok(Some(best))
    }

    /// Manual focus request. Does not reset the switch gate, but the car's
    /// time on screen starts counting now.
    pub fn request_focus(&mut self, car_index: u16) -> Result<(), DirectorError> {
        if self.cars.get(car_index).is_none() {
            return Err(DirectorError::UnknownCar(car_index));
        }
        self.sink.send(FocusCommand::SetFocus(car_index));
        if self.focused_car_index != Some(car_index) {
            self.focused_since = self.clock.now();
        }
        self.focused_car_index = Some(car_index);
        Ok(())
    }

    pub fn request_camera(&mut self, camera_set: &str, camera: &str) {
        if let Some(track) = &self.track {
            if !track.has_camera_set(camera_set) {
                debug!("Camera set {} is not known for {}", camera_set, track.name);
            }
        }
        self.sink.send(FocusCommand::SetCamera {
            camera_set: camera_set.to_string(),
            camera: camera.to_string(),
        });
    }

    pub fn request_hud_page(&mut self, page: &str) {
        self.sink.send(FocusCommand::RequestHudPage(page.to_string()));
    }
}
