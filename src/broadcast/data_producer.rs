use std::collections::BTreeMap;
use std::time::Duration;

use async_std::task;
use async_std::channel::Sender;
use rand::{ Rng, SeedableRng };
use rand::rngs::StdRng;

use crate::broadcast::{ CarLocation, DriverInfo, EntryListUpdate, RealtimeCarUpdate, RealtimeUpdate, TrackUpdate, Update };
use crate::config::SimulationConfig;

const DRIVERS: [(&str, &str, &str); 8] = [
    ("Jo", "Siffert", "SIF"),
    ("Clay", "Regazzoni", "REG"),
    ("Jacky", "Ickx", "ICK"),
    ("Derek", "Bell", "BEL"),
    ("Hans", "Stuck", "STU"),
    ("Vic", "Elford", "ELF"),
    ("Brian", "Redman", "RED"),
    ("Pedro", "Rodriguez", "ROD"),
];

/// Chance per tick that a car on track heads for the pits.
const PIT_CHANCE: f64 = 0.002;
const PIT_ENTRY_TICKS: u32 = 8;
const PIT_STOP_TICKS: u32 = 40;
const PIT_EXIT_TICKS: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
enum PitPhase {
    Racing,
    Entry(u32),
    Stopped(u32),
    Exit(u32),
}

struct SimCar {
    index: u16,
    /// Laps covered, including the fraction of the current one.
    progress: f64,
    base_kmh: f64,
    pit: PitPhase,
}

impl SimCar {
    fn location(&self) -> CarLocation {
        match self.pit {
            PitPhase::Racing => CarLocation::Track,
            PitPhase::Entry(_) => CarLocation::PitEntry,
            PitPhase::Stopped(_) => CarLocation::Pitlane,
            PitPhase::Exit(_) => CarLocation::PitExit,
        }
    }

    fn kmh(&self, rng: &mut StdRng) -> f64 {
        match self.pit {
            PitPhase::Racing => self.base_kmh + rng.gen_range(-12.0..12.0),
            PitPhase::Entry(_) | PitPhase::Exit(_) => 80.0,
            PitPhase::Stopped(_) => 0.0,
        }
    }

    fn advance_pit(&mut self, rng: &mut StdRng) {
        self.pit = match self.pit {
            PitPhase::Racing if rng.gen_bool(PIT_CHANCE) => PitPhase::Entry(PIT_ENTRY_TICKS),
            PitPhase::Racing => PitPhase::Racing,
            PitPhase::Entry(0) => PitPhase::Stopped(PIT_STOP_TICKS),
            PitPhase::Entry(left) => PitPhase::Entry(left - 1),
            PitPhase::Stopped(0) => PitPhase::Exit(PIT_EXIT_TICKS),
            PitPhase::Stopped(left) => PitPhase::Stopped(left - 1),
            PitPhase::Exit(0) => PitPhase::Racing,
            PitPhase::Exit(left) => PitPhase::Exit(left - 1),
        };
    }
}

fn track_update(config: &SimulationConfig) -> TrackUpdate {
    let mut camera_sets = BTreeMap::new();
    camera_sets.insert("set1".to_string(), vec!["CameraPit1".to_string(), "Camera1".to_string(), "Camera2".to_string()]);
    camera_sets.insert("set2".to_string(), vec!["Onboard0".to_string(), "Onboard1".to_string(), "Onboard2".to_string()]);
    camera_sets.insert("Helicam".to_string(), vec!["Helicam".to_string()]);

    TrackUpdate {
        track_id: 1,
        track_name: "Simulated GP".to_string(),
        track_meters: config.track_meters,
        camera_sets,
        hud_pages: vec!["Blank".to_string(), "Basic HUD".to_string(), "Broadcasting".to_string()],
    }
}

fn entry(index: u16) -> EntryListUpdate {
    let (first_name, last_name, short_name) = DRIVERS[index as usize % DRIVERS.len()];
    EntryListUpdate {
        car_index: index,
        race_number: 2 + index as i32 * 3,
        team_name: format!("Team {}", last_name),
        car_model_type: (index % 4) as u8,
        cup_category: 0,
        current_driver_index: 0,
        drivers: vec![DriverInfo {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            short_name: short_name.to_string(),
            nationality: 0,
            category: 0,
        }],
    }
}

/// Plays a race on a made up track and feeds it into a session, the same
/// updates a broadcasting connection would deliver.
pub struct SimulatedRace {
    sender: Sender<Update>,
    config: SimulationConfig,
    tick_limit: Option<u64>,
}

impl SimulatedRace {
    pub fn new(sender: Sender<Update>, config: SimulationConfig) -> SimulatedRace {
        SimulatedRace { sender, config, tick_limit: None }
    }

    pub fn with_tick_limit(mut self, ticks: u64) -> SimulatedRace {
        self.tick_limit = Some(ticks);
        self
    }

    /// Runs until the tick limit is hit or the session stops listening.
    /// Returns the number of realtime ticks sent.
    pub async fn execute(self) -> u64 {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        if self.sender.send(Update::Track(track_update(&self.config))).await.is_err() {
            return 0;
        }

        let mut cars: Vec<SimCar> = Vec::with_capacity(self.config.cars as usize);
        for index in 0..self.config.cars {
            if self.sender.send(Update::EntryList(entry(index))).await.is_err() {
                return 0;
            }
            cars.push(SimCar {
                index,
                // grid slots 8 m apart behind the line
                progress: -(index as f64) * 8.0 / self.config.track_meters as f64,
                base_kmh: rng.gen_range(150.0..165.0),
                pit: PitPhase::Racing,
            });
        }

        let dt = self.config.realtime_update_interval.as_secs_f64().max(0.05);
        let meters = self.config.track_meters as f64;
        let mut session_time = 0.0;
        let mut ticks = 0;

        loop {
            if let Some(limit) = self.tick_limit {
                if ticks >= limit {
                    break;
                }
            }

            let mut speeds = Vec::with_capacity(cars.len());
            for car in &mut cars {
                car.advance_pit(&mut rng);
                let kmh = car.kmh(&mut rng);
                car.progress += kmh / 3.6 * dt / meters;
                speeds.push(kmh);
            }

            let mut standings: Vec<usize> = (0..cars.len()).collect();
            standings.sort_by(|&a, &b| cars[b].progress.total_cmp(&cars[a].progress));

            for (rank, &i) in standings.iter().enumerate() {
                let car = &cars[i];
                let mut spline_position = car.progress.rem_euclid(1.0) as f32;
                if spline_position >= 1.0 {
                    spline_position = 0.0;
                }
                let update = RealtimeCarUpdate {
                    car_index: car.index,
                    driver_index: 0,
                    spline_position,
                    position: rank as u16 + 1,
                    track_position: rank as u16 + 1,
                    car_location: car.location(),
                    kmh: speeds[i].round() as u16,
                    laps: car.progress.max(0.0).floor() as u16,
                    delta_ms: 0,
                };
                if self.sender.send(Update::RealtimeCar(update)).await.is_err() {
                    info!("Session stopped listening after {} ticks", ticks);
                    return ticks;
                }
            }

            session_time += dt * 1000.0;
            let realtime = RealtimeUpdate {
                session_time: session_time as f32,
                focused_car_index: 0,
                active_camera_set: "set1".to_string(),
                active_camera: "Camera1".to_string(),
                current_hud_page: "Broadcasting".to_string(),
            };
            if self.sender.send(Update::Realtime(realtime)).await.is_err() {
                info!("Session stopped listening after {} ticks", ticks);
                return ticks;
            }

            ticks += 1;
            if ticks % 60 == 0 {
                debug!["Simulated ticks: {}", ticks];
            }

            if self.config.realtime_update_interval > Duration::ZERO {
                task::sleep(self.config.realtime_update_interval).await;
            }
        }

        ticks
    }
}
