use std::collections::BTreeMap;

use crate::broadcast::{ CarLocation, DriverInfo, EntryListUpdate, RealtimeCarUpdate };
use crate::error::DirectorError;

#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    pub index: u16,

    // Entry list
    pub race_number: i32,
    pub team_name: String,
    pub car_model_type: u8,
    pub cup_category: u8,
    pub current_driver_index: usize,
    pub drivers: Vec<DriverInfo>,

    // Realtime telemetry
    pub spline_position: Option<f32>,
    pub position: u16,
    pub track_position: u16,
    pub location: CarLocation,
    pub kmh: u16,
    pub laps: u16,
    pub delta_ms: i32,

    /// Set when the broadcast feed reports this car as the one on screen.
    pub focused: bool,

    // Director bookkeeping
    pub gap_front_meters: f32,
    pub broadcast_weight: i32,
    pub cooldown_deduction: i32,
}

impl Car {
    pub fn new(index: u16) -> Car {
        Car {
            index,
            race_number: 0,
            team_name: String::new(),
            car_model_type: 0,
            cup_category: 0,
            current_driver_index: 0,
            drivers: vec![],
            spline_position: None,
            position: 0,
            track_position: 0,
            location: CarLocation::None,
            kmh: 0,
            laps: 0,
            delta_ms: 0,
            focused: false,
            gap_front_meters: 0.0,
            broadcast_weight: 0,
            cooldown_deduction: 0,
        }
    }

    pub fn current_driver(&self) -> Option<&DriverInfo> {
        self.drivers.get(self.current_driver_index)
    }

    fn update_entry(&mut self, update: &EntryListUpdate) {
        self.race_number = update.race_number;
        self.team_name = update.team_name.clone();
        self.car_model_type = update.car_model_type;
        self.cup_category = update.cup_category;
        self.current_driver_index = update.current_driver_index;
        self.drivers = update.drivers.clone();
    }

    fn update_realtime(&mut self, update: &RealtimeCarUpdate) {
        self.current_driver_index = update.driver_index;
        self.spline_position = Some(update.spline_position);
        self.position = update.position;
        self.track_position = update.track_position;
        self.location = update.car_location;
        self.kmh = update.kmh;
        self.laps = update.laps;
        self.delta_ms = update.delta_ms;
    }
}

/// All cars of a session, keyed by car index.
#[derive(Debug, Clone, Default)]
pub struct CarTable {
    cars: BTreeMap<u16, Car>,
}

impl CarTable {
    pub fn new() -> CarTable {
        CarTable { cars: BTreeMap::new() }
    }

    pub fn len(&self) -> usize {
        self.cars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }

    pub fn get(&self, index: u16) -> Option<&Car> {
        self.cars.get(&index)
    }

    pub fn get_mut(&mut self, index: u16) -> Option<&mut Car> {
        self.cars.get_mut(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Car> {
        self.cars.values()
    }

    /// Creates the car on first sighting, then applies the entry details.
    pub fn upsert_entry(&mut self, update: &EntryListUpdate) {
        let car = self.cars.entry(update.car_index).or_insert_with(|| {
            debug!["New car {} (#{})", update.car_index, update.race_number];
            Car::new(update.car_index)
        });
        car.update_entry(update);
    }

    /// Realtime data for a car we have no entry for yet is dropped; the entry
    /// list will normally catch up within a few ticks.
    pub fn apply_realtime(&mut self, update: &RealtimeCarUpdate) -> Result<(), DirectorError> {
        match self.cars.get_mut(&update.car_index) {
            Some(car) => {
                car.update_realtime(update);
                Ok(())
            },
            None => Err(DirectorError::UnknownCar(update.car_index)),
        }
    }

    pub fn set_focused(&mut self, focused_car_index: u16) {
        for car in self.cars.values_mut() {
            car.focused = car.index == focused_car_index;
        }
    }

    /// Indices of the cars with a known spline position, ascending by position.
    pub fn spline_order(&self) -> Vec<u16> {
        let mut positioned: Vec<(f32, u16)> = self.cars.values()
            .filter_map(|car| car.spline_position.map(|spline| (spline, car.index)))
            .collect();
        positioned.sort_by(|(a, _), (b, _)| a.total_cmp(b));
        positioned.into_iter().map(|(_, index)| index).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(car_index: u16) -> EntryListUpdate {
        EntryListUpdate {
            car_index,
            race_number: car_index as i32 + 10,
            team_name: "Team".to_string(),
            car_model_type: 1,
            cup_category: 0,
            current_driver_index: 0,
            drivers: vec![DriverInfo {
                first_name: "Jo".to_string(),
                last_name: "Siffert".to_string(),
                short_name: "SIF".to_string(),
                nationality: 0,
                category: 0,
            }],
        }
    }

    fn realtime(car_index: u16, spline_position: f32) -> RealtimeCarUpdate {
        RealtimeCarUpdate {
            car_index,
            driver_index: 0,
            spline_position,
            position: 1,
            track_position: 1,
            car_location: CarLocation::Track,
            kmh: 200,
            laps: 3,
            delta_ms: 0,
        }
    }

    #[test]
    fn upsert_keeps_one_car_per_index() {
        let mut cars = CarTable::new();
        cars.upsert_entry(&entry(4));
        cars.apply_realtime(&realtime(4, 0.5)).unwrap();

        let mut renamed = entry(4);
        renamed.team_name = "Other".to_string();
        cars.upsert_entry(&renamed);

        assert_eq!(cars.len(), 1);
        let car = cars.get(4).unwrap();
        assert_eq!(car.team_name, "Other");
        assert_eq!(car.spline_position, Some(0.5));
        assert_eq!(car.current_driver().unwrap().short_name, "SIF");
    }

    #[test]
    fn realtime_for_unknown_car_is_rejected() {
        let mut cars = CarTable::new();
        let result = cars.apply_realtime(&realtime(9, 0.1));
        assert!(matches!(result, Err(DirectorError::UnknownCar(9))));
        assert!(cars.is_empty());
    }

    #[test]
    fn only_the_reported_car_is_focused() {
        let mut cars = CarTable::new();
        cars.upsert_entry(&entry(1));
        cars.upsert_entry(&entry(2));

        cars.set_focused(2);
        assert!(!cars.get(1).unwrap().focused);
        assert!(cars.get(2).unwrap().focused);

        cars.set_focused(1);
        assert!(cars.get(1).unwrap().focused);
        assert!(!cars.get(2).unwrap().focused);
    }

    #[test]
    fn spline_order_skips_cars_without_position() {
        let mut cars = CarTable::new();
        for index in 0..4 {
            cars.upsert_entry(&entry(index));
        }
        cars.apply_realtime(&realtime(0, 0.7)).unwrap();
        cars.apply_realtime(&realtime(2, 0.1)).unwrap();
        cars.apply_realtime(&realtime(3, 0.4)).unwrap();

        assert_eq!(cars.spline_order(), vec![2, 3, 0]);
    }
}
