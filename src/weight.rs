use crate::broadcast::CarLocation;
use crate::car::{ Car, CarTable };

/// Bonus for following a car in positions 1 to 10.
const POSITION_BONUSES: [i32; 10] = [25, 18, 15, 12, 10, 8, 6, 4, 2, 1];

const PIT_ENTRY_BONUS: i32 = 5;
const PIT_EXIT_BONUS: i32 = 10;
const AHEAD_PIT_EXIT_BONUS: i32 = 20;
const AHEAD_PIT_EXIT_CLOSE_BONUS: i32 = 30;

/// Linearly interpolated value at x for the data points xp, fp. xp must be increasing.
fn lin_interp(x: f32, xp: &[f32], fp: &[f32]) -> f32 {
    debug_assert_eq!(xp.len(), fp.len());

    if x <= xp[0] {
        return fp[0];
    }

    for i in 1..xp.len() {
        if x <= xp[i] {
            return fp[i - 1] + (x - xp[i - 1]) * (fp[i] - fp[i - 1]) / (xp[i] - xp[i - 1]);
        }
    }

    fp[fp.len() - 1]
}

/// Score for how close a car is to the one in front. A nose-to-tail fight
/// outranks everything, beyond 200 m there is nothing to see.
pub fn proximity_score(gap_front_meters: f32) -> i32 {
    let gap = gap_front_meters;
    if gap <= 1.0 {
        10000
    } else if gap <= 5.0 {
        1000
    } else if gap <= 10.0 {
        100
    } else if gap <= 30.0 {
        90
    } else if gap <= 50.0 {
        70
    } else if gap <= 200.0 {
        lin_interp(gap, &[50.0, 100.0, 200.0], &[70.0, 40.0, 0.0]) as i32
    } else {
        0
    }
}

pub fn position_bonus(position_ahead: u16) -> i32 {
    match position_ahead {
        1..=10 => POSITION_BONUSES[position_ahead as usize - 1],
        _ => 0,
    }
}

pub fn pit_bonus(car: &Car, car_ahead: &Car) -> i32 {
    let mut bonus = 0;
    match car.location {
        CarLocation::PitEntry => bonus += PIT_ENTRY_BONUS,
        CarLocation::PitExit => bonus += PIT_EXIT_BONUS,
        _ => (),
    }

    if car_ahead.location == CarLocation::PitExit && car.gap_front_meters < 500.0 {
        bonus += AHEAD_PIT_EXIT_BONUS;
        if car.gap_front_meters < 200.0 {
            bonus += AHEAD_PIT_EXIT_CLOSE_BONUS;
        }
    }

    bonus
}

/// How camera worthy `car` is right now, given the car directly in front of
/// it. The car's cooldown deduction is already subtracted, so the result can
/// be negative. Saturates rather than wrapping for huge deductions.
pub fn broadcast_weight(car: &Car, car_ahead: &Car) -> i32 {
    (proximity_score(car.gap_front_meters) + position_bonus(car_ahead.position) + pit_bonus(car, car_ahead))
        .saturating_sub(car.cooldown_deduction)
}

/// Next cooldown deduction of a car. The car on screen accumulates the whole
/// seconds it has been shown, every other car halves its deduction.
pub fn next_cooldown(deduction: i32, focused: bool, shown_for_secs: i32) -> i32 {
    if focused {
        shown_for_secs.max(0)
    } else {
        deduction / 2
    }
}

/// Applies one tick of cooldown decay and recomputes the broadcast weight of
/// every positioned car. `order` is the spline order of the table; the first
/// car has nobody ahead and gets a weight of 0.
pub fn refresh(cars: &mut CarTable, order: &[u16], focused: Option<u16>, shown_for_secs: i32) {
    for &index in order {
        if let Some(car) = cars.get_mut(index) {
            car.cooldown_deduction = next_cooldown(car.cooldown_deduction, focused == Some(index), shown_for_secs);
        }
    }

    if let Some(&leader) = order.first() {
        if let Some(car) = cars.get_mut(leader) {
            car.broadcast_weight = 0;
        }
    }

    for pair in order.windows(2) {
        let weight = match (cars.get(pair[1]), cars.get(pair[0])) {
            (Some(car), Some(car_ahead)) => broadcast_weight(car, car_ahead),
            _ => continue,
        };
        if let Some(car) = cars.get_mut(pair[1]) {
            car.broadcast_weight = weight;
        }
    }
}

/// Weight used to rank candidates: the stored weight with the cooldown
/// deduction taken off once more, floored at zero.
pub fn adjusted_weight(car: &Car) -> i32 {
    car.broadcast_weight.saturating_sub(car.cooldown_deduction).max(0)
}
