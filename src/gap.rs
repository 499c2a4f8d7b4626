use crate::car::CarTable;
use crate::error::DirectorError;

/// Circular distance between two spline positions as a lap fraction in [0, 0.5].
/// Positions slightly outside [0, 1) are folded back before taking the shorter arc.
pub fn spline_distance(ahead: f32, behind: f32) -> f32 {
    let mut distance = (ahead - behind).abs();
    while distance >= 1.0 {
        distance -= 1.0;
    }

    if distance > 0.5 {
        1.0 - distance
    } else {
        distance
    }
}

/// Updates the front gap of every positioned car from the car right before it
/// in spline order. The car with the smallest spline position has nobody
/// before it and keeps its previous gap. Returns the number of cars updated.
pub fn update_front_gaps(cars: &mut CarTable, track_meters: f32) -> Result<usize, DirectorError> {
    if !(track_meters > 0.0) || !track_meters.is_finite() {
        return Err(DirectorError::MissingTrack);
    }

    let order = cars.spline_order();
    if order.len() < 2 {
        return Ok(0);
    }

    let mut splines = Vec::with_capacity(order.len());
    for &index in &order {
        let spline = cars.get(index).and_then(|car| car.spline_position)
            .ok_or_else(|| DirectorError::Computation(format!("car {} lost its position", index)))?;
        if !spline.is_finite() {
            return Err(DirectorError::Computation(format!("car {} has spline position {}", index, spline)));
        }
        splines.push(spline);
    }

    for i in 1..order.len() {
        let gap = spline_distance(splines[i - 1], splines[i]) * track_meters;
        if let Some(behind) = cars.get_mut(order[i]) {
            behind.gap_front_meters = gap;
        }
    }

    Ok(order.len() - 1)
}
