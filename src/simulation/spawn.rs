use crate::agents::{Vehicle, VehicleID, VehicleKind};
use crate::topology::junction::Junction;
use crate::topology::road::Lane;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Poisson};

/// Number of arrivals on a lane this tick, drawn from a Poisson process.
///
/// `rate_per_tick` is the lane's arrival rate λ (vehicles/second) scaled by
/// the time step, so the long-run spawn count matches λ·t at any Δt.
pub fn draw_arrivals(rng: &mut StdRng, rate_per_tick: f64) -> u64 {
    if rate_per_tick <= 0.0 || !rate_per_tick.is_finite() {
        return 0;
    }
    match Poisson::new(rate_per_tick) {
        Ok(distribution) => distribution.sample(rng) as u64,
        Err(_) => 0,
    }
}

/// Builds one freshly spawned vehicle at the far end of the lane.
///
/// Initial velocity is uniform in `[0.5·Vmax, 1.2·Vmax]` - arrivals may enter
/// hot and brake down to the lane ceiling. The destination lane is a uniform
/// draw from the controlling light's destinations; lanes without a light
/// spawn through-running vehicles with no destination.
pub fn spawn_vehicle(
    junction: &Junction,
    lane: &Lane,
    id: VehicleID,
    rng: &mut StdRng,
) -> Vehicle {
    let max_velocity = lane.get_max_velocity();
    let velocity = rng.random_range(0.5 * max_velocity..=1.2 * max_velocity);

    let destination = junction
        .get_light_by_origin_lane(lane.get_id())
        .and_then(|light| {
            let destinations = light.get_destinations();
            if destinations.is_empty() {
                None
            } else {
                Some(destinations[rng.random_range(0..destinations.len())])
            }
        });

    let mut builder = Vehicle::new(id)
        .with_kind(VehicleKind::Normal)
        .with_origin_lane(lane.get_id())
        .with_distance(lane.get_length())
        .with_velocity(velocity);
    if let Some(destination) = destination {
        builder = builder.with_destination_lane(destination);
    }
    builder.build()
}
