use crate::agents::Vehicle;
use crate::topology::road::Lane;

/// Lower bound of the safe following gap, regardless of speed.
pub const SAFE_GAP_FLOOR: f64 = 60.0;
/// A halting signal affects vehicles whose stop-line distance lies inside
/// `[STOP_WINDOW_NEAR, STOP_WINDOW_FAR)`. Closer vehicles are already
/// committed to the junction; farther ones keep rolling and brake later.
pub const STOP_WINDOW_NEAR: f64 = 5.0;
pub const STOP_WINDOW_FAR: f64 = 40.0;

/// Safe following gap for the given speed: the braking distance
/// `v² / (2·A⁻)`, floored at [`SAFE_GAP_FLOOR`].
pub fn safe_gap(velocity: f64, max_deceleration: f64) -> f64 {
    (velocity * velocity / (2.0 * max_deceleration)).max(SAFE_GAP_FLOOR)
}

/// Distance to the nearest vehicle ahead in the same lane (smaller stop-line
/// distance), or infinity when the lane is clear ahead.
pub fn gap_ahead(vehicles: &[Vehicle], index: usize) -> f64 {
    let own_distance = vehicles[index].distance;
    vehicles
        .iter()
        .enumerate()
        .filter(|(other_index, other)| *other_index != index && other.distance < own_distance)
        .map(|(_, other)| own_distance - other.distance)
        .fold(f64::INFINITY, f64::min)
}

/// The velocity the vehicle wants to reach this tick.
///
/// A halting signal (red or amber) pins the desired velocity to zero inside
/// the stop window. Otherwise the vehicle follows the leader proportionally
/// when the gap is below the safe gap, and aims for the lane ceiling when the
/// road ahead is clear.
pub fn desired_velocity(vehicle: &Vehicle, lane: &Lane, signal_halts: bool, gap: f64) -> f64 {
    let distance = vehicle.distance;
    if signal_halts && (STOP_WINDOW_NEAR..STOP_WINDOW_FAR).contains(&distance) {
        return 0.0;
    }
    let max_velocity = lane.get_max_velocity();
    let braking_gap = safe_gap(vehicle.velocity, lane.get_max_deceleration());
    if gap < braking_gap {
        (vehicle.velocity * gap / braking_gap).min(max_velocity).max(0.0)
    } else {
        max_velocity
    }
}

/// Advances one vehicle by one tick.
///
/// The acceleration needed to reach the desired velocity is clamped to the
/// lane's kinematic limits, the velocity is updated first and the stop-line
/// distance then decreases by the travelled displacement.
pub fn advance(vehicle: &mut Vehicle, lane: &Lane, signal_halts: bool, gap: f64, time_step: f64) {
    let target = desired_velocity(vehicle, lane, signal_halts, gap);
    let acceleration = ((target - vehicle.velocity) / time_step)
        .clamp(-lane.get_max_deceleration(), lane.get_max_acceleration());
    vehicle.velocity += acceleration * time_step;
    vehicle.distance -=
        vehicle.velocity * time_step + 0.5 * acceleration * time_step * time_step;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::road::Lane;

    fn test_lane() -> Lane {
        Lane::new(111)
            .with_length(500.0)
            .with_max_velocity(60.0)
            .with_max_acceleration(10.0)
            .with_max_deceleration(20.0)
            .build()
    }

    fn vehicle_at(distance: f64, velocity: f64) -> Vehicle {
        Vehicle::new(1)
            .with_origin_lane(111)
            .with_distance(distance)
            .with_velocity(velocity)
            .build()
    }

    #[test]
    fn test_safe_gap_floor() {
        assert_eq!(safe_gap(0.0, 20.0), SAFE_GAP_FLOOR);
        assert_eq!(safe_gap(10.0, 20.0), SAFE_GAP_FLOOR);
        // 80² / (2·20) = 160 > floor
        assert_eq!(safe_gap(80.0, 20.0), 160.0);
    }

    #[test]
    fn test_gap_ahead() {
        let vehicles = vec![vehicle_at(100.0, 0.0), vehicle_at(70.0, 0.0), vehicle_at(250.0, 0.0)];
        assert_eq!(gap_ahead(&vehicles, 0), 30.0);
        assert_eq!(gap_ahead(&vehicles, 1), f64::INFINITY);
        assert_eq!(gap_ahead(&vehicles, 2), 150.0);
    }

    #[test]
    fn test_red_light_pins_desired_velocity_inside_window() {
        let lane = test_lane();
        let inside = vehicle_at(20.0, 30.0);
        assert_eq!(desired_velocity(&inside, &lane, true, f64::INFINITY), 0.0);
        // At the near edge the vehicle is already committed.
        let committed = vehicle_at(4.0, 30.0);
        assert_eq!(
            desired_velocity(&committed, &lane, true, f64::INFINITY),
            lane.get_max_velocity()
        );
        // Beyond the window the vehicle keeps rolling for now.
        let far = vehicle_at(80.0, 30.0);
        assert_eq!(
            desired_velocity(&far, &lane, true, f64::INFINITY),
            lane.get_max_velocity()
        );
    }

    #[test]
    fn test_follower_slows_proportionally() {
        let lane = test_lane();
        let follower = vehicle_at(100.0, 40.0);
        // braking gap = max(60, 1600/40) = 60; gap 30 → want 40·30/60 = 20
        let target = desired_velocity(&follower, &lane, false, 30.0);
        assert!((target - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_acceleration_is_clamped() {
        let lane = test_lane();
        let dt = 1.0 / 30.0;
        let mut vehicle = vehicle_at(400.0, 0.0);
        advance(&mut vehicle, &lane, false, f64::INFINITY, dt);
        // One tick of full acceleration: Δv = A⁺·Δt
        let dv = vehicle.velocity;
        assert!((dv - lane.get_max_acceleration() * dt).abs() < 1e-9);

        let mut braking = vehicle_at(20.0, 50.0);
        advance(&mut braking, &lane, true, f64::INFINITY, dt);
        let dv = 50.0 - braking.velocity;
        assert!(dv <= lane.get_max_deceleration() * dt + 1e-9);
    }

    #[test]
    fn test_velocity_never_negative() {
        let lane = test_lane();
        let dt = 1.0 / 30.0;
        let mut vehicle = vehicle_at(10.0, 0.3);
        for _ in 0..100 {
            advance(&mut vehicle, &lane, true, f64::INFINITY, dt);
            assert!(vehicle.velocity >= -1e-12);
        }
    }

    #[test]
    fn test_vehicle_converges_before_stop_line_on_red() {
        // Scenario: single vehicle approaching a red light from the lane end.
        // Uses the default lane physics, whose braking distance fits inside
        // the stop window.
        let lane = Lane::new(111).build();
        let dt = 1.0 / 30.0;
        let mut vehicle = vehicle_at(lane.get_length(), lane.get_max_velocity());
        // L/Vmax + Vmax/A⁻ seconds is the convergence budget.
        let budget =
            lane.get_length() / lane.get_max_velocity() + lane.get_max_velocity() / lane.get_max_deceleration();
        let steps = (budget / dt).ceil() as usize + 1;
        for _ in 0..steps {
            advance(&mut vehicle, &lane, true, f64::INFINITY, dt);
            assert!(
                vehicle.distance > 0.0,
                "vehicle must never cross a red stop line"
            );
        }
        assert!(vehicle.velocity < 1.0, "velocity should have collapsed");
        assert!(
            (STOP_WINDOW_NEAR..STOP_WINDOW_FAR).contains(&vehicle.distance),
            "vehicle should be held inside the stop window, got {}",
            vehicle.distance
        );
    }
}
