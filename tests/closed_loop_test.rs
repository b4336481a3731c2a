use junction_sim_core::control::Tunables;
use junction_sim_core::coordinator::{Coordinator, CoordinatorConfig, RunState};
use junction_sim_core::phases::compatibility::are_compatible;
use junction_sim_core::simulation::config::SimulationConfig;
use junction_sim_core::simulation::states::ObservationSnapshot;
use junction_sim_core::traffic_lights::states::LightState;
use junction_sim_core::utils::fixtures::{reference_four_arm_description, reference_four_arm_parts};
use std::time::Duration;

/// A fast closed-loop configuration: 5 ms sim ticks, 20 ms control ticks.
fn fast_config(strategy: &str) -> CoordinatorConfig {
    let strategy = junction_sim_core::control::StrategyKind::from_str(strategy).unwrap();
    CoordinatorConfig::new()
        .with_simulation(
            SimulationConfig::new()
                .with_time_step(0.005)
                .with_seed(42)
                .build(),
        )
        .with_control_period(0.02)
        .with_amber_duration(0.5)
        .with_strategy(strategy)
        .with_tunables(Tunables::default().with_period(0.2))
        .build()
}

/// Collects the latest snapshot after letting the loop run for a while.
async fn run_for(coordinator: &Coordinator, duration: Duration) -> Vec<ObservationSnapshot> {
    let mut snapshots = Vec::new();
    let mut receiver = coordinator.snapshots();
    let deadline = tokio::time::Instant::now() + duration;
    while tokio::time::Instant::now() < deadline {
        if receiver.changed().await.is_err() {
            break;
        }
        if let Some(snapshot) = receiver.borrow().clone() {
            snapshots.push(snapshot);
        }
        if tokio::time::Instant::now() >= deadline {
            break;
        }
    }
    snapshots
}

#[tokio::test]
async fn test_closed_loop_produces_snapshots_and_stops_cleanly() {
    let mut coordinator =
        Coordinator::build(reference_four_arm_description(0.5), fast_config("smart_fair")).unwrap();
    coordinator.start().await.unwrap();

    let snapshots = run_for(&coordinator, Duration::from_millis(600)).await;
    assert!(
        snapshots.len() > 10,
        "expected a steady snapshot stream, got {}",
        snapshots.len()
    );
    // Steps increase monotonically and simulated time follows them.
    for pair in snapshots.windows(2) {
        assert!(pair[1].step > pair[0].step);
    }
    let last = snapshots.last().unwrap();
    assert!((last.sim_time - last.step as f64 * 0.005).abs() < 1e-9);

    coordinator.stop().await.unwrap();
    assert_eq!(coordinator.get_state(), RunState::Stopped);
    assert_eq!(coordinator.tick_error_count(), 0);
}

#[tokio::test]
async fn test_controller_decisions_reach_the_lights() {
    let mut coordinator =
        Coordinator::build(reference_four_arm_description(0.5), fast_config("round_robin")).unwrap();
    coordinator.start().await.unwrap();

    let snapshots = run_for(&coordinator, Duration::from_millis(900)).await;
    coordinator.stop().await.unwrap();

    // The controller must have turned some lights green...
    let saw_green = snapshots.iter().any(|snapshot| {
        snapshot
            .lights
            .iter()
            .any(|light| light.state == LightState::Green)
    });
    assert!(saw_green, "no green light ever commanded");

    // ...and state changes must have smoothed through amber.
    let saw_amber = snapshots
        .iter()
        .any(|snapshot| snapshot.lights.iter().any(|light| light.in_amber));
    assert!(saw_amber, "no amber transition observed");
}

#[tokio::test]
async fn test_green_lights_are_always_pairwise_compatible() {
    // Safety invariant: whatever the controller does, the set of green
    // lights in every published snapshot must be conflict-free.
    let (roads, lights) = reference_four_arm_parts();
    let mut coordinator =
        Coordinator::build(reference_four_arm_description(1.0), fast_config("volume_based")).unwrap();
    coordinator.start().await.unwrap();

    let snapshots = run_for(&coordinator, Duration::from_millis(900)).await;
    coordinator.stop().await.unwrap();

    for snapshot in &snapshots {
        let greens: Vec<_> = snapshot
            .lights
            .iter()
            .filter(|light| light.state == LightState::Green)
            .map(|light| light.id)
            .collect();
        for (index, first) in greens.iter().enumerate() {
            for second in greens.iter().skip(index + 1) {
                let first_light = lights.iter().find(|l| l.get_id() == *first).unwrap();
                let second_light = lights.iter().find(|l| l.get_id() == *second).unwrap();
                assert!(
                    are_compatible(&roads, first_light, second_light).unwrap(),
                    "conflicting greens {} and {} in step {}",
                    first,
                    second,
                    snapshot.step
                );
            }
        }
    }
}

#[tokio::test]
async fn test_strategy_swap_mid_run() {
    let mut coordinator =
        Coordinator::build(reference_four_arm_description(0.5), fast_config("round_robin")).unwrap();
    coordinator.start().await.unwrap();

    let before = run_for(&coordinator, Duration::from_millis(300)).await;
    assert!(!before.is_empty());

    coordinator
        .set_strategy("smart_fair", Tunables::default().with_hysteresis(0.0))
        .unwrap();
    assert!(coordinator.set_strategy("nonsense", Tunables::default()).is_err());

    let after = run_for(&coordinator, Duration::from_millis(300)).await;
    coordinator.stop().await.unwrap();
    assert!(
        !after.is_empty(),
        "loop must keep publishing after a strategy swap"
    );
}

#[tokio::test]
async fn test_topology_update_mid_run() {
    let mut coordinator =
        Coordinator::build(reference_four_arm_description(0.5), fast_config("smart_fair")).unwrap();
    coordinator.start().await.unwrap();

    let _ = run_for(&coordinator, Duration::from_millis(200)).await;

    // Swap in a quieter copy of the same junction shape.
    coordinator
        .update_topology(reference_four_arm_description(0.1))
        .unwrap();
    let after = run_for(&coordinator, Duration::from_millis(400)).await;
    coordinator.stop().await.unwrap();

    assert!(!after.is_empty(), "loop must survive a topology swap");
    assert_eq!(coordinator.tick_error_count(), 0);
}
