use super::*;
use crate::path::SpatialPath;
use crate::forbidden::build_forbidden_regions;
use crate::scenario::{
    crossing_obstacles, route_scenario, square, straight_route, CrossingCfg, RouteCfg,
};
use crate::time::at_offset;
use crate::validate::validate_dynamic;
use chrono::TimeZone;
use nalgebra::vector;
use proptest::prelude::*;

fn base() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

fn at(secs: f64) -> DateTime<Utc> {
    at_offset(base(), secs)
}

fn obstacle(half: f64, pts: &[(f64, f64)], offsets: Vec<f64>) -> Arc<DynamicObstacle> {
    let traj = Trajectory::new(SpatialPath::from_xy(pts).unwrap(), base(), offsets).unwrap();
    Arc::new(DynamicObstacle::new(square(half), traj).unwrap())
}

/// Half-width 1 square crossing arc 5 of the x-axis during [2, 3].
fn crossing() -> Arc<DynamicObstacle> {
    obstacle(1.0, &[(5.0, -3.0), (5.0, 3.0)], vec![1.0, 4.0])
}

fn minimum(
    route: &SpatialPath,
    obstacles: &[Arc<DynamicObstacle>],
    max_speed: f64,
    earliest: f64,
    latest: f64,
    buffer_ms: i64,
) -> PlanResult<Option<Trajectory>> {
    plan_minimum_time(
        route,
        obstacles,
        max_speed,
        base(),
        at(earliest),
        at(latest),
        Duration::milliseconds(buffer_ms),
    )
}

fn finish_secs(traj: &Trajectory) -> f64 {
    secs_between(base(), traj.finish_time().unwrap())
}

#[test]
fn free_route_at_fixed_time_is_a_single_leg() {
    let traj = plan_fixed_time(&straight_route(10.0), &[], 2.0, base(), at(5.0))
        .unwrap()
        .unwrap();
    assert_eq!(traj.path().points(), &[vector![0.0, 0.0], vector![10.0, 0.0]]);
    assert_eq!(traj.times(), vec![at(0.0), at(5.0)]);
}

#[test]
fn crossing_with_slack_waits_for_the_obstacle() {
    let obs = [crossing()];
    let traj = plan_fixed_time(&straight_route(10.0), &obs, 2.0, base(), at(6.0))
        .unwrap()
        .unwrap();
    assert_eq!(traj.finish_time(), Some(at(6.0)));
    for t in [2.0, 2.25, 2.5, 2.75, 3.0] {
        let x = traj.interpolate_location(at(t)).unwrap().x;
        assert!(x <= 4.0 + 1e-9 || x >= 6.0 - 1e-9, "x = {x} at t = {t}");
    }
    assert!(validate_dynamic(&traj, &obs));
}

#[test]
fn crossing_without_slack_is_infeasible() {
    let obs = [crossing()];
    let res = plan_fixed_time(&straight_route(10.0), &obs, 2.0, base(), at(5.0)).unwrap();
    assert!(res.is_none());
    let res = plan_fixed_time(&straight_route(10.0), &obs, 2.0, base(), at(5.5)).unwrap();
    assert!(res.is_none());
}

#[test]
fn free_route_minimum_time_hits_earliest_bound() {
    let traj = minimum(&straight_route(10.0), &[], 2.0, 5.0, 20.0, 1_000)
        .unwrap()
        .unwrap();
    assert_eq!(traj.finish_time(), Some(at(5.0)));
    // a slow earliest bound: travel slower, still exactly on time
    let traj = minimum(&straight_route(10.0), &[], 2.0, 12.0, 20.0, 0)
        .unwrap()
        .unwrap();
    assert_eq!(traj.finish_time(), Some(at(12.0)));
}

#[test]
fn minimum_time_behind_a_crossing_is_six() {
    let traj = minimum(&straight_route(10.0), &[crossing()], 2.0, 5.0, 20.0, 500)
        .unwrap()
        .unwrap();
    assert!((finish_secs(&traj) - 6.0).abs() < 1e-6);
    assert!(validate_dynamic(&traj, &[crossing()]));
}

#[test]
fn dwell_buffer_delays_arrival_past_a_parked_obstacle() {
    // parked on the destination during [6, 8], covering arcs [9, 10]
    let parked = obstacle(1.0, &[(10.0, 0.0), (10.0, 0.0)], vec![6.0, 8.0]);
    let traj = minimum(&straight_route(10.0), &[parked.clone()], 2.0, 5.0, 20.0, 2_000)
        .unwrap()
        .unwrap();
    assert!((finish_secs(&traj) - 8.5).abs() < 1e-6);
    assert!(validate_dynamic(&traj, &[parked.clone()]));

    // without a buffer arriving at 5 is fine: the obstacle only shows up at 6
    let traj = minimum(&straight_route(10.0), &[parked], 2.0, 5.0, 20.0, 0)
        .unwrap()
        .unwrap();
    assert!((finish_secs(&traj) - 5.0).abs() < 1e-9);
}

#[test]
fn following_an_obstacle_along_the_route() {
    // leads the agent by 3 at speed 1; its tail reaches the route end at t = 7.5
    let ahead = obstacle(0.5, &[(3.0, 0.0), (13.0, 0.0)], vec![0.0, 10.0]);
    let traj = minimum(&straight_route(10.0), &[ahead.clone()], 2.0, 0.0, 30.0, 0)
        .unwrap()
        .unwrap();
    assert!((finish_secs(&traj) - 7.5).abs() < 1e-6);
    assert!(validate_dynamic(&traj, &[ahead]));
}

#[test]
fn following_an_obstacle_along_a_diagonal_route() {
    let route = SpatialPath::from_xy(&[(0.0, 0.0), (6.0, 8.0)]).unwrap();
    let ahead = obstacle(0.5, &[(1.8, 2.4), (7.8, 10.4)], vec![0.0, 10.0]);
    let traj = minimum(&route, &[ahead.clone()], 2.0, 0.0, 30.0, 0)
        .unwrap()
        .unwrap();
    assert!((finish_secs(&traj) - 7.625).abs() < 1e-6);
    assert!(validate_dynamic(&traj, &[ahead]));
}

#[test]
fn waiting_out_an_obstacle_parked_on_a_corner() {
    let route = SpatialPath::from_xy(&[(0.0, 0.0), (3.0, 4.0), (6.0, 0.0)]).unwrap();
    let parked = obstacle(0.5, &[(3.0, 4.0), (3.0, 4.0)], vec![1.0, 4.0]);
    let obs = [parked];

    let fixed = plan_fixed_time(&route, &obs, 2.0, base(), at(10.0))
        .unwrap()
        .unwrap();
    assert!(validate_dynamic(&fixed, &obs));

    // wait at arc 4.375 until t = 4, then run the last 5.625 at speed 2
    let fastest = minimum(&route, &obs, 2.0, 0.0, 30.0, 0).unwrap().unwrap();
    assert!((finish_secs(&fastest) - 6.8125).abs() < 1e-6);
    assert!(validate_dynamic(&fastest, &obs));
    let corner = fastest.interpolate_location(at(2.5)).unwrap();
    assert!((corner - vector![3.0, 4.0]).norm() >= 0.625 - 1e-6);
}

#[test]
fn multi_segment_route_with_mixed_obstacles() {
    let route =
        SpatialPath::from_xy(&[(0.0, 0.0), (4.0, 3.0), (9.0, 3.0), (9.0, 9.0)]).unwrap();
    let obs = [
        obstacle(0.6, &[(4.0, 3.0), (4.0, 3.0)], vec![2.0, 5.0]),
        obstacle(0.5, &[(4.0, 3.0), (9.0, 3.0)], vec![0.0, 5.0]),
        obstacle(0.4, &[(9.0, 9.0), (9.0, 3.0)], vec![3.0, 9.0]),
    ];
    let regions = build_forbidden_regions(&route, base(), &obs).unwrap();
    assert_eq!(regions.len(), 3);
    assert!(regions.iter().all(|r| !r.is_empty()));

    let fixed = plan_fixed_time(&route, &obs, 2.0, base(), at(30.0)).unwrap();
    if let Some(traj) = fixed {
        assert!(validate_dynamic(&traj, &obs));
    }
    let fastest = minimum(&route, &obs, 2.0, 0.0, 40.0, 500).unwrap();
    let traj = fastest.unwrap();
    assert!(validate_dynamic(&traj, &obs));
}

#[test]
fn window_missed_is_infeasible() {
    // 10 units at speed 2 cannot finish before 5
    let res = minimum(&straight_route(10.0), &[], 2.0, 1.0, 4.0, 0).unwrap();
    assert!(res.is_none());
}

#[test]
fn corner_routes_keep_their_corners() {
    let route = SpatialPath::from_xy(&[(0.0, 0.0), (6.0, 0.0), (6.0, 8.0)]).unwrap();
    let traj = plan_fixed_time(&route, &[], 2.0, base(), at(14.0))
        .unwrap()
        .unwrap();
    assert_eq!(traj.len(), 3);
    assert_eq!(traj.path().points()[1], vector![6.0, 0.0]);
    assert!((traj.offsets()[1] - 6.0).abs() < 1e-12);
}

#[test]
fn duplicate_route_points_are_ignored() {
    let route = SpatialPath::from_xy(&[(0.0, 0.0), (0.0, 0.0), (10.0, 0.0), (10.0, 0.0)]).unwrap();
    let traj = plan_fixed_time(&route, &[], 2.0, base(), at(5.0))
        .unwrap()
        .unwrap();
    assert_eq!(traj.len(), 2);
}

#[test]
fn zero_duration_window_is_infeasible_not_an_error() {
    let res = plan_fixed_time(&straight_route(10.0), &[], 2.0, base(), base()).unwrap();
    assert!(res.is_none());
}

#[test]
fn invalid_inputs_are_rejected() {
    let route = straight_route(10.0);
    for speed in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = plan_fixed_time(&route, &[], speed, base(), at(5.0)).unwrap_err();
        assert!(matches!(err, PlanError::InvalidArgument(_)), "speed {speed}");
    }
    let still = SpatialPath::from_xy(&[(1.0, 1.0), (1.0, 1.0)]).unwrap();
    assert!(plan_fixed_time(&still, &[], 1.0, base(), at(5.0)).is_err());
    assert!(plan_fixed_time(&SpatialPath::empty(), &[], 1.0, base(), at(5.0)).is_err());
    assert!(plan_fixed_time(&route, &[], 1.0, at(5.0), base()).is_err());
    assert!(minimum(&route, &[], 1.0, 9.0, 8.0, 0).is_err());
    assert!(minimum(&route, &[], 1.0, 1.0, 8.0, -1).is_err());
}

#[test]
fn planning_input_reuses_one_setup_for_both_modes() {
    let input = PlanningInput::new(&straight_route(10.0), 2.0, base())
        .unwrap()
        .with_obstacles(vec![crossing()])
        .with_cfg(GeomCfg::default());
    assert_eq!(input.route().length(), 10.0);
    let fixed = plan(&input, &FinishCondition::Fixed { finish: at(7.0) }).unwrap();
    assert_eq!(fixed.unwrap().finish_time(), Some(at(7.0)));
    let fastest = plan(
        &input,
        &FinishCondition::Minimum {
            earliest: base(),
            latest: at(30.0),
            buffer: Duration::zero(),
        },
    )
    .unwrap()
    .unwrap();
    assert!((finish_secs(&fastest) - 6.0).abs() < 1e-6);
}

fn scenario_cfg(count: usize) -> CrossingCfg {
    CrossingCfg {
        route_length: 12.0,
        count,
        ..CrossingCfg::default()
    }
}

fn route_cfg(count: usize) -> RouteCfg {
    RouteCfg {
        count,
        ..RouteCfg::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn polyline_routes_plan_cleanly(seed in any::<u64>(), count in 1usize..5) {
        let (route, obs) = route_scenario(&route_cfg(count), seed, base());
        let fastest = minimum(&route, &obs, 2.0, 0.0, 120.0, 500);
        prop_assert!(fastest.is_ok(), "{:?}", fastest);
        if let Ok(Some(traj)) = fastest {
            prop_assert!(validate_dynamic(&traj, &obs));
        }
        let slow = route.length() / 2.0 + 20.0;
        let fixed = plan_fixed_time(&route, &obs, 2.0, base(), at(slow));
        prop_assert!(fixed.is_ok(), "{:?}", fixed);
        if let Ok(Some(traj)) = fixed {
            prop_assert!(validate_dynamic(&traj, &obs));
        }
    }

    #[test]
    fn no_obstacles_always_feasible(len in 0.5f64..50.0, speed in 0.1f64..5.0, slack in 1e-3f64..10.0) {
        let route = straight_route(len);
        let finish = at(len / speed + slack);
        let traj = plan_fixed_time(&route, &[], speed, base(), finish).unwrap();
        prop_assert!(traj.is_some());
    }

    #[test]
    fn planned_trajectories_are_causal_bounded_and_clear(seed in any::<u64>(), count in 0usize..5) {
        let cfg = scenario_cfg(count);
        let obs = crossing_obstacles(&cfg, seed, base());
        let route = straight_route(cfg.route_length);
        let speed = 2.0;
        let res = minimum(&route, &obs, speed, 0.0, 60.0, 500).unwrap();
        if let Some(traj) = res {
            let pts = traj.path().points();
            for (w, o) in pts.windows(2).zip(traj.offsets().windows(2)) {
                prop_assert!(o[1] > o[0]);
                let dist = (w[1] - w[0]).norm();
                prop_assert!(dist <= speed * (o[1] - o[0]) * (1.0 + 1e-9) + 1e-12);
            }
            prop_assert_eq!(pts.first().copied(), route.start());
            prop_assert_eq!(pts.last().copied(), route.finish());
            prop_assert!(validate_dynamic(&traj, &obs));
        }
    }

    #[test]
    fn minimum_time_lies_in_window_and_beats_fixed(seed in any::<u64>(), count in 1usize..4) {
        let cfg = scenario_cfg(count);
        let obs = crossing_obstacles(&cfg, seed, base());
        let route = straight_route(cfg.route_length);
        let (earliest, latest) = (4.0, 60.0);
        if let Some(fast) = minimum(&route, &obs, 2.0, earliest, latest, 0).unwrap() {
            let t = finish_secs(&fast);
            prop_assert!(t >= earliest - 1e-9 && t <= latest + 1e-9);
            // no fixed-time plan may finish noticeably earlier
            let sooner = (t - 0.25).max(earliest);
            if sooner < t - 1e-6 {
                let fixed = plan_fixed_time(&route, &obs, 2.0, base(), at(sooner)).unwrap();
                prop_assert!(fixed.is_none(), "fixed plan at {} beats minimum {}", sooner, t);
            }
        }
    }
}
