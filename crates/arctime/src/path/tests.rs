use super::*;
use chrono::{DateTime, TimeZone, Utc};
use geo::Geometry;
use nalgebra::vector;

fn at(secs: f64) -> DateTime<Utc> {
    crate::time::at_offset(Utc.timestamp_opt(1_000, 0).unwrap(), secs)
}

fn l_route() -> SpatialPath {
    SpatialPath::from_xy(&[(0.0, 0.0), (3.0, 0.0), (3.0, 4.0)]).unwrap()
}

#[test]
fn spatial_path_rejects_single_point_and_tracks_arcs() {
    assert!(SpatialPath::from_xy(&[(1.0, 1.0)]).is_err());
    assert!(SpatialPath::from_xy(&[]).unwrap().is_empty());
    let p = l_route();
    assert_eq!(p.arcs(), &[0.0, 3.0, 7.0]);
    assert_eq!(p.length(), 7.0);
    assert!(p.arcs().windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn spatial_path_interpolates_and_extracts_sub_paths() {
    let p = l_route();
    assert_eq!(p.interpolate(0.0), Some(vector![0.0, 0.0]));
    assert_eq!(p.interpolate(3.0), Some(vector![3.0, 0.0]));
    assert_eq!(p.interpolate(5.0), Some(vector![3.0, 2.0]));
    assert_eq!(p.interpolate(7.5), None);
    assert_eq!(p.interpolate(-0.1), None);

    let sub = p.sub_path_by_arc(1.0, 5.0).unwrap();
    assert_eq!(sub.points(), &[vector![1.0, 0.0], vector![3.0, 0.0], vector![3.0, 2.0]]);
    assert!((sub.length() - 4.0).abs() < 1e-12);

    let half = p.sub_path(0.0, 0.5).unwrap();
    assert!((half.length() - 3.5).abs() < 1e-12);
    assert!(p.sub_path(0.6, 0.5).is_err());
}

#[test]
fn dedupe_and_trace_handle_stationary_paths() {
    let still = SpatialPath::from_xy(&[(2.0, 2.0), (2.0, 2.0), (2.0, 2.0)]).unwrap();
    let d = still.deduped();
    assert_eq!(d.len(), 2);
    assert!(matches!(still.trace(), Some(Geometry::Point(_))));
    assert!(matches!(l_route().trace(), Some(Geometry::LineString(_))));
    assert!(SpatialPath::empty().trace().is_none());
}

#[test]
fn arc_time_path_enforces_causality() {
    let ok = ArcTimePath::new(vec![ArcTimePoint::new(0.0, 0.0), ArcTimePoint::new(2.0, 1.0)]);
    assert!(ok.is_ok());
    let same_time =
        ArcTimePath::new(vec![ArcTimePoint::new(0.0, 1.0), ArcTimePoint::new(2.0, 1.0)]);
    assert!(same_time.is_err());
    let negative_arc =
        ArcTimePath::new(vec![ArcTimePoint::new(-1.0, 0.0), ArcTimePoint::new(2.0, 1.0)]);
    assert!(negative_arc.is_err());
}

#[test]
fn arc_time_path_interpolates_arc() {
    let p = ArcTimePath::new(vec![
        ArcTimePoint::new(0.0, 0.0),
        ArcTimePoint::new(4.0, 2.0),
        ArcTimePoint::new(4.0, 3.0),
        ArcTimePoint::new(10.0, 6.0),
    ])
    .unwrap();
    assert_eq!(p.interpolate_arc(1.0), Some(2.0));
    assert_eq!(p.interpolate_arc(2.5), Some(4.0));
    assert_eq!(p.interpolate_arc(4.5), Some(7.0));
    assert_eq!(p.interpolate_arc(6.5), None);
    assert_eq!(p.max_slope(), 2.0);
}

#[test]
fn compose_inserts_route_corners() {
    let route = l_route();
    let at_path = ArcTimePath::new(vec![
        ArcTimePoint::new(1.0, 0.0),
        ArcTimePoint::new(5.0, 4.0),
        ArcTimePoint::new(5.0, 5.0),
    ])
    .unwrap();
    let traj = Trajectory::compose(&route, &at_path, at(0.0)).unwrap();
    assert_eq!(
        traj.path().points(),
        &[vector![1.0, 0.0], vector![3.0, 0.0], vector![3.0, 2.0], vector![3.0, 2.0]]
    );
    assert_eq!(traj.offsets(), &[0.0, 2.0, 4.0, 5.0]);
    assert_eq!(traj.start_time(), Some(at(0.0)));
    assert_eq!(traj.finish_time(), Some(at(5.0)));
    // round trip back to arc-time keeps the timing
    let back = traj.to_arc_time(at(0.0));
    assert_eq!(back.interpolate_arc(2.0), Some(2.0));
}

#[test]
fn compose_walks_backwards_along_the_route() {
    let route = l_route();
    let at_path =
        ArcTimePath::new(vec![ArcTimePoint::new(5.0, 0.0), ArcTimePoint::new(1.0, 4.0)]).unwrap();
    let traj = Trajectory::compose(&route, &at_path, at(0.0)).unwrap();
    assert_eq!(traj.path().points()[1], vector![3.0, 0.0]);
    assert_eq!(traj.offsets(), &[0.0, 2.0, 4.0]);
}

#[test]
fn compose_drops_corners_that_round_onto_a_vertex_time() {
    let route = SpatialPath::from_xy(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]).unwrap();
    let at_path = ArcTimePath::new(vec![
        ArcTimePoint::new(0.0, 0.0),
        ArcTimePoint::new(1.0 - f64::EPSILON / 2.0, 1.0),
        ArcTimePoint::new(2.0, 2.0),
    ])
    .unwrap();
    let traj = Trajectory::compose(&route, &at_path, at(0.0)).unwrap();
    assert_eq!(traj.offsets(), &[0.0, 1.0, 2.0]);
    assert_eq!(traj.path().points().last(), Some(&vector![1.0, 1.0]));
}

#[test]
fn trajectory_rejects_non_increasing_times() {
    let path = SpatialPath::from_xy(&[(0.0, 0.0), (1.0, 0.0)]).unwrap();
    assert!(Trajectory::new(path.clone(), at(0.0), vec![1.0, 1.0]).is_err());
    assert!(Trajectory::new(path.clone(), at(0.0), vec![0.0]).is_err());
    assert!(Trajectory::from_timestamps(path, &[at(0.0), at(2.0)]).is_ok());
}

#[test]
fn sub_trajectory_and_location_lookup() {
    let path = SpatialPath::from_xy(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]).unwrap();
    let traj = Trajectory::new(path, at(0.0), vec![0.0, 10.0, 20.0]).unwrap();
    assert_eq!(traj.interpolate_location(at(5.0)), Some(vector![5.0, 0.0]));
    assert_eq!(traj.interpolate_location(at(15.0)), Some(vector![10.0, 5.0]));
    assert_eq!(traj.interpolate_location(at(25.0)), None);

    let sub = traj.sub_trajectory(at(5.0), at(15.0)).unwrap();
    assert_eq!(sub.path().points(), &[vector![5.0, 0.0], vector![10.0, 0.0], vector![10.0, 5.0]]);
    assert_eq!(sub.offsets(), &[5.0, 10.0, 15.0]);
    assert!(traj.sub_trajectory(at(30.0), at(40.0)).is_none());
    // clamped to the trajectory's own window
    let clamped = traj.sub_trajectory(at(-5.0), at(50.0)).unwrap();
    assert_eq!(clamped.offsets(), traj.offsets());
}

#[test]
fn location_at_rounded_finish_time_is_the_last_point() {
    let path = SpatialPath::from_xy(&[(0.0, 0.0), (2.0, 0.0)]).unwrap();
    let traj = Trajectory::new(path, at(0.0), vec![0.0, 2.0 / 3.0]).unwrap();
    let finish = traj.finish_time().unwrap();
    assert_eq!(traj.interpolate_location(finish), Some(vector![2.0, 0.0]));
    assert_eq!(traj.interpolate_location(at(0.0)), Some(vector![0.0, 0.0]));
    assert_eq!(traj.interpolate_location(at(1.0)), None);
}

#[test]
fn concat_shares_the_meeting_vertex() {
    let a = Trajectory::new(
        SpatialPath::from_xy(&[(0.0, 0.0), (1.0, 0.0)]).unwrap(),
        at(0.0),
        vec![0.0, 1.0],
    )
    .unwrap();
    let b = Trajectory::new(
        SpatialPath::from_xy(&[(1.0, 0.0), (1.0, 1.0)]).unwrap(),
        at(1.0),
        vec![0.0, 1.0],
    )
    .unwrap();
    let ab = a.concat(&b).unwrap();
    assert_eq!(ab.len(), 3);
    assert_eq!(ab.offsets(), &[0.0, 1.0, 2.0]);
    // overlapping in time is rejected
    assert!(ab.concat(&a).is_err());
    assert_eq!(a.concat(&Trajectory::empty()).unwrap(), a);
}
