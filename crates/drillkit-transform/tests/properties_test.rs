use drillkit_core::{Dimensions, DrillPoint, EdgeClassifier, Point3, RotationAngle, Vector3, Workpiece};
use drillkit_transform::{CoordinateRotator, DrillPointGrouper, MachinePositioner, QuarterTurn};
use proptest::prelude::*;
use std::collections::HashSet;

fn coord() -> impl Strategy<Value = f64> {
    -5000.0f64..5000.0
}

fn unit() -> impl Strategy<Value = f64> {
    prop_oneof![Just(-1.0), Just(0.0), Just(1.0), -1.0f64..1.0]
}

fn extent() -> impl Strategy<Value = f64> {
    1.0f64..3000.0
}

fn drill_points() -> impl Strategy<Value = Vec<DrillPoint>> {
    prop::collection::vec(
        (
            (coord(), coord(), -50.0f64..50.0),
            prop_oneof![Just(5.0), Just(8.0), Just(10.0), 1.0f64..20.0],
            (unit(), unit(), unit()),
        ),
        0..24,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(id, (position, diameter, direction))| {
                DrillPoint::new(
                    id,
                    position.into(),
                    diameter,
                    12.0,
                    direction.into(),
                    &EdgeClassifier::default(),
                )
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn sequential_turns_equal_closed_form(x in coord(), y in coord(), z in coord(), n in 0u32..4) {
        let p = Point3::new(x, y, z);
        let stepped = (0..n).fold(p, |acc, _| acc.rotated_cw());
        let direct = p.rotated_by(RotationAngle::from_quarter_turns(n));
        prop_assert_eq!(stepped.x.to_bits(), direct.x.to_bits());
        prop_assert_eq!(stepped.y.to_bits(), direct.y.to_bits());
        prop_assert_eq!(stepped.z.to_bits(), direct.z.to_bits());
    }

    #[test]
    fn four_rotations_restore_everything(
        width in extent(),
        height in extent(),
        points in drill_points(),
    ) {
        let start = CoordinateRotator::new(Dimensions::new(width, height, 18.0)).unwrap();
        let mut rotator = start;
        let mut current = points.clone();
        for _ in 0..4 {
            rotator = rotator.rotate_once();
            current = rotator.rotate_points(&current).points;
        }

        prop_assert_eq!(rotator.point_c(), start.point_c());
        prop_assert_eq!(rotator.current_dimensions(), start.current_dimensions());
        for (before, after) in points.iter().zip(&current) {
            prop_assert_eq!(before.rotated_position, after.rotated_position);
            prop_assert_eq!(before.direction, after.direction);
            prop_assert_eq!(before.edge, after.edge);
            prop_assert_eq!(before.diameter, after.diameter);
            prop_assert_eq!(before.depth, after.depth);
        }
    }

    #[test]
    fn edge_and_direction_change_together(points in drill_points(), turns in 1u8..4) {
        let rotator = CoordinateRotator::new(Dimensions::new(600.0, 400.0, 18.0))
            .unwrap()
            .with_rotations(turns);
        let classifier = EdgeClassifier::default();
        for point in rotator.rotate_points(&points).points {
            prop_assert_eq!(point.edge, classifier.classify(&point.direction));
            prop_assert_eq!(point.original_edge, Some(classifier.classify(&point.original_direction)));
        }
    }

    #[test]
    fn grouping_partitions_input(points in drill_points()) {
        let grouping = DrillPointGrouper::new().group(&points);
        prop_assert_eq!(grouping.groups.total_points(), points.len());

        let mut seen = HashSet::new();
        for group in &grouping.groups {
            for point in &group.points {
                prop_assert!(seen.insert(point.id));
                prop_assert_eq!(point.group_key, Some(group.key));
                prop_assert_eq!(point.diameter, group.key.diameter);
            }
            let ids: Vec<_> = group.points.iter().map(|p| p.id).collect();
            let mut sorted = ids.clone();
            sorted.sort_unstable();
            prop_assert_eq!(ids, sorted);
        }
        prop_assert_eq!(seen.len(), points.len());
    }

    #[test]
    fn positioning_is_idempotent(width in extent(), height in extent(), turns in 0u8..4, points in drill_points()) {
        let rotator = CoordinateRotator::new(Dimensions::new(width, height, 18.0))
            .unwrap()
            .with_rotations(turns);
        let workpiece = rotator.apply_to_workpiece(
            &Workpiece::rectangle(Dimensions::new(width, height, 18.0)).unwrap(),
        );
        let rotated = rotator.rotate_points(&points).points;
        let positioner = MachinePositioner::default();

        let once = positioner.position_for_top_left_origin(&workpiece, &rotated).unwrap();
        let twice = positioner.position_for_top_left_origin(&once.workpiece, &once.points).unwrap();
        prop_assert_eq!(&once.points, &twice.points);
        prop_assert_eq!(&once.workpiece, &twice.workpiece);
    }

    #[test]
    fn machine_corners_span_the_panel(width in extent(), height in extent(), turns in 0u8..4) {
        let rotator = CoordinateRotator::new(Dimensions::new(width, height, 18.0))
            .unwrap()
            .with_rotations(turns);
        let workpiece = rotator.apply_to_workpiece(
            &Workpiece::rectangle(Dimensions::new(width, height, 18.0)).unwrap(),
        );
        let result = MachinePositioner::new(None)
            .position_for_top_left_origin(&workpiece, &[])
            .unwrap();

        let current = rotator.current_dimensions();
        for corner in result.workpiece.machine_corner_points.unwrap() {
            prop_assert!(corner.x >= 0.0 && corner.x <= current.width);
            prop_assert!(corner.y <= 0.0 && corner.y >= -current.height);
        }
    }
}

#[test]
fn direction_rotation_matches_vector_rule() {
    let v = Vector3::new(0.25, -0.5, 0.75);
    assert_eq!(v.rotated_cw(), Vector3::new(-0.5, -0.25, 0.75));
}
