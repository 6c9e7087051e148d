use drillkit_core::{
    DrillPoint, Edge, EdgeClassifier, ExtractionJob, GroupKey, RotationAngle, ValidationError,
    Vector3, Workpiece,
};

const JOB: &str = r#"{
    "workpiece": {
        "width": 600.0, "height": 400.0, "thickness": 18.0,
        "corner_points": [[0,0,0],[600,0,0],[600,400,0],[0,400,0]]
    },
    "drill_points": [
        {"position": [0, 32, 9], "diameter": 8.0, "depth": 22.0,
         "extrusion_vector": [1, 0, 0], "layer": "EDGE.DRILL_D8.0_P22.0"},
        {"position": [32, 0, 9], "diameter": 8.0, "depth": 22.0,
         "extrusion_vector": [0, 1, 0]},
        {"position": [37, 37, 18], "diameter": 5.0, "depth": 13.0,
         "extrusion_vector": [0, 0, -1]}
    ]
}"#;

#[test]
fn test_extraction_payload_validates() {
    let job = ExtractionJob::from_json(JOB).unwrap();
    let workpiece = Workpiece::from_extracted(&job.workpiece).unwrap();
    assert_eq!(workpiece.current_width, 600.0);

    let classifier = EdgeClassifier::default();
    let points: Vec<DrillPoint> = job
        .drill_points
        .iter()
        .enumerate()
        .map(|(id, p)| DrillPoint::from_extracted(id, p, &classifier).unwrap())
        .collect();

    let edges: Vec<Edge> = points.iter().map(|p| p.edge).collect();
    assert_eq!(edges, vec![Edge::Right, Edge::Front, Edge::Vertical]);
    assert_eq!(points[1].layer, "");
    assert_eq!(points[2].current_rotation(), RotationAngle::Deg0);
}

#[test]
fn test_drill_point_serializes_contract_fields() {
    let job = ExtractionJob::from_json(JOB).unwrap();
    let mut point =
        DrillPoint::from_extracted(0, &job.drill_points[0], &EdgeClassifier::default()).unwrap();
    point.group_key = Some(GroupKey::new(8.0, Vector3::X));

    let json = serde_json::to_value(&point).unwrap();
    assert_eq!(json["extrusion_vector"], serde_json::json!([1.0, 0.0, 0.0]));
    assert_eq!(json["edge"], "RIGHT");
    assert_eq!(json["original_edge"], serde_json::Value::Null);
    assert_eq!(json["group_key"], serde_json::json!([8.0, [1.0, 0.0, 0.0]]));

    let back: DrillPoint = serde_json::from_value(json).unwrap();
    assert_eq!(back, point);
}

#[test]
fn test_invalid_diameter_is_rejected() {
    let mut job = ExtractionJob::from_json(JOB).unwrap();
    job.drill_points[2].diameter = Some(-5.0);
    let err = DrillPoint::from_extracted(2, &job.drill_points[2], &EdgeClassifier::default())
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidValue {
            point: 2,
            field: "diameter",
            value: -5.0
        }
    );
}

#[test]
fn test_workpiece_serializes_original_dimensions_as_plain_fields() {
    let job = ExtractionJob::from_json(JOB).unwrap();
    let workpiece = Workpiece::from_extracted(&job.workpiece).unwrap();
    let json = serde_json::to_value(&workpiece).unwrap();
    assert_eq!(json["width"], 600.0);
    assert_eq!(json["current_height"], 400.0);
    assert_eq!(json["machine_offset"], serde_json::Value::Null);
}
