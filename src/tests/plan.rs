use super::{Change, ChangePlan};
use std::path::PathBuf;

#[test]
fn test_plan_json_shape() {
    let plan = ChangePlan {
        changes: vec![Change {
            file: PathBuf::from("nickel.patch"),
            name: "Hide recommendations".to_string(),
            enable: true,
        }],
    };

    let json = serde_json::to_value(&plan).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "changes": [
                {"file": "nickel.patch", "name": "Hide recommendations", "enable": true}
            ]
        })
    );
}

#[test]
fn test_plan_parses_from_hand_written_json() {
    let plan: ChangePlan = serde_json::from_str(
        r#"{"changes": [{"file": "a.patch", "name": "A", "enable": false}]}"#,
    )
    .unwrap();

    assert!(!plan.is_empty());
    assert_eq!(plan.changes[0].file, PathBuf::from("a.patch"));
    assert!(!plan.changes[0].enable);
}
