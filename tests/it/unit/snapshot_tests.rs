//! Snapshot tests for the stored marker format, using the insta crate.
//!
//! The JSON text is produced with `serde_json::to_string_pretty` and compared
//! as an inline snapshot. To update after an intentional format change:
//! ```sh
//! cargo insta test --accept
//! ```

use occlude::{GroupId, ImageSource, Marker, Rect, Transform};

#[test]
fn snapshot_marker_list_format() {
    let mut grouped = Marker::from_rect(Rect::new(100.0, 100.0, 200.0, 150.0));
    grouped.group_id = Some(GroupId::new("g-1"));
    let mut locked = Marker::from_rect(Rect::new(500.0, 500.0, 50.0, 50.0));
    locked.group_id = Some(GroupId::new("g-1"));
    locked.is_locked = Some(true);
    let plain = Marker::from_rect(Rect::new(0.5, 10.0, 20.0, 30.0));

    let json = serde_json::to_string_pretty(&vec![grouped, locked, plain]).unwrap();
    insta::assert_snapshot!(json, @r#"
    [
      {
        "x": 100.0,
        "y": 100.0,
        "width": 200.0,
        "height": 150.0,
        "groupId": "g-1"
      },
      {
        "x": 500.0,
        "y": 500.0,
        "width": 50.0,
        "height": 50.0,
        "groupId": "g-1",
        "isLocked": true
      },
      {
        "x": 0.5,
        "y": 10.0,
        "width": 20.0,
        "height": 30.0
      }
    ]
    "#);
}

#[test]
fn snapshot_transform_format() {
    let transform = Transform {
        scale: 2.0,
        translate_x: -40.0,
        translate_y: 12.5,
    };
    let json = serde_json::to_string(&transform).unwrap();
    insta::assert_snapshot!(json, @r#"{"scale":2.0,"translateX":-40.0,"translateY":12.5}"#);
}

#[test]
fn snapshot_image_source_format() {
    let sources = vec![
        ImageSource::Bytes(vec![0x89, 0x50, 0x4e, 0x47]),
        ImageSource::Uri("file:///decks/anatomy/heart.png".to_string()),
    ];
    let json = serde_json::to_string(&sources).unwrap();
    insta::assert_snapshot!(
        json,
        @r#"[{"kind":"bytes","value":"iVBORw=="},{"kind":"uri","value":"file:///decks/anatomy/heart.png"}]"#
    );
}
