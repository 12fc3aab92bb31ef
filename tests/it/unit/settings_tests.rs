//! Settings files on disk.

use occlude::settings::EngineSettings;
use occlude::{OcclusionSurface, SettingsError};
use occlude::{Contact, ImageId, ImageMetadata, SurfaceOutcome};

#[test]
fn test_save_then_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");
    let settings = EngineSettings {
        undo_depth: 4,
        tap_slop: 6.0,
        ..EngineSettings::default()
    };
    settings.save_to(&path).unwrap();

    let loaded = EngineSettings::load_from(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{ "min_scale": 2.0, "max_scale": 1.0 }"#).unwrap();

    match EngineSettings::load_from(&path) {
        Err(SettingsError::Invalid { field, .. }) => assert_eq!(field, "max_scale"),
        other => panic!("expected invalid max_scale, got {other:?}"),
    }
}

#[test]
fn test_malformed_json_is_a_parse_error() {
    assert!(matches!(
        EngineSettings::from_json("{ not json"),
        Err(SettingsError::Json(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        EngineSettings::load_from(&dir.path().join("absent.json")),
        Err(SettingsError::Io(_))
    ));
}

#[test]
fn test_marker_size_threshold_follows_settings() {
    let settings = EngineSettings::from_json(r#"{ "min_marker_size": 50.0 }"#).unwrap();
    let mut surface = OcclusionSurface::new(
        ImageId::new("image-1"),
        ImageMetadata::new(1000.0, 800.0),
        Vec::new(),
        &settings,
    );
    surface.pointer_down(&Contact::stylus(1, 0.0, 0.0));
    let small = surface.pointer_up(&Contact::stylus(1, 40.0, 40.0));
    assert_eq!(small.outcome, SurfaceOutcome::DrawDiscarded);

    surface.pointer_down(&Contact::stylus(2, 0.0, 0.0));
    let large = surface.pointer_up(&Contact::stylus(2, 60.0, 60.0));
    assert_eq!(large.outcome, SurfaceOutcome::MarkerAdded(0));
}

#[test]
fn test_invalid_settings_fall_back_to_defaults() {
    let settings = EngineSettings {
        min_scale: 4.0,
        max_scale: 0.5,
        min_marker_size: 50.0,
        ..EngineSettings::default()
    };
    let mut surface = OcclusionSurface::new(
        ImageId::new("image-1"),
        ImageMetadata::new(1000.0, 800.0),
        Vec::new(),
        &settings,
    );
    assert_eq!(surface.transform().scale, 1.0);

    surface.pointer_down(&Contact::stylus(1, 10.0, 10.0));
    let drawn = surface.pointer_up(&Contact::stylus(1, 30.0, 30.0));
    assert_eq!(drawn.outcome, SurfaceOutcome::MarkerAdded(0));

    // Pinching out clamps against the default bounds
    surface.pointer_down(&Contact::finger(2, 495.0, 400.0));
    surface.pointer_down(&Contact::finger(3, 505.0, 400.0));
    surface.pointer_move(&Contact::finger(3, 1000.0, 400.0));
    assert_eq!(surface.transform().scale, occlude::constants::MAX_SCALE);
}

#[test]
fn test_zero_scale_bounds_do_not_divide_by_zero() {
    let settings = EngineSettings {
        min_scale: 0.0,
        max_scale: 0.0,
        ..EngineSettings::default()
    };
    let surface = OcclusionSurface::new(
        ImageId::new("image-1"),
        ImageMetadata::new(1000.0, 800.0),
        Vec::new(),
        &settings,
    );
    let content = surface.transform().to_content_space(occlude::Point::new(100.0, 50.0));
    assert!(content.x.is_finite() && content.y.is_finite());
}
