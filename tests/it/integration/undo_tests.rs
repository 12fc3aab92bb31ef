//! Undo history through the surface.

use crate::helpers::{TestSurfaceBuilder, assert_marker_count, draw, memory_queue, tap};
use occlude::{ImageId, ImageMetadata, Rejection, SurfaceOutcome, ToolType};

fn slot(i: usize) -> ((f32, f32), (f32, f32)) {
    let x = (i % 5) as f32 * 150.0 + 10.0;
    let y = (i / 5) as f32 * 150.0 + 10.0;
    ((x, y), (x + 100.0, y + 100.0))
}

#[test]
fn test_add_then_undo_restores_previous_list() {
    let mut surface = TestSurfaceBuilder::new()
        .with_marker(600.0, 600.0, 50.0, 50.0)
        .build();
    let before = surface.markers().to_vec();

    draw(&mut surface, 1, (10.0, 10.0), (200.0, 200.0));
    assert_marker_count(&surface, 2);

    surface.undo().unwrap();
    assert_eq!(surface.markers(), before.as_slice());
    assert!(!surface.editor().can_undo());
}

#[test]
fn test_history_keeps_ten_most_recent_snapshots() {
    let mut surface = TestSurfaceBuilder::new().build();
    for i in 0..15 {
        let (from, to) = slot(i);
        let response = draw(&mut surface, i as u64 + 1, from, to);
        assert_eq!(response.outcome, SurfaceOutcome::MarkerAdded(i));
    }
    assert_eq!(surface.editor().undo_len(), 10);

    for _ in 0..10 {
        surface.undo().unwrap();
    }
    assert_marker_count(&surface, 5);
    assert_eq!(surface.undo(), Err(Rejection::NothingToUndo));
    assert_marker_count(&surface, 5);
}

#[test]
fn test_undo_with_empty_history_is_noop() {
    let (store, queue) = memory_queue();
    let mut surface = TestSurfaceBuilder::new()
        .with_marker(0.0, 0.0, 50.0, 50.0)
        .with_writer(queue.clone())
        .build();

    assert_eq!(surface.undo(), Err(Rejection::NothingToUndo));
    queue.flush();
    assert_marker_count(&surface, 1);
    assert_eq!(store.write_count(&ImageId::new("image-1")), 0);
}

#[test]
fn test_undo_restores_erased_group() {
    let mut surface = TestSurfaceBuilder::new()
        .with_grouped_marker(0.0, 0.0, 50.0, 50.0, "g-a")
        .with_grouped_marker(100.0, 0.0, 50.0, 50.0, "g-a")
        .with_marker(300.0, 300.0, 50.0, 50.0)
        .build();
    let before = surface.markers().to_vec();

    surface.set_tool(ToolType::Erase);
    let erased = tap(&mut surface, 1, (120.0, 20.0));
    assert_eq!(erased.outcome, SurfaceOutcome::MarkersRemoved(2));
    assert_marker_count(&surface, 1);

    surface.undo().unwrap();
    assert_eq!(surface.markers(), before.as_slice());
    assert_eq!(surface.editor().group_of(1).unwrap().member_indices, vec![0, 1]);
}

#[test]
fn test_undo_closes_link_session() {
    let mut surface = TestSurfaceBuilder::new()
        .with_marker(0.0, 0.0, 50.0, 50.0)
        .with_marker(100.0, 0.0, 50.0, 50.0)
        .build();
    surface.enter_link_session(0).unwrap();
    tap(&mut surface, 1, (120.0, 20.0));
    assert!(surface.editor().is_linking());

    surface.undo().unwrap();
    assert!(!surface.editor().is_linking());
    assert!(surface.markers().iter().all(|m| m.group_id.is_none()));
}

#[test]
fn test_undo_is_persisted() {
    let (store, queue) = memory_queue();
    let image = ImageId::new("image-1");
    let mut surface = TestSurfaceBuilder::new().with_writer(queue.clone()).build();

    draw(&mut surface, 1, (10.0, 10.0), (200.0, 200.0));
    surface.undo().unwrap();
    queue.flush();
    assert_eq!(store.stored(&image), Some(Vec::new()));
}

#[test]
fn test_switching_images_clears_history() {
    let mut surface = TestSurfaceBuilder::new().build();
    draw(&mut surface, 1, (10.0, 10.0), (200.0, 200.0));
    assert!(surface.editor().can_undo());

    surface.load_image(ImageId::new("image-2"), ImageMetadata::new(500.0, 500.0), Vec::new());
    assert!(!surface.editor().can_undo());
    assert_eq!(surface.undo(), Err(Rejection::NothingToUndo));
}
