//! Edits flowing through the write queue into a store.

use crate::helpers::{FlakyStore, SlowStore, TestSurfaceBuilder, draw, fast_retry, memory_queue};
use occlude::persistence::{JsonFileStore, MarkerStore, MemoryStore, WriteEvent, WriteQueue};
use occlude::{EngineSettings, ImageId, ImageMetadata, Marker, OcclusionSurface, Rect};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn marker(x: f32) -> Marker {
    Marker::from_rect(Rect::new(x, 0.0, 20.0, 20.0))
}

#[test]
fn test_each_edit_persists_full_list() {
    let (store, queue) = memory_queue();
    let image = ImageId::new("image-1");
    let mut surface = TestSurfaceBuilder::new().with_writer(queue.clone()).build();

    draw(&mut surface, 1, (10.0, 10.0), (100.0, 100.0));
    draw(&mut surface, 2, (200.0, 10.0), (300.0, 100.0));
    queue.flush();

    assert_eq!(store.stored(&image).unwrap(), surface.markers().to_vec());
    assert!(!queue.is_dirty(&image));
}

#[test]
fn test_writes_for_one_image_never_overlap() {
    let store = Arc::new(SlowStore::new(Duration::from_millis(5)));
    let queue = WriteQueue::new(store.clone(), fast_retry(1)).unwrap();
    let image = ImageId::new("image-1");
    let other = ImageId::new("image-2");

    for i in 0..20 {
        queue.enqueue(image.clone(), vec![marker(i as f32)]);
        queue.enqueue(other.clone(), vec![marker(i as f32); 2]);
    }
    queue.flush();

    let overlap = store.max_overlap.lock();
    assert_eq!(overlap.get(&image).copied(), Some(1));
    assert_eq!(overlap.get(&other).copied(), Some(1));
    assert_eq!(store.inner.stored(&image).unwrap(), vec![marker(19.0)]);
}

#[test]
fn test_queued_snapshots_coalesce_to_latest() {
    let store = Arc::new(SlowStore::new(Duration::from_millis(20)));
    let queue = WriteQueue::new(store.clone(), fast_retry(1)).unwrap();
    let image = ImageId::new("image-1");

    for i in 0..10 {
        queue.enqueue(image.clone(), vec![marker(i as f32)]);
    }
    queue.flush();

    // The first snapshot may already be writing; the rest collapse into one
    assert!(store.inner.write_count(&image) <= 2);
    assert_eq!(store.inner.stored(&image).unwrap(), vec![marker(9.0)]);
}

#[test]
fn test_transient_failure_is_retried() {
    let store = Arc::new(FlakyStore::new(2));
    let queue = WriteQueue::new(store.clone(), fast_retry(3)).unwrap();
    let image = ImageId::new("image-1");

    queue.enqueue(image.clone(), vec![marker(0.0)]);
    queue.flush();

    assert_eq!(store.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(store.inner.stored(&image).unwrap(), vec![marker(0.0)]);
    let events = queue.process_results();
    assert!(matches!(
        events.as_slice(),
        [WriteEvent::Saved { attempts: 3, .. }]
    ));
    assert!(!queue.is_dirty(&image));
}

#[test]
fn test_exhausted_retries_leave_image_dirty() {
    let store = Arc::new(FlakyStore::new(5));
    let queue = WriteQueue::new(store.clone(), fast_retry(2)).unwrap();
    let image = ImageId::new("image-1");

    queue.enqueue(image.clone(), vec![marker(0.0)]);
    queue.flush();

    let events = queue.process_results();
    match events.as_slice() {
        [WriteEvent::Failed(failure)] => {
            assert_eq!(failure.image_id, image);
            assert_eq!(failure.attempts, 2);
        }
        other => panic!("expected one failure, got {other:?}"),
    }
    assert!(queue.is_dirty(&image));
    assert!(store.inner.stored(&image).is_none());

    // Three more failures, then the next edit goes through
    queue.enqueue(image.clone(), vec![marker(1.0)]);
    queue.flush();
    assert!(queue.is_dirty(&image));
    queue.enqueue(image.clone(), vec![marker(2.0)]);
    queue.flush();
    assert!(!queue.is_dirty(&image));
    assert_eq!(store.inner.stored(&image).unwrap(), vec![marker(2.0)]);
}

#[test]
fn test_failed_write_keeps_in_memory_edit() {
    let store = Arc::new(FlakyStore::new(usize::MAX));
    let queue = Arc::new(WriteQueue::new(store, fast_retry(1)).unwrap());
    let mut surface = TestSurfaceBuilder::new().with_writer(queue.clone()).build();

    draw(&mut surface, 1, (10.0, 10.0), (100.0, 100.0));
    queue.flush();

    assert_eq!(surface.markers().len(), 1);
    assert!(queue.is_dirty(surface.editor().image_id()));
}

#[test]
fn test_open_loads_markers_from_store() {
    let image = ImageId::new("image-7");
    let store = Arc::new(MemoryStore::with_markers([(image.clone(), vec![marker(0.0), marker(40.0)])]));
    let queue = Arc::new(WriteQueue::new(store.clone(), fast_retry(1)).unwrap());

    let surface = OcclusionSurface::open(
        store.as_ref(),
        queue,
        image,
        ImageMetadata::new(640.0, 480.0),
        &EngineSettings::default(),
    )
    .unwrap();
    assert_eq!(surface.markers(), &[marker(0.0), marker(40.0)]);
}

#[test]
fn test_json_store_behind_queue() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path()));
    let queue = Arc::new(WriteQueue::new(store.clone(), fast_retry(1)).unwrap());
    let mut surface = TestSurfaceBuilder::new()
        .with_image("deck/card 1", 1000.0, 800.0)
        .with_writer(queue.clone())
        .build();

    draw(&mut surface, 1, (10.0, 10.0), (100.0, 100.0));
    queue.flush();

    let loaded = store.load_markers(&ImageId::new("deck/card 1")).unwrap();
    assert_eq!(loaded, surface.markers().to_vec());
}

#[test]
fn test_drop_finishes_pending_writes() {
    let store = Arc::new(SlowStore::new(Duration::from_millis(5)));
    let image = ImageId::new("image-1");
    {
        let queue = WriteQueue::new(store.clone(), fast_retry(1)).unwrap();
        queue.enqueue(image.clone(), vec![marker(3.0)]);
    }
    assert_eq!(store.inner.stored(&image).unwrap(), vec![marker(3.0)]);
}
