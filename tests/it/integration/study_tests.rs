//! Study-mode reveal and lock transitions.

use crate::helpers::{TestSurfaceBuilder, memory_queue, tap};
use occlude::{Contact, EngineSettings, ImageId, OcclusionSurface, Rejection, RevealState, SurfaceMode, SurfaceOutcome, ToolType};

#[test]
fn test_ungrouped_marker_cycles_alone() {
    let mut surface = TestSurfaceBuilder::new()
        .with_marker(0.0, 0.0, 50.0, 50.0)
        .with_marker(100.0, 0.0, 50.0, 50.0)
        .build();
    surface.set_mode(SurfaceMode::Study);

    let states: Vec<_> = (0..4)
        .map(|i| match tap(&mut surface, i, (20.0, 20.0)).outcome {
            SurfaceOutcome::Revealed { state, .. } => state,
            other => panic!("unexpected outcome {other:?}"),
        })
        .collect();
    assert_eq!(
        states,
        vec![
            RevealState::Transparent,
            RevealState::Locked,
            RevealState::Default,
            RevealState::Transparent,
        ]
    );
    assert_eq!(surface.reveal_state(1), Some(RevealState::Default));
}

#[test]
fn test_locked_state_loads_from_markers() {
    let mut surface = TestSurfaceBuilder::new()
        .with_grouped_marker(0.0, 0.0, 50.0, 50.0, "g-a")
        .with_grouped_marker(100.0, 0.0, 50.0, 50.0, "g-a")
        .build();
    surface.editor_mut().set_group_locked(0, true).unwrap();

    let mut surface = OcclusionSurface::new(
        ImageId::new("image-1"),
        surface.image(),
        surface.markers().to_vec(),
        &EngineSettings::default(),
    );
    surface.set_mode(SurfaceMode::Study);
    assert_eq!(surface.reveal_state(1), Some(RevealState::Locked));

    let response = tap(&mut surface, 1, (120.0, 20.0));
    assert_eq!(
        response.outcome,
        SurfaceOutcome::Revealed {
            index: 1,
            state: RevealState::Default
        }
    );
    assert!(surface.markers().iter().all(|m| m.is_locked == Some(false)));
}

#[test]
fn test_transparency_resets_when_leaving_study() {
    let (store, queue) = memory_queue();
    let mut surface = TestSurfaceBuilder::new()
        .with_marker(0.0, 0.0, 50.0, 50.0)
        .with_writer(queue.clone())
        .build();
    surface.set_mode(SurfaceMode::Study);
    tap(&mut surface, 1, (20.0, 20.0));
    assert_eq!(surface.reveal_state(0), Some(RevealState::Transparent));

    surface.set_mode(SurfaceMode::Edit);
    surface.set_mode(SurfaceMode::Study);
    assert_eq!(surface.reveal_state(0), Some(RevealState::Default));
    queue.flush();
    assert_eq!(store.write_count(&ImageId::new("image-1")), 0);
}

#[test]
fn test_study_taps_ignore_tool_and_empty_space() {
    let mut surface = TestSurfaceBuilder::new()
        .with_marker(0.0, 0.0, 50.0, 50.0)
        .build();
    surface.set_mode(SurfaceMode::Study);
    surface.set_tool(ToolType::Erase);

    let response = tap(&mut surface, 1, (20.0, 20.0));
    assert!(matches!(response.outcome, SurfaceOutcome::Revealed { .. }));
    assert_eq!(surface.markers().len(), 1);

    let empty = tap(&mut surface, 2, (500.0, 500.0));
    assert_eq!(empty.outcome, SurfaceOutcome::None);
}

#[test]
fn test_dragged_contact_is_not_a_study_tap() {
    let mut surface = TestSurfaceBuilder::new()
        .with_marker(0.0, 0.0, 200.0, 200.0)
        .build();
    surface.set_mode(SurfaceMode::Study);

    surface.pointer_down(&Contact::stylus(1, 20.0, 20.0));
    surface.pointer_move(&Contact::stylus(1, 120.0, 20.0));
    let response = surface.pointer_up(&Contact::stylus(1, 120.0, 20.0));
    assert_eq!(response.outcome, SurfaceOutcome::None);
    assert_eq!(surface.reveal_state(0), Some(RevealState::Default));
}

#[test]
fn test_link_session_unavailable_in_study() {
    let mut surface = TestSurfaceBuilder::new()
        .with_marker(0.0, 0.0, 50.0, 50.0)
        .build();
    surface.set_mode(SurfaceMode::Study);
    assert_eq!(surface.enter_link_session(0), Err(Rejection::StudyMode));
    assert!(!surface.editor().is_linking());
}
