mod common;

use common::*;
use ts_app::{AnimatorEvent, ContainerHeight, RowSlot, RunError, SessionEvent, TableBody};
use ts_core::TrialId;

#[test]
fn deleting_the_only_trial_shows_the_empty_state() {
    let mut session = degraded_plant_session();
    set_plant(&mut session, "High", "High", "High");
    session.request_run(0).unwrap();
    session.tick(0);

    assert!(session.request_delete(TrialId::FIRST, Some(48.0), Some(120.0), 100));

    let sliding = session.render_table(250);
    match &sliding.body {
        TableBody::Rows { rows, trailing } => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].slot, RowSlot::Placeholder { height: 48.0 });
            assert!(trailing.is_some());
        }
        TableBody::Empty => panic!("row removed too early"),
    }
    assert!(matches!(sliding.container_height, ContainerHeight::Fixed(_)));

    session.tick(399);
    assert_eq!(session.orchestrator().trials().len(), 1);

    let events = session.tick(400);
    assert!(events.contains(&SessionEvent::Table(AnimatorEvent::DeleteReady(TrialId::FIRST))));
    assert!(session.orchestrator().trials().is_empty());
    assert_eq!(session.render_table(400).body, TableBody::Empty);

    session.tick(450);
    assert!(!session.table().is_animating());
    assert_eq!(session.render_table(450).container_height, ContainerHeight::Auto);
}

#[test]
fn second_delete_waits_for_the_first() {
    let mut session = degraded_plant_session();
    set_plant(&mut session, "Low", "Low", "Low");
    for i in 0..3 {
        session.request_run(i).unwrap();
    }
    session.tick(10);

    assert!(session.request_delete(TrialId::FIRST, None, None, 20));
    assert!(!session.request_delete(TrialId::new(2).unwrap(), None, None, 30));
    session.tick(400);
    assert!(session.request_delete(TrialId::new(2).unwrap(), None, None, 400));
}

#[test]
fn delete_is_refused_while_a_run_is_in_flight() {
    let (mut session, _) = plant_session();
    set_plant(&mut session, "Low", "Low", "Low");
    run_to_commit(&mut session, 0);

    session.request_run(10_000).unwrap();
    assert!(!session.request_delete(TrialId::FIRST, None, None, 10_100));
    assert!(!session.orchestrator_mut().delete_trial(TrialId::FIRST));
    assert_eq!(session.orchestrator().trials().len(), 1);
}

#[test]
fn new_rows_are_highlighted_for_a_second() {
    let (mut session, _) = plant_session();
    set_plant(&mut session, "Medium", "Medium", "Medium");
    let committed = run_to_commit(&mut session, 0);

    let state = session.render_table(committed);
    match &state.body {
        TableBody::Rows { rows, .. } => assert!(rows[0].highlighted),
        TableBody::Empty => panic!("expected a row"),
    }

    let events = session.tick(committed + 1000);
    assert!(events.contains(&SessionEvent::Table(AnimatorEvent::HighlightCleared(
        TrialId::FIRST
    ))));
    assert_eq!(session.table().highlighted(), None);
}

#[test]
fn rows_above_the_deleted_one_stay_put() {
    let mut session = degraded_plant_session();
    set_plant(&mut session, "Low", "Low", "Low");
    for i in 0..4 {
        session.request_run(i).unwrap();
    }
    session.tick(5);
    session.request_delete(TrialId::new(3).unwrap(), Some(50.0), None, 100);

    let state = session.render_table(400);
    let TableBody::Rows { rows, trailing } = &state.body else {
        panic!("expected rows");
    };
    let offsets: Vec<f32> = rows.iter().map(|r| r.offset_y).collect();
    assert_eq!(offsets, vec![0.0, 0.0, 0.0, -50.0]);
    assert_eq!(trailing.map(|t| t.offset_y), Some(-50.0));
}

#[test]
fn run_waits_for_a_row_removal_to_finish() {
    let (mut session, _) = plant_session();
    set_plant(&mut session, "High", "High", "High");
    let committed = run_to_commit(&mut session, 0);

    let start = committed + 2_000;
    assert!(session.request_delete(TrialId::FIRST, Some(40.0), None, start));
    assert_eq!(
        session.request_run(start + 50),
        Err(RunError::DeleteInProgress)
    );
    assert!(!session.orchestrator().is_running());

    session.tick(start + 20_000);
    assert!(!session.table().is_animating());
    assert!(session.orchestrator().trials().is_empty());

    let ticket = session.request_run(start + 20_000).unwrap();
    assert_eq!(ticket.trial_id.get(), 2);
    assert_eq!(ticket.row, 1);
}
