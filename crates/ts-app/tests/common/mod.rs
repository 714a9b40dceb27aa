#![allow(dead_code)]

use ts_animation::{AnimationAdapter, HeadlessEngine, HeadlessProbe};
use ts_app::{Announcer, Session, TimingConfig};
use ts_catalog::builtin_catalog;
use ts_core::Millis;

/// Keeps every announcement with the time it was made.
#[derive(Debug, Default)]
pub struct RecordingAnnouncer {
    pub messages: Vec<(Millis, String)>,
}

impl Announcer for RecordingAnnouncer {
    fn announce(&mut self, text: &str, now: Millis) {
        self.messages.push((now, text.to_string()));
    }
}

pub type TestSession = Session<RecordingAnnouncer>;

pub fn session(engine: HeadlessEngine, simulation: &str) -> TestSession {
    let catalog = builtin_catalog().unwrap();
    Session::new(
        catalog,
        AnimationAdapter::new(Box::new(engine)),
        RecordingAnnouncer::default(),
        TimingConfig::default(),
        Some(simulation),
    )
}

/// Plant session with a working animation.
pub fn plant_session() -> (TestSession, HeadlessProbe) {
    let catalog = builtin_catalog().unwrap();
    let engine = HeadlessEngine::for_simulation(catalog.get_simulation("plant-growth").unwrap());
    let probe = engine.probe();
    (session(engine, "plant-growth"), probe)
}

/// Plant session whose animation never loads.
pub fn degraded_plant_session() -> TestSession {
    session(HeadlessEngine::failing("resource missing"), "plant-growth")
}

pub fn set_plant(session: &mut TestSession, sun: &str, water: &str, soil: &str) {
    session.set_input("sunlightIntensity", sun.into()).unwrap();
    session.set_input("waterAmount", water.into()).unwrap();
    session.set_input("soilNutrition", soil.into()).unwrap();
}

/// Request a run at `now` and tick until it is committed. Returns the
/// commit time.
pub fn run_to_commit(session: &mut TestSession, now: Millis) -> Millis {
    let ticket = session.request_run(now).unwrap();
    let at = ticket.commit_at.unwrap_or(now);
    session.tick(at);
    at
}

pub fn announcements(session: &TestSession) -> &[(Millis, String)] {
    &session.orchestrator().announcer().messages
}
