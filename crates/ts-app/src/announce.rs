//! Screen reader announcements.

use tracing::debug;
use ts_catalog::SimulationDescriptor;
use ts_core::{Generation, InputValueSet, Millis, TimerQueue, TrialId};

/// Used when the matching mapping has no description of its own.
pub const GENERIC_DESCRIPTION: &str = "The simulation runs with the given parameters.";

/// Something that can read text out to assistive technology.
pub trait Announcer {
    /// Queue `text` to be read at time `now`.
    fn announce(&mut self, text: &str, now: Millis);

    /// Advance to `now`, making any due text current.
    fn tick(&mut self, _now: Millis) {}

    /// Earliest time `tick` has work to do.
    fn next_due(&self) -> Option<Millis> {
        None
    }
}

/// Polite live region: the content is emptied first and the new text shows
/// up after a short delay, so repeating the same message is still noticed.
#[derive(Debug)]
pub struct LiveRegion {
    content: String,
    pending: TimerQueue<String>,
    clear_delay: Millis,
}

impl LiveRegion {
    pub fn new(clear_delay: Millis) -> Self {
        Self {
            content: String::new(),
            pending: TimerQueue::new(),
            clear_delay,
        }
    }

    /// What a screen reader would currently find in the region.
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Default for LiveRegion {
    fn default() -> Self {
        Self::new(50)
    }
}

impl Announcer for LiveRegion {
    fn announce(&mut self, text: &str, now: Millis) {
        self.content.clear();
        // A newer message supersedes one still waiting to appear.
        self.pending.cancel_all();
        self.pending
            .schedule(now, self.clear_delay, Generation::default(), text.to_string());
    }

    fn tick(&mut self, now: Millis) {
        for fired in self.pending.drain_due(now) {
            debug!(text = %fired.event, "announce");
            self.content = fired.event;
        }
    }

    fn next_due(&self) -> Option<Millis> {
        self.pending.next_due()
    }
}

/// `"<Label> set to <value>."` for each input that has a value.
pub fn input_summary(simulation: &SimulationDescriptor, values: &InputValueSet) -> String {
    simulation
        .inputs
        .iter()
        .filter_map(|input| {
            let value = values.get(&input.id).filter(|v| !v.is_empty())?;
            Some(format!("{} set to {}.", input.label, value))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn start_announcement(
    simulation: &SimulationDescriptor,
    values: &InputValueSet,
    trial_id: TrialId,
    description: Option<&str>,
) -> String {
    let summary = input_summary(simulation, values);
    let description = description.unwrap_or(GENERIC_DESCRIPTION);
    if summary.is_empty() {
        format!("Starting trial {}. {}", trial_id, description)
    } else {
        format!("{} Starting trial {}. {}", summary, trial_id, description)
    }
}

pub fn completion_announcement(trial_id: TrialId, row: usize) -> String {
    format!(
        "Trial {} simulation complete. Results have been added to the data table in row {}.",
        trial_id, row
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ts_catalog::builtin_catalog;
    use ts_core::InputValue;

    #[test]
    fn live_region_clears_then_sets() {
        let mut region = LiveRegion::new(50);
        region.announce("first", 0);
        region.tick(50);
        assert_eq!(region.content(), "first");

        region.announce("first", 100);
        assert_eq!(region.content(), "");
        assert_eq!(region.next_due(), Some(150));
        region.tick(149);
        assert_eq!(region.content(), "");
        region.tick(150);
        assert_eq!(region.content(), "first");
    }

    #[test]
    fn newer_announcement_supersedes_pending_one() {
        let mut region = LiveRegion::new(50);
        region.announce("one", 0);
        region.announce("two", 10);
        region.tick(1000);
        assert_eq!(region.content(), "two");
        assert_eq!(region.next_due(), None);
    }

    #[test]
    fn summary_skips_empty_inputs() {
        let catalog = builtin_catalog().unwrap();
        let weather = catalog.get_simulation("weather").unwrap();
        let values: InputValueSet = [
            ("temperature", InputValue::Number(70.0)),
            ("humidity", InputValue::Number(50.0)),
            ("pressure", InputValue::empty()),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            input_summary(weather, &values),
            "Temperature set to 70. Humidity set to 50."
        );
    }

    #[test]
    fn start_and_completion_texts() {
        let catalog = builtin_catalog().unwrap();
        let plant = catalog.get_simulation("plant-growth").unwrap();
        let values: InputValueSet = [
            ("sunlightIntensity", "High"),
            ("waterAmount", "High"),
            ("soilNutrition", "High"),
        ]
        .into_iter()
        .collect();
        let id = TrialId::new(2).unwrap();

        let start = start_announcement(plant, &values, id, None);
        assert!(start.starts_with("Sunlight Intensity set to High."));
        assert!(start.contains("Starting trial 2. "));
        assert!(start.ends_with(GENERIC_DESCRIPTION));

        assert_eq!(
            completion_announcement(id, 2),
            "Trial 2 simulation complete. Results have been added to the data table in row 2."
        );
    }
}
