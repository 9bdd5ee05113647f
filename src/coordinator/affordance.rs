use serde::Serialize;

/// UI element left open while a dispatched action is outstanding.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PendingAction {
    Substitution { ingredient: String },
    Scale { servings: u32 },
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AffordanceState {
    /// Open dialog/control; `None` once the action is confirmed or dismissed.
    pub open: Option<PendingAction>,
    /// A dispatch has been sent and its completion is still being awaited.
    pub in_flight: bool,
    /// Last transport failure, shown inside the open affordance.
    pub error: Option<String>,
}

impl AffordanceState {
    pub fn open(&mut self, action: PendingAction) {
        if self.open.as_ref() != Some(&action) {
            self.error = None;
        }
        self.open = Some(action);
    }

    pub fn begin_dispatch(&mut self) {
        self.error = None;
        self.in_flight = true;
    }

    pub fn confirm(&mut self) {
        self.open = None;
        self.error = None;
        self.in_flight = false;
    }

    /// Timed out without seeing the agent go idle: keep the affordance up.
    pub fn leave_open(&mut self) {
        self.in_flight = false;
    }

    pub fn fail(&mut self, message: String) {
        self.in_flight = false;
        self.error = Some(message);
    }

    pub fn dismiss(&mut self) {
        *self = Self::default();
    }
}
