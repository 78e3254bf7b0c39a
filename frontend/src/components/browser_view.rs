use gloo_timers::callback::Timeout;
use gloo_utils::window;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use workout_tracker_lib::{
    config::TrackerConfig,
    controller::WorkoutView,
    form::WorkoutForm,
    presentation::ListEntry,
};
use yew::{Callback, NodeRef};

/// Delayed effects that come back into the component as messages.
pub enum ViewEvent {
    ShakeCleared,
    FormDisplayRestored,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub visible: bool,
    /// Set for a moment after hiding so the form leaves the layout without sliding away.
    pub display_suppressed: bool,
    pub shaking: bool,
    pub show_elevation: bool,
    /// The distance input should get focus once the form is on screen.
    pub focus_requested: bool,
}

impl FormState {
    /// Shows the form right away, even while a previous hide is still settling.
    fn show(&mut self) {
        self.visible = true;
        self.display_suppressed = false;
        self.focus_requested = true;
    }

    fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }
}

#[derive(Clone, Default, PartialEq)]
pub struct FormRefs {
    pub workout_type: NodeRef,
    pub distance: NodeRef,
    pub duration: NodeRef,
    pub cadence: NodeRef,
    pub elevation: NodeRef,
}

impl FormRefs {
    fn inputs(&self) -> [&NodeRef; 4] {
        [&self.distance, &self.duration, &self.cadence, &self.elevation]
    }
}

pub struct BrowserView {
    pub form: FormState,
    pub refs: FormRefs,
    pub entries: Vec<ListEntry>,
    shake_duration_ms: u32,
    form_restore_delay_ms: u32,
    events: Callback<ViewEvent>,
}

impl BrowserView {
    pub fn new(config: &TrackerConfig, events: Callback<ViewEvent>) -> Self {
        Self {
            form: FormState::default(),
            refs: FormRefs::default(),
            entries: Vec::new(),
            shake_duration_ms: config.shake_duration_ms,
            form_restore_delay_ms: config.form_restore_delay_ms,
            events,
        }
    }

    /// The current form values. Only the visible cadence/elevation input is read.
    pub fn read_form(&self) -> WorkoutForm {
        let workout_type = self
            .refs
            .workout_type
            .cast::<HtmlSelectElement>()
            .map(|select| select.value())
            .unwrap_or_default();

        let metric = if self.form.show_elevation {
            &self.refs.elevation
        } else {
            &self.refs.cadence
        };

        WorkoutForm::new(
            workout_type,
            input_value(&self.refs.distance),
            input_value(&self.refs.duration),
            input_value(metric),
        )
    }

    /// Focuses the distance input if the form was just shown. Runs after a render so
    /// the input is no longer hidden.
    pub fn focus_if_requested(&mut self) {
        if !self.form.take_focus_request() {
            return;
        }

        if let Some(input) = self.refs.distance.cast::<HtmlInputElement>() {
            if let Err(err) = input.focus() {
                tracing::debug!("Could not focus distance input: {err:?}");
            }
        }
    }

    pub fn handle(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::ShakeCleared => self.form.shaking = false,
            ViewEvent::FormDisplayRestored => self.form.display_suppressed = false,
        }
    }

    fn after(&self, millis: u32, event: ViewEvent) {
        let events = self.events.clone();
        Timeout::new(millis, move || events.emit(event)).forget();
    }
}

impl WorkoutView for BrowserView {
    fn show_form(&mut self) {
        self.form.show();
    }

    fn hide_form(&mut self) {
        self.form.visible = false;
        self.form.display_suppressed = true;
        self.after(self.form_restore_delay_ms, ViewEvent::FormDisplayRestored);
    }

    fn clear_fields(&mut self) {
        let inputs = self.refs.inputs().into_iter();
        for input in inputs.filter_map(|node| node.cast::<HtmlInputElement>()) {
            input.set_value("");
        }
    }

    fn shake_form(&mut self) {
        self.form.shaking = true;
        self.after(self.shake_duration_ms, ViewEvent::ShakeCleared);
    }

    fn toggle_elevation_field(&mut self) {
        self.form.show_elevation = !self.form.show_elevation;
    }

    fn render_workout(&mut self, entry: ListEntry) {
        self.entries.push(entry);
    }

    fn notify(&mut self, message: &str) {
        if let Err(err) = window().alert_with_message(message) {
            tracing::error!("Could not show notice {message:?}: {err:?}");
        }
    }

    fn reload(&mut self) {
        if let Err(err) = window().location().reload() {
            tracing::error!("Reload failed: {err:?}");
        }
    }
}

fn input_value(node: &NodeRef) -> String {
    node.cast::<HtmlInputElement>()
        .map(|input| input.value())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn showing_cancels_a_pending_hide() {
        let mut form = FormState {
            display_suppressed: true,
            ..FormState::default()
        };
        form.show();

        assert!(form.visible);
        assert!(!form.display_suppressed);
        assert!(form.take_focus_request());
        assert!(!form.take_focus_request(), "focus is requested once per show");
    }
}
