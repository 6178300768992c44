use tracing::{debug, error};

use crate::{display::DisplayFields, screen::ScreenEvent};

pub const UI_UPDATE_ERROR: &str = "Error updating UI";

/// Widgets of the weather screen, implemented by the host.
pub trait WeatherView {
    fn show_loading(&mut self, loading: bool);

    fn render(&mut self, fields: &DisplayFields) -> anyhow::Result<()>;

    /// Short transient message (a toast on mobile, a line on a terminal).
    fn show_message(&mut self, message: &str);

    fn request_location_permission(&mut self) {}

    fn request_location(&mut self) {}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready(Box<DisplayFields>),
    Failed(String),
}

/// Owns what is currently displayed and applies screen events to a view.
///
/// Results are only applied for the latest generation seen in a `Loading`
/// event, so out-of-order completions cannot replace newer data.
#[derive(Debug)]
pub struct Presenter<V> {
    view: V,
    latest: u64,
    phase: Phase,
}

impl<V: WeatherView> Presenter<V> {
    pub fn new(view: V) -> Self {
        Self { view, latest: 0, phase: Phase::Idle }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    pub fn handle(&mut self, event: ScreenEvent) {
        match event {
            ScreenEvent::Loading { generation } => {
                if generation <= self.latest {
                    return;
                }
                self.latest = generation;
                self.phase = Phase::Loading;
                self.view.show_loading(true);
            }
            ScreenEvent::Loaded { generation, city, report, fetched_at } => {
                if self.is_stale(generation) {
                    return;
                }
                self.view.show_loading(false);

                let fields = DisplayFields::new(&report, &city, fetched_at);
                match self.view.render(&fields) {
                    Ok(()) => self.phase = Phase::Ready(Box::new(fields)),
                    Err(e) => {
                        error!(error = %e, "UI update failed");
                        self.phase = Phase::Failed(UI_UPDATE_ERROR.to_string());
                        self.view.show_message(UI_UPDATE_ERROR);
                    }
                }
            }
            ScreenEvent::Failed { generation, error } => {
                if self.is_stale(generation) {
                    return;
                }
                self.view.show_loading(false);

                let message = error.to_string();
                self.view.show_message(&message);
                self.phase = Phase::Failed(message);
            }
            ScreenEvent::Notice(message) => self.view.show_message(&message),
            ScreenEvent::PermissionRequested => self.view.request_location_permission(),
            ScreenEvent::LocationRequested => self.view.request_location(),
        }
    }

    fn is_stale(&self, generation: u64) -> bool {
        let stale = generation != self.latest;
        if stale {
            debug!(generation, latest = self.latest, "Ignoring stale result");
        }
        stale
    }
}
