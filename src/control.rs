// Control surface module
// Routes panel interactions to the overlay state and the config store

use crate::config::ConfigStore;
use crate::error::{OverlayError, Result};
use crate::image_loader::IMAGE_EXTENSIONS;
use crate::overlay::{OverlayState, NUDGE_STEP, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};
use crate::panel::{PanelLayout, PanelView, Widget};
use log::{debug, error, info};
use std::path::{Path, PathBuf};

/// Everything the control panel can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ZoomIn,
    ZoomOut,
    SetOpacity(u8),
    SaveConfig,
    LoadConfig,
    Close,
}

/// Process lifecycle; there is no paused or hidden state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Running,
    Terminated,
}

/// What the shell has to do after an action was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Nothing,
    Redraw,
    Exit,
}

/// Pointer input on the panel surface, in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelInput {
    Motion { x: f64, y: f64 },
    Press { x: f64, y: f64 },
    Release { x: f64, y: f64 },
    Leave,
    /// Scroll notches, positive away from the user
    Scroll { steps: i32 },
}

/// Result of feeding pointer input to the control surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerResponse {
    pub action: Option<Action>,
    /// Translation to apply to the panel surface position
    pub move_panel_by: Option<(i32, i32)>,
    pub repaint_panel: bool,
}

/// Modal prompts used by the save and load actions
pub trait Dialogs {
    /// Ask for a config file; a dismissed dialog yields `SelectionCancelled`
    fn pick_config(&mut self) -> Result<PathBuf>;

    /// Confirm a successful save
    fn notify_saved(&mut self, path: &Path);

    /// Report a failed save or load
    fn notify_error(&mut self, error: &OverlayError);
}

/// Native dialogs backed by rfd
pub struct NativeDialogs;

impl Dialogs for NativeDialogs {
    fn pick_config(&mut self) -> Result<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Select Config")
            .add_filter("JSON files", &["json"])
            .pick_file()
            .ok_or(OverlayError::SelectionCancelled)
    }

    fn notify_saved(&mut self, path: &Path) {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Info)
            .set_title("Saved")
            .set_description(format!("Config saved in {}", path.display()))
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }

    fn notify_error(&mut self, error: &OverlayError) {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title(error.kind())
            .set_description(error.to_string())
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}

/// Ask for the image to overlay
pub fn pick_image() -> Result<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select Image")
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()
        .ok_or(OverlayError::SelectionCancelled)
}

/// Interaction state of the control panel.
///
/// Holds only the slider's cached opacity and transient pointer tracking;
/// the overlay parameters themselves live in `OverlayState`.
#[derive(Debug)]
pub struct ControlSurface {
    lifecycle: Lifecycle,
    slider_value: u8,
    hover: Option<Widget>,
    pressed: Option<Widget>,
    slider_dragging: bool,
    // Grab point in panel coordinates while the panel is being dragged
    drag_grab: Option<(f64, f64)>,
}

impl ControlSurface {
    pub fn new(state: &OverlayState) -> Self {
        Self {
            lifecycle: Lifecycle::Running,
            slider_value: opacity_percent(state.opacity()),
            hover: None,
            pressed: None,
            slider_dragging: false,
            drag_grab: None,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// The window system ended the session
    pub fn terminate(&mut self) {
        if self.lifecycle == Lifecycle::Running {
            info!("Terminating");
        }
        self.lifecycle = Lifecycle::Terminated;
    }

    #[cfg(test)]
    pub fn slider_value(&self) -> u8 {
        self.slider_value
    }

    pub fn view(&self) -> PanelView {
        PanelView {
            hover: self.hover,
            slider_value: self.slider_value,
        }
    }

    /// Reload cached copies of overlay fields shown by the panel
    pub fn sync_from(&mut self, state: &OverlayState) {
        self.slider_value = opacity_percent(state.opacity());
    }

    /// Apply `action`, prompting through `dialogs` where needed
    pub fn handle(
        &mut self,
        action: Action,
        state: &mut OverlayState,
        store: &ConfigStore,
        dialogs: &mut dyn Dialogs,
    ) -> Effect {
        if self.lifecycle == Lifecycle::Terminated {
            return Effect::Exit;
        }
        debug!("Action: {:?}", action);

        match action {
            Action::MoveUp => nudge(state, 0, -NUDGE_STEP),
            Action::MoveDown => nudge(state, 0, NUDGE_STEP),
            Action::MoveLeft => nudge(state, -NUDGE_STEP, 0),
            Action::MoveRight => nudge(state, NUDGE_STEP, 0),
            Action::ZoomIn => zoom(state, ZOOM_IN_FACTOR),
            Action::ZoomOut => zoom(state, ZOOM_OUT_FACTOR),
            Action::SetOpacity(percent) => {
                let percent = percent.min(100);
                if percent == self.slider_value && state.opacity() == f64::from(percent) / 100.0 {
                    return Effect::Nothing;
                }
                self.slider_value = percent;
                state.set_opacity(percent);
                Effect::Redraw
            }
            Action::SaveConfig => {
                match store.save(&state.export_config(), state.image_path()) {
                    Ok(path) => dialogs.notify_saved(&path),
                    Err(e) => report(dialogs, &e),
                }
                Effect::Nothing
            }
            Action::LoadConfig => self.load(state, store, dialogs),
            Action::Close => {
                info!("Close requested");
                self.lifecycle = Lifecycle::Terminated;
                Effect::Exit
            }
        }
    }

    fn load(
        &mut self,
        state: &mut OverlayState,
        store: &ConfigStore,
        dialogs: &mut dyn Dialogs,
    ) -> Effect {
        let record = dialogs
            .pick_config()
            .and_then(|path| store.load(&path).map(|record| (path, record)));

        match record {
            Ok((path, record)) => {
                state.apply_config(&record);
                self.sync_from(state);
                info!("Config loaded from {}", path.display());
                Effect::Redraw
            }
            Err(e) => {
                report(dialogs, &e);
                Effect::Nothing
            }
        }
    }

    /// Track pointer input on the panel and translate it into actions
    pub fn pointer(&mut self, layout: &PanelLayout, input: PanelInput) -> PointerResponse {
        let mut response = PointerResponse::default();

        match input {
            PanelInput::Motion { x, y } => {
                if let Some((grab_x, grab_y)) = self.drag_grab {
                    let delta = ((x - grab_x).round() as i32, (y - grab_y).round() as i32);
                    if delta != (0, 0) {
                        response.move_panel_by = Some(delta);
                    }
                } else if self.slider_dragging {
                    response.action = self.slider_action(layout.slider_value_at(x));
                }

                let hover = layout.widget_at(x, y);
                if hover != self.hover {
                    self.hover = hover;
                    response.repaint_panel = true;
                }
            }
            PanelInput::Press { x, y } => match layout.widget_at(x, y) {
                Some(Widget::OpacitySlider) => {
                    self.slider_dragging = true;
                    response.action = self.slider_action(layout.slider_value_at(x));
                }
                Some(widget @ Widget::Button(_)) => {
                    self.pressed = Some(widget);
                }
                Some(Widget::OpacityLabel) | None => {
                    self.drag_grab = Some((x, y));
                }
            },
            PanelInput::Release { x, y } => {
                if let Some(Widget::Button(action)) = self.pressed.take() {
                    if layout.widget_at(x, y) == Some(Widget::Button(action)) {
                        response.action = Some(action);
                    }
                }
                self.slider_dragging = false;
                self.drag_grab = None;
            }
            PanelInput::Leave => {
                self.pressed = None;
                self.slider_dragging = false;
                self.drag_grab = None;
                if self.hover.take().is_some() {
                    response.repaint_panel = true;
                }
            }
            PanelInput::Scroll { steps } => {
                let value = (i32::from(self.slider_value) + steps).clamp(0, 100) as u8;
                response.action = self.slider_action(value);
            }
        }

        response
    }

    fn slider_action(&self, value: u8) -> Option<Action> {
        (value != self.slider_value).then_some(Action::SetOpacity(value))
    }
}

fn nudge(state: &mut OverlayState, dx: i32, dy: i32) -> Effect {
    state.nudge(dx, dy);
    Effect::Redraw
}

fn zoom(state: &mut OverlayState, factor: f64) -> Effect {
    if state.zoom(factor) {
        Effect::Redraw
    } else {
        Effect::Nothing
    }
}

/// Surface a save/load failure; cancelled selections stay silent
fn report(dialogs: &mut dyn Dialogs, error: &OverlayError) {
    if matches!(error, OverlayError::SelectionCancelled) {
        debug!("Selection cancelled");
        return;
    }
    error!("{}: {}", error.kind(), error);
    dialogs.notify_error(error);
}

fn opacity_percent(opacity: f64) -> u8 {
    (opacity.clamp(0.0, 1.0) * 100.0).round() as u8
}
