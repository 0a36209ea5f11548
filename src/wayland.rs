// Wayland integration module
// Handles all Wayland-specific functionality using smithay-client-toolkit

use crate::config::ConfigStore;
use crate::control::{Action, ControlSurface, Effect, Lifecycle, NativeDialogs, PanelInput};
use crate::image_loader::ImageData;
use crate::overlay::OverlayState;
use crate::panel::{PanelLayout, PANEL_RIGHT_INSET};
use crate::render::{write_argb8888, Frame, OverlayRenderer};
use crate::text::TextRenderer;
use crate::wgpu_renderer::WgpuRenderer;
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState, Region},
    delegate_compositor, delegate_keyboard, delegate_layer, delegate_output, delegate_pointer,
    delegate_registry, delegate_seat, delegate_shm,
    output::{OutputHandler, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
    seat::{
        keyboard::{KeyEvent, KeyboardHandler, Keysym, Modifiers},
        pointer::{PointerEvent, PointerEventKind, PointerHandler},
        Capability, SeatHandler, SeatState,
    },
    shell::{
        wlr_layer::{
            Anchor, KeyboardInteractivity, Layer, LayerShell, LayerShellHandler, LayerSurface,
            LayerSurfaceConfigure,
        },
        WaylandSurface,
    },
    shm::{
        slot::{Buffer, SlotPool},
        Shm, ShmHandler,
    },
};
use wayland_client::{
    globals::registry_queue_init,
    protocol::{wl_keyboard, wl_output, wl_pointer, wl_seat, wl_shm, wl_surface},
    Connection, Proxy, QueueHandle,
};

/// Mouse button constants
const BTN_LEFT: u32 = 272;

/// Smallest shm buffer cap, enough for a 4K overlay
const MIN_BUFFER_LIMIT: usize = 64 * 1024 * 1024;

/// Largest shm buffer accepted for a display of the given size.
///
/// A full-screen overlay must always fit, so the cap grows with the output.
fn shm_buffer_limit(display: (u32, u32)) -> usize {
    MIN_BUFFER_LIMIT.max(display.0 as usize * display.1 as usize * 4)
}

/// Panel keyboard shortcuts
const KEY_BINDINGS: &[(Keysym, Action)] = &[
    (Keysym::Up, Action::MoveUp),
    (Keysym::Down, Action::MoveDown),
    (Keysym::Left, Action::MoveLeft),
    (Keysym::Right, Action::MoveRight),
    (Keysym::plus, Action::ZoomIn),
    (Keysym::equal, Action::ZoomIn),
    (Keysym::KP_Add, Action::ZoomIn),
    (Keysym::minus, Action::ZoomOut),
    (Keysym::KP_Subtract, Action::ZoomOut),
    (Keysym::Escape, Action::Close),
    (Keysym::q, Action::Close),
];

fn action_for_key(keysym: Keysym) -> Option<Action> {
    KEY_BINDINGS
        .iter()
        .find(|(key, _)| *key == keysym)
        .map(|&(_, action)| action)
}

/// A layer surface drawn through shared memory buffers
struct ShmTarget {
    layer: LayerSurface,
    pool: Option<SlotPool>,
    buffer: Option<Buffer>,
    width: u32,
    height: u32,
    configured: bool,
}

impl ShmTarget {
    fn new(layer: LayerSurface, width: u32, height: u32) -> Self {
        Self {
            layer,
            pool: None,
            buffer: None,
            width,
            height,
            configured: false,
        }
    }

    fn is(&self, surface: &wl_surface::WlSurface) -> bool {
        self.layer.wl_surface() == surface
    }
}

/// Main Wayland application state
struct WaylandApp {
    // Registry state
    registry_state: RegistryState,
    // Seat state for input handling
    seat_state: SeatState,
    // Output state for display info
    output_state: OutputState,
    // Shared memory for buffer allocation
    shm: Shm,
    // Layer shell for overlay windows
    layer_shell: LayerShell,
    // Compositor state
    compositor_state: CompositorState,

    // Wayland display pointer (for GPU rendering)
    display_ptr: *mut std::ffi::c_void,

    // Overlay model and its persistence
    state: OverlayState,
    store: ConfigStore,
    control: ControlSurface,
    dialogs: NativeDialogs,

    // Display dimensions for panel placement
    display_width: u32,
    display_height: u32,
    // Cap on a single shm buffer, sized from the largest output
    max_buffer_size: usize,

    // Full-screen, input-transparent overlay
    overlay: Option<ShmTarget>,
    renderer: OverlayRenderer,
    overlay_frame: Frame,

    // Floating control panel
    panel: Option<ShmTarget>,
    layout: PanelLayout,
    text: TextRenderer,
    panel_frame: Frame,
    // Panel position (margins from top-left)
    panel_margin_left: i32,
    panel_margin_top: i32,

    // GPU rendering
    use_gpu: bool,
    gpu_renderer: Option<WgpuRenderer>,
    gpu_initialized: bool,
}

impl WaylandApp {
    /// Create a new Wayland application
    #[allow(clippy::too_many_arguments)]
    fn new(
        registry_state: RegistryState,
        seat_state: SeatState,
        output_state: OutputState,
        shm: Shm,
        layer_shell: LayerShell,
        compositor_state: CompositorState,
        display_ptr: *mut std::ffi::c_void,
        image: ImageData,
        state: OverlayState,
        store: ConfigStore,
        use_gpu: bool,
    ) -> Self {
        let layout = PanelLayout::new();
        let (panel_width, panel_height) = layout.size();
        Self {
            registry_state,
            seat_state,
            output_state,
            shm,
            layer_shell,
            compositor_state,
            display_ptr,
            control: ControlSurface::new(&state),
            state,
            store,
            dialogs: NativeDialogs,
            display_width: 1920,
            display_height: 1080,
            max_buffer_size: MIN_BUFFER_LIMIT,
            overlay: None,
            renderer: OverlayRenderer::new(image),
            overlay_frame: Frame::new(0, 0),
            panel: None,
            layout,
            text: TextRenderer::new(),
            panel_frame: Frame::new(panel_width, panel_height),
            panel_margin_left: 0,
            panel_margin_top: 0,
            use_gpu,
            gpu_renderer: None,
            gpu_initialized: false,
        }
    }

    /// Route a panel action and carry out its effect
    fn dispatch(&mut self, action: Action) {
        let effect = self
            .control
            .handle(action, &mut self.state, &self.store, &mut self.dialogs);
        match effect {
            Effect::Redraw => {
                self.draw_overlay();
                self.draw_panel();
            }
            Effect::Exit => info!("Exit requested from panel"),
            Effect::Nothing => {}
        }
    }

    /// Move the panel surface; the overlay is unaffected
    fn move_panel_by(&mut self, dx: i32, dy: i32) {
        self.panel_margin_left += dx;
        self.panel_margin_top += dy;
        if let Some(panel) = &self.panel {
            panel.layer.set_anchor(Anchor::TOP | Anchor::LEFT);
            panel
                .layer
                .set_margin(self.panel_margin_top, 0, 0, self.panel_margin_left);
            panel.layer.commit();
        }
    }

    /// Initialize GPU renderer from the overlay surface
    fn init_gpu_renderer(&mut self) {
        if self.gpu_initialized {
            return;
        }

        let Some(overlay) = &self.overlay else {
            warn!("Cannot init GPU: no overlay surface");
            return;
        };

        // With wayland-backend client_system feature, ObjectId.as_ptr() is available
        let surface_ptr = overlay.layer.wl_surface().id().as_ptr() as *mut std::ffi::c_void;
        let display_ptr = self.display_ptr;

        if display_ptr.is_null() {
            warn!("Display pointer is null, falling back to CPU rendering");
            self.use_gpu = false;
            return;
        }

        info!("Initializing GPU renderer...");
        debug!("  Surface ptr: {:?}", surface_ptr);
        debug!("  Display ptr: {:?}", display_ptr);

        match WgpuRenderer::new(display_ptr, surface_ptr, overlay.width, overlay.height) {
            Ok(mut renderer) => {
                renderer.update_state(&self.state, self.renderer.image());
                self.gpu_renderer = Some(renderer);
                self.gpu_initialized = true;
                info!("GPU renderer initialized successfully");
            }
            Err(e) => {
                warn!("Failed to initialize GPU renderer: {:?}", e);
                warn!("Falling back to CPU rendering");
                self.use_gpu = false;
            }
        }
    }

    /// Repaint the whole overlay from the current state
    fn draw_overlay(&mut self) {
        if !self.overlay.as_ref().is_some_and(|o| o.configured) {
            return;
        }

        if self.use_gpu && self.gpu_renderer.is_some() {
            if self.draw_overlay_gpu() {
                return;
            }
            warn!("GPU rendering failed, falling back to CPU");
        }

        self.draw_overlay_cpu();
    }

    /// Draw using GPU (wgpu)
    fn draw_overlay_gpu(&mut self) -> bool {
        let (Some(renderer), Some(overlay)) = (self.gpu_renderer.as_mut(), self.overlay.as_ref())
        else {
            return false;
        };

        renderer.resize(overlay.width, overlay.height);
        renderer.update_state(&self.state, self.renderer.image());

        match renderer.render() {
            Ok(true) => {
                overlay.layer.wl_surface().commit();
                true
            }
            // No texture or skipped frame
            Ok(false) => false,
            Err(e) => {
                warn!("GPU render error: {:?}", e);
                false
            }
        }
    }

    /// Draw using CPU (shared memory buffer)
    fn draw_overlay_cpu(&mut self) {
        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };

        if self.overlay_frame.width != overlay.width || self.overlay_frame.height != overlay.height
        {
            self.overlay_frame = Frame::new(overlay.width, overlay.height);
        }
        self.renderer.render_into(&self.state, &mut self.overlay_frame);
        present(&self.shm, overlay, &self.overlay_frame, self.max_buffer_size);
    }

    /// Repaint the control panel
    fn draw_panel(&mut self) {
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        if !panel.configured {
            return;
        }

        self.layout
            .paint(&mut self.panel_frame, &self.control.view(), &mut self.text);
        present(&self.shm, panel, &self.panel_frame, self.max_buffer_size);
    }
}

/// Copy `frame` into a fresh shm buffer and commit it to the target surface
fn present(shm: &Shm, target: &mut ShmTarget, frame: &Frame, max_buffer_size: usize) {
    let width = frame.width;
    let height = frame.height;
    if width == 0 || height == 0 {
        return;
    }

    // Calculate buffer size (4 bytes per pixel for ARGB)
    let stride = width as i32 * 4;
    let buffer_size = stride as usize * height as usize;

    if buffer_size > max_buffer_size {
        error!(
            "Buffer size too large: {} bytes, max: {} bytes",
            buffer_size, max_buffer_size
        );
        return;
    }

    // Initialize pool if needed
    if target.pool.is_none() {
        match SlotPool::new(buffer_size, shm) {
            Ok(pool) => target.pool = Some(pool),
            Err(e) => {
                error!(
                    "Failed to create slot pool: {}. Buffer size: {} bytes",
                    e, buffer_size
                );
                return;
            }
        }
    }
    let Some(pool) = target.pool.as_mut() else {
        return;
    };

    // Resize pool if needed
    if pool.len() < buffer_size {
        if let Err(e) = pool.resize(buffer_size) {
            error!("Failed to resize pool to {} bytes: {}", buffer_size, e);
            target.pool = None;
            return;
        }
    }

    let (buffer, canvas) =
        match pool.create_buffer(width as i32, height as i32, stride, wl_shm::Format::Argb8888) {
            Ok(buf) => buf,
            Err(e) => {
                error!("Failed to create buffer {}x{}: {}", width, height, e);
                return;
            }
        };

    write_argb8888(&frame.pixels, canvas);

    // Attach and commit
    let surface = target.layer.wl_surface();
    if let Err(e) = buffer.attach_to(surface) {
        error!("Failed to attach buffer: {}", e);
        return;
    }
    surface.damage_buffer(0, 0, width as i32, height as i32);
    surface.commit();

    target.buffer = Some(buffer);
}

// Implement required traits for smithay-client-toolkit

impl CompositorHandler for WaylandApp {
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_factor: i32,
    ) {
        debug!("Scale factor changed");
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {
        debug!("Transform changed");
    }

    fn frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
    }

    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }
}

impl OutputHandler for WaylandApp {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    fn new_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("New output detected");
    }

    fn update_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("Output updated");
    }

    fn output_destroyed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("Output destroyed");
    }
}

impl LayerShellHandler for WaylandApp {
    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _layer: &LayerSurface) {
        info!("Layer surface closed by compositor");
        self.control.terminate();
    }

    fn configure(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        debug!("Layer surface configured: {:?}", configure);
        let surface = layer.wl_surface();

        if let Some(overlay) = self.overlay.as_mut().filter(|o| o.is(surface)) {
            // Anchored to all edges, so the compositor picks the size
            let (w, h) = configure.new_size;
            overlay.width = if w > 0 { w } else { self.display_width };
            overlay.height = if h > 0 { h } else { self.display_height };
            overlay.configured = true;
            info!("Overlay surface is {}x{}", overlay.width, overlay.height);

            if self.use_gpu && !self.gpu_initialized {
                self.init_gpu_renderer();
            }
            self.draw_overlay();
        } else if let Some(panel) = self.panel.as_mut().filter(|p| p.is(surface)) {
            panel.configured = true;
            self.draw_panel();
        }
    }
}

impl SeatHandler for WaylandApp {
    fn seat_state(&mut self) -> &mut SeatState {
        &mut self.seat_state
    }

    fn new_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {
        debug!("New seat");
    }

    fn new_capability(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        seat: wl_seat::WlSeat,
        capability: Capability,
    ) {
        debug!("New capability: {:?}", capability);

        if capability == Capability::Keyboard {
            if let Err(e) = self.seat_state.get_keyboard(qh, &seat, None) {
                error!("Failed to get keyboard: {}", e);
            }
        }
        if capability == Capability::Pointer {
            if let Err(e) = self.seat_state.get_pointer(qh, &seat) {
                error!("Failed to get pointer: {}", e);
            }
        }
    }

    fn remove_capability(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _seat: wl_seat::WlSeat,
        _capability: Capability,
    ) {
        debug!("Capability removed");
    }

    fn remove_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {
        debug!("Seat removed");
    }
}

impl KeyboardHandler for WaylandApp {
    fn enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _surface: &wl_surface::WlSurface,
        _serial: u32,
        _raw: &[u32],
        _keysyms: &[Keysym],
    ) {
        debug!("Keyboard entered panel");
    }

    fn leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _surface: &wl_surface::WlSurface,
        _serial: u32,
    ) {
        debug!("Keyboard left panel");
    }

    fn press_key(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        event: KeyEvent,
    ) {
        debug!("Key pressed: {:?}", event.keysym);
        if let Some(action) = action_for_key(event.keysym) {
            self.dispatch(action);
        }
    }

    fn release_key(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        _event: KeyEvent,
    ) {
    }

    fn update_modifiers(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        _modifiers: Modifiers,
        _layout: u32,
    ) {
    }
}

impl PointerHandler for WaylandApp {
    fn pointer_frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _pointer: &wl_pointer::WlPointer,
        events: &[PointerEvent],
    ) {
        for event in events {
            // The overlay has an empty input region, so only the panel gets here
            if !self.panel.as_ref().is_some_and(|p| p.is(&event.surface)) {
                continue;
            }

            let (x, y) = event.position;
            let input = match event.kind {
                PointerEventKind::Enter { .. } | PointerEventKind::Motion { .. } => {
                    PanelInput::Motion { x, y }
                }
                PointerEventKind::Leave { .. } => {
                    debug!("Pointer left panel");
                    PanelInput::Leave
                }
                PointerEventKind::Press { button, .. } if button == BTN_LEFT => {
                    PanelInput::Press { x, y }
                }
                PointerEventKind::Release { button, .. } if button == BTN_LEFT => {
                    PanelInput::Release { x, y }
                }
                PointerEventKind::Axis { vertical, .. } if vertical.absolute != 0.0 => {
                    // Scrolling down fades the overlay
                    let steps = if vertical.absolute > 0.0 { -1 } else { 1 };
                    PanelInput::Scroll { steps }
                }
                _ => continue,
            };

            let response = self.control.pointer(&self.layout, input);
            if let Some((dx, dy)) = response.move_panel_by {
                self.move_panel_by(dx, dy);
            }
            if let Some(action) = response.action {
                self.dispatch(action);
            } else if response.repaint_panel {
                self.draw_panel();
            }

            if self.control.lifecycle() == Lifecycle::Terminated {
                break;
            }
        }
    }
}

impl ShmHandler for WaylandApp {
    fn shm_state(&mut self) -> &mut Shm {
        &mut self.shm
    }
}

impl ProvidesRegistryState for WaylandApp {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }

    registry_handlers![OutputState, SeatState];
}

// Delegate macros
delegate_compositor!(WaylandApp);
delegate_output!(WaylandApp);
delegate_layer!(WaylandApp);
delegate_seat!(WaylandApp);
delegate_keyboard!(WaylandApp);
delegate_pointer!(WaylandApp);
delegate_shm!(WaylandApp);
delegate_registry!(WaylandApp);

/// Run the Wayland application until the panel closes or the compositor ends it
pub fn run(image: ImageData, state: OverlayState, store: ConfigStore, use_gpu: bool) -> Result<()> {
    info!("Connecting to Wayland display");

    // Connect to Wayland display
    let conn = Connection::connect_to_env().context("Failed to connect to Wayland display")?;

    // Initialize registry and event queue
    let (globals, mut event_queue) =
        registry_queue_init(&conn).context("Failed to initialize registry")?;
    let qh = event_queue.handle();

    // Initialize required globals
    let compositor_state =
        CompositorState::bind(&globals, &qh).context("Failed to bind compositor")?;
    let layer_shell = LayerShell::bind(&globals, &qh).context("Failed to bind layer shell")?;
    let shm = Shm::bind(&globals, &qh).context("Failed to bind shm")?;

    // Get the display pointer for GPU rendering
    let display_ptr = conn.backend().display_ptr() as *mut std::ffi::c_void;

    // Create application state
    let mut app = WaylandApp::new(
        RegistryState::new(&globals),
        SeatState::new(&globals, &qh),
        OutputState::new(&globals, &qh),
        shm,
        layer_shell,
        compositor_state,
        display_ptr,
        image,
        state,
        store,
        use_gpu,
    );

    // Dispatch once to get output info
    event_queue.roundtrip(&mut app)?;

    // Get display dimensions from outputs
    let (display_width, display_height) = get_display_dimensions(&app.output_state);
    app.display_width = display_width;
    app.display_height = display_height;
    app.max_buffer_size = shm_buffer_limit(largest_output_size(&app.output_state));
    info!("Display dimensions: {}x{}", display_width, display_height);

    // Full-screen overlay that lets all pointer input through
    let surface = app.compositor_state.create_surface(&qh);
    let empty_region =
        Region::new(&app.compositor_state).context("Failed to create input region")?;
    surface.set_input_region(Some(empty_region.wl_region()));
    let overlay = app.layer_shell.create_layer_surface(
        &qh,
        surface,
        Layer::Overlay,
        Some("pixlay-overlay"),
        None,
    );
    overlay.set_anchor(Anchor::TOP | Anchor::BOTTOM | Anchor::LEFT | Anchor::RIGHT);
    overlay.set_size(0, 0);
    overlay.set_exclusive_zone(-1);
    overlay.set_keyboard_interactivity(KeyboardInteractivity::None);
    overlay.commit();
    app.overlay = Some(ShmTarget::new(overlay, display_width, display_height));

    // Control panel, created second so it stacks above the overlay
    let (panel_width, panel_height) = app.layout.size();
    app.panel_margin_left = display_width.saturating_sub(PANEL_RIGHT_INSET) as i32;
    app.panel_margin_top = (display_height.saturating_sub(panel_height) / 2) as i32;

    let surface = app.compositor_state.create_surface(&qh);
    let panel = app.layer_shell.create_layer_surface(
        &qh,
        surface,
        Layer::Overlay,
        Some("pixlay-panel"),
        None,
    );
    panel.set_anchor(Anchor::TOP | Anchor::LEFT);
    panel.set_margin(app.panel_margin_top, 0, 0, app.panel_margin_left);
    panel.set_size(panel_width, panel_height);
    panel.set_keyboard_interactivity(KeyboardInteractivity::OnDemand);
    panel.commit();
    app.panel = Some(ShmTarget::new(panel, panel_width, panel_height));

    info!("Starting event loop");
    info!("Controls: panel buttons, slider or scroll for opacity, arrows/+/- keys, Esc to close");

    // Main event loop
    while app.control.lifecycle() == Lifecycle::Running {
        event_queue.blocking_dispatch(&mut app)?;
    }

    info!("Exiting application");
    Ok(())
}

/// Get display dimensions from the output state
fn get_display_dimensions(output_state: &OutputState) -> (u32, u32) {
    for output in output_state.outputs() {
        if let Some(info) = output_state.info(&output) {
            if let Some(mode) = info.modes.iter().find(|m| m.current) {
                return (mode.dimensions.0 as u32, mode.dimensions.1 as u32);
            }
            if let Some(mode) = info.modes.first() {
                return (mode.dimensions.0 as u32, mode.dimensions.1 as u32);
            }
        }
    }
    (1920, 1080)
}

/// Largest current mode over all outputs
fn largest_output_size(output_state: &OutputState) -> (u32, u32) {
    output_state
        .outputs()
        .filter_map(|output| output_state.info(&output))
        .filter_map(|info| {
            info.modes
                .iter()
                .find(|m| m.current)
                .or_else(|| info.modes.first())
                .map(|m| (m.dimensions.0.max(0) as u32, m.dimensions.1.max(0) as u32))
        })
        .max_by_key(|&(w, h)| u64::from(w) * u64::from(h))
        .unwrap_or((1920, 1080))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_panel_actions() {
        assert_eq!(action_for_key(Keysym::Up), Some(Action::MoveUp));
        assert_eq!(action_for_key(Keysym::Right), Some(Action::MoveRight));
        assert_eq!(action_for_key(Keysym::plus), Some(Action::ZoomIn));
        assert_eq!(action_for_key(Keysym::equal), Some(Action::ZoomIn));
        assert_eq!(action_for_key(Keysym::minus), Some(Action::ZoomOut));
        assert_eq!(action_for_key(Keysym::Escape), Some(Action::Close));
        assert_eq!(action_for_key(Keysym::q), Some(Action::Close));
        assert_eq!(action_for_key(Keysym::a), None);
    }

    #[test]
    fn shm_limit_fits_full_screen_overlays() {
        assert_eq!(shm_buffer_limit((1920, 1080)), MIN_BUFFER_LIMIT);
        assert_eq!(shm_buffer_limit((3840, 2160)), MIN_BUFFER_LIMIT);
        assert_eq!(shm_buffer_limit((7680, 4320)), 7680 * 4320 * 4);
    }
}
