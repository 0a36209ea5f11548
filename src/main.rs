// pixlay - A click-through image overlay for Wayland
// Shows an image above all windows with a floating panel to place, scale and fade it

mod cli;
mod config;
mod control;
mod error;
mod image_loader;
mod overlay;
mod panel;
mod render;
mod text;
mod wayland;
mod wgpu_renderer;

use anyhow::{Context, Result};
use config::ConfigStore;
use error::OverlayError;
use log::info;
use overlay::OverlayState;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args = cli::parse_args();

    let image_path = match args.image_path.clone() {
        Some(path) => path,
        None => match control::pick_image() {
            Ok(path) => path,
            Err(OverlayError::SelectionCancelled) => {
                println!("File not selected");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        },
    };

    info!("Starting pixlay with image: {:?}", image_path);

    // Load the image
    let image_data = image_loader::load_image(&image_path)?;

    info!(
        "Image loaded: {}x{} pixels",
        image_data.width, image_data.height
    );

    let store = ConfigStore::in_working_dir();
    let mut state = OverlayState::new(&image_path);
    state.apply_config(&args.initial_placement());
    if let Some(config_path) = &args.config {
        let record = store
            .load(config_path)
            .with_context(|| format!("Failed to apply startup config {}", config_path.display()))?;
        state.apply_config(&record);
        info!("Startup config applied from {}", config_path.display());
    }

    // Run with layer-shell (GPU rendering by default, CPU as fallback)
    info!("Using layer-shell overlay mode (GPU: {})", !args.cpu);
    wayland::run(image_data, state, store, !args.cpu)
}
