//! Scene viewer
//!
//! Opens a window, loads the configured scene and lets the user switch
//! between its cameras. Usage: `scene_viewer [config.toml|config.ron]`.
//!
//! The window is a headless host: frames go to `HeadlessBackend`, so it
//! shows no pixels. It drives input, resize, loading and teardown.

mod window;

use std::path::{Path, PathBuf};
use std::time::Instant;

use scene_viewer::config::Config;
use scene_viewer::core::config::ViewerConfig;
use scene_viewer::foundation::logging;
use scene_viewer::render::HeadlessBackend;
use scene_viewer::{EventOutcome, Viewer};

use window::Window;

const DEFAULT_CONFIG: &str = "viewer.toml";

fn load_config() -> Result<ViewerConfig, Box<dyn std::error::Error>> {
    if let Some(path) = std::env::args().nth(1).map(PathBuf::from) {
        return Ok(ViewerConfig::load_from_file(path)?);
    }

    if Path::new(DEFAULT_CONFIG).exists() {
        Ok(ViewerConfig::load_from_file(DEFAULT_CONFIG)?)
    } else {
        Ok(ViewerConfig::default())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init(&config.logging.level);

    log::info!("Starting scene viewer");

    let mut window = Window::new(
        &config.window.title,
        config.window.width,
        config.window.height,
        config.window.resizable,
    )?;
    let (width, height) = window.framebuffer_size();
    let mut viewer = Viewer::new(config, HeadlessBackend::new(width, height))?;

    while !window.should_close() {
        for event in window.poll_events() {
            if viewer.handle_event(event, Instant::now()) == EventOutcome::Quit {
                window.set_should_close(true);
            }
        }

        if let Err(e) = viewer.frame(Instant::now()) {
            log::error!("Frame failed: {e}");
            break;
        }

        std::thread::sleep(viewer.time_until_next_frame(Instant::now()));
    }

    let report = viewer.teardown();
    log::info!(
        "Scene viewer closed after {} frames, released {} resources",
        report.frames_rendered,
        report.disposed.total()
    );
    Ok(())
}
