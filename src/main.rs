use std::{fs, io::Cursor};

use anyhow::Context;
use eframe::egui::{self, ViewportBuilder};
use tracing::{info, warn};
use tuner::{
    app::TunerApp,
    config::{config_dir, Config},
};

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,tuner=info")),
        )
        .init();
}

fn load_window_icon() -> anyhow::Result<Option<egui::IconData>> {
    let Some(path) = config_dir().map(|dir| dir.join("icon.png")) else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }

    let data =
        fs::read(&path).with_context(|| format!("Unable to open icon: {}", path.display()))?;
    let image = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .with_context(|| format!("Unable to determine icon format: {}", path.display()))?
        .decode()
        .with_context(|| format!("Failed to decode icon: {}", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(Some(egui::IconData {
        rgba: image.into_raw(),
        width,
        height,
    }))
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::load().unwrap_or_else(|err| {
        warn!("{err:#}; using defaults");
        Config::default()
    });
    match &config.source {
        Some(path) => info!("Config loaded from {}", path.display()),
        None => info!("No config file found, using defaults"),
    }

    let mut viewport = ViewportBuilder::default()
        .with_title("Tuner")
        .with_inner_size([config.ui.window_width, config.ui.window_height])
        .with_resizable(false);
    match load_window_icon() {
        Ok(Some(icon)) => viewport = viewport.with_icon(icon),
        Ok(None) => {}
        Err(err) => warn!("{err:#}"),
    }

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    let run_res = eframe::run_native(
        "Tuner",
        native_options,
        Box::new(
            move |_cc| -> std::result::Result<
                Box<dyn eframe::App>,
                Box<dyn std::error::Error + Send + Sync>,
            > { Ok(Box::new(TunerApp::new(config)?)) },
        ),
    );
    if let Err(e) = run_res {
        return Err(Box::new(e));
    }

    Ok(())
}
