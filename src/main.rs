use anyhow::Result;

mod app;
mod config;
mod constants;
mod player;
mod ui;

fn main() -> Result<()> {
    use tracing::info;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter("twinplay=debug")
        .init();

    info!("Starting Twinplay");

    // Initialize GTK and Adwaita first
    gtk4::init()?;
    libadwaita::init()?;

    let app = app::TwinplayApp::new()?;
    app.run();

    Ok(())
}
