use anyhow::Result;
use gtk4::prelude::*;
use libadwaita as adw;
use libadwaita::prelude::*;
use adw::glib;
use tracing::info;

use crate::config::Config;
use crate::ui::MainWindow;

const APP_ID: &str = "dev.twinplay.Twinplay";

pub struct TwinplayApp {
    app: adw::Application,
}

impl TwinplayApp {
    pub fn new() -> Result<Self> {
        // Load configuration once
        let config = Config::load()?;

        let app = adw::Application::builder().application_id(APP_ID).build();

        app.connect_activate(move |app| {
            info!("Application activated - creating main window");

            // Load CSS
            let css_provider = gtk4::CssProvider::new();
            css_provider.load_from_string(
                ".player-pane .card {
                    padding: 8px;
                }

                .player-pane .monospace {
                    font-size: 14px;
                }",
            );
            if let Some(display) = gtk4::gdk::Display::default() {
                gtk4::style_context_add_provider_for_display(
                    &display,
                    &css_provider,
                    gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
                );
            }

            let window = MainWindow::new(app, &config);
            window.present();
        });

        Ok(Self { app })
    }

    pub fn run(&self) -> glib::ExitCode {
        info!("Running Twinplay application");
        self.app.run()
    }
}
