use gtk4::{self, glib, prelude::*};
use libadwaita as adw;
use libadwaita::prelude::*;
use tracing::info;

use super::player_pane::PlayerPane;
use crate::config::Config;
use crate::constants::{SEEK_STEP_LONG_SECS, SEEK_STEP_SHORT_SECS};

/// Top-level window: two control panes side by side plus the global
/// transport row. Global buttons issue the identical operation to both
/// panes in order, with no synchronization between the engines.
pub struct MainWindow {
    window: adw::ApplicationWindow,
}

impl MainWindow {
    pub fn new(app: &adw::Application, config: &Config) -> Self {
        let pane1 = PlayerPane::new("Player 1", config);
        let pane2 = PlayerPane::new("Player 2", config);

        let content = gtk4::Box::builder()
            .orientation(gtk4::Orientation::Vertical)
            .spacing(8)
            .build();

        // Side-by-side pane area
        let pane_area = gtk4::Box::builder()
            .orientation(gtk4::Orientation::Horizontal)
            .spacing(0)
            .homogeneous(true)
            .vexpand(true)
            .build();
        pane_area.append(pane1.widget());
        pane_area.append(&gtk4::Separator::new(gtk4::Orientation::Vertical));
        pane_area.append(pane2.widget());
        content.append(&pane_area);

        content.append(&gtk4::Separator::new(gtk4::Orientation::Horizontal));

        // Global seek row
        let global_seek_row = gtk4::Box::builder()
            .orientation(gtk4::Orientation::Horizontal)
            .spacing(4)
            .margin_start(12)
            .margin_end(12)
            .build();
        global_seek_row.append(&gtk4::Label::new(Some("Global Seek:")));

        let global_steps = [
            ("<< 1m", -SEEK_STEP_LONG_SECS),
            ("< 10s", -SEEK_STEP_SHORT_SECS),
            ("10s >", SEEK_STEP_SHORT_SECS),
            ("1m >>", SEEK_STEP_LONG_SECS),
        ];
        for (label, offset) in global_steps {
            let button = gtk4::Button::with_label(label);
            button.set_hexpand(true);
            let p1 = pane1.clone();
            let p2 = pane2.clone();
            button.connect_clicked(move |_| {
                p1.seek(offset);
                p2.seek(offset);
            });
            global_seek_row.append(&button);
        }
        content.append(&global_seek_row);

        // Global pause/play row
        let global_controls = gtk4::Box::builder()
            .orientation(gtk4::Orientation::Horizontal)
            .spacing(8)
            .homogeneous(true)
            .margin_start(12)
            .margin_end(12)
            .margin_bottom(12)
            .build();

        let global_pause = gtk4::Button::with_label("Global Pause");
        global_pause.set_size_request(-1, 40);
        let p1 = pane1.clone();
        let p2 = pane2.clone();
        global_pause.connect_clicked(move |_| {
            p1.player().set_paused(true);
            p2.player().set_paused(true);
        });
        global_controls.append(&global_pause);

        let global_play = gtk4::Button::with_label("Global Play");
        global_play.set_size_request(-1, 40);
        let p1 = pane1.clone();
        let p2 = pane2.clone();
        global_play.connect_clicked(move |_| {
            p1.player().set_paused(false);
            p2.player().set_paused(false);
        });
        global_controls.append(&global_play);

        content.append(&global_controls);

        let toolbar_view = adw::ToolbarView::new();
        let header = adw::HeaderBar::new();
        header.set_title_widget(Some(&adw::WindowTitle::new("Twinplay", "")));
        toolbar_view.add_top_bar(&header);
        toolbar_view.set_content(Some(&content));

        let window = adw::ApplicationWindow::builder()
            .application(app)
            .title("Twinplay")
            .default_width(640)
            .default_height(440)
            .content(&toolbar_view)
            .build();

        // Both engines are released on close regardless of which pane was
        // interacted with last.
        let p1 = pane1.clone();
        let p2 = pane2.clone();
        window.connect_close_request(move |_| {
            info!("Window closing - shutting down both players");
            p1.shutdown();
            p2.shutdown();
            glib::Propagation::Proceed
        });

        Self { window }
    }

    pub fn present(&self) {
        self.window.present();
    }
}
