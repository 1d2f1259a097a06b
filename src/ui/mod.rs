pub mod main_window;
pub mod player_pane;

pub use main_window::MainWindow;
