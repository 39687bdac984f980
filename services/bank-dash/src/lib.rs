// services/bank-dash/src/lib.rs
//
// Terminal console for a blood bank backend: list views, stock
// sort/filter/aggregate, entry forms and periodic refresh.
//

pub mod app;
pub mod config;
pub mod format;
pub mod forms;
pub mod loader;
pub mod mock;
pub mod poll;
pub mod state;
pub mod table;
pub mod toast;
pub mod ui;

pub use app::App;
pub use config::{load_config, DashConfig};
