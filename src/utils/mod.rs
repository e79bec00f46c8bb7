pub mod status;
pub mod time;

pub use status::{status_display_class, status_display_text};
pub use time::format_relative_time;
