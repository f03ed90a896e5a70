mod dashboard;
pub mod html;
pub mod json;

pub use dashboard::format_age;
pub use html::{render_dashboard, HtmlWriter};
pub use json::JsonWriter;
