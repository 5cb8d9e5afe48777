pub mod environment;
pub mod formatting;
pub mod paths;
pub mod terminal;

pub use environment::Config;
pub use formatting::{
    format_conversation_line, format_date, format_duration, format_project_name,
    short_session_id,
};
pub use paths::{encode_path, format_path_with_tilde};
