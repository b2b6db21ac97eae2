pub mod handler;
pub mod render;
pub mod types;

pub use handler::TelegramService;
