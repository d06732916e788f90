pub mod footer;
pub mod toasts;
