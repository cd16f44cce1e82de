pub mod send;
pub mod settings;
pub mod sheets;
