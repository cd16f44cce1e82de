pub mod spawn;
pub mod state;
