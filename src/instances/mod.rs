pub mod buffer;
pub mod state;
pub mod updater;
