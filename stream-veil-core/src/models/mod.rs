pub mod config;
pub mod constraints;
pub mod error;
pub mod events;
pub mod frame;
pub mod state;
pub mod stream;
