pub mod access_events;
pub mod frame_processor;
pub mod media_acquisition;
pub mod permission_store;
