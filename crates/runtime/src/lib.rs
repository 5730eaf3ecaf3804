pub mod engine;
pub mod events;
pub mod logging;
pub mod replay;
pub mod tick;
