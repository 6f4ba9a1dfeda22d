//! Start/stop command flows

pub mod args;
pub mod start;
pub mod stop;

pub use start::start_launches;
pub use stop::stop_launches;
