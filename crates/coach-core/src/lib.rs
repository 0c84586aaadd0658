pub mod assessment;
pub mod config;
pub mod course;
pub mod intent;
pub mod session;
pub mod types;

pub use config::Config;
pub use intent::Intent;
pub use types::*;
