pub mod cooldown;
pub mod membership;
pub mod ports;
pub mod usecases;

pub use cooldown::*;
pub use membership::*;
pub use ports::*;
