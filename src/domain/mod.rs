pub mod types;
pub mod raid;
pub mod message;
pub mod policy;

pub use types::*;
pub use raid::*;
pub use message::*;
pub use policy::*;
