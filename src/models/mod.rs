pub mod fund;
pub mod response;

pub use fund::*;
pub use response::*;
