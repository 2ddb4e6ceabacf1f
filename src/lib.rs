pub mod libs;
pub mod migrations;

pub use libs::*;
