pub mod common;
pub mod dictionary;
pub mod filter;
pub mod person;

pub use common::*;
pub use dictionary::*;
pub use filter::*;
pub use person::*;
