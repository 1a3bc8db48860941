pub mod admin;
pub mod application;
pub mod error;

pub use admin::*;
pub use application::*;
pub use error::*;
