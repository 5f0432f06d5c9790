pub mod error;
pub mod note;

pub use error::*;
pub use note::*;
