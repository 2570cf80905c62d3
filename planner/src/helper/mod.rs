pub mod directions;

pub use directions::*;
