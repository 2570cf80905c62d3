pub mod algebra;
pub mod domain;

pub use algebra::*;
pub use domain::*;
