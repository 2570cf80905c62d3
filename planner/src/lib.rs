pub mod algebra;
pub mod domain;
pub mod helper;
pub mod logic;

pub use algebra::*;
pub use domain::*;
pub use helper::*;
pub use logic::*;
