mod assignments;
mod optimization;
mod reassignment;

pub use assignments::*;
pub use reassignment::*;
