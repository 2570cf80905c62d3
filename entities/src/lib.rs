pub mod domain;

pub use domain::configuration::*;
pub use domain::constant;
pub use domain::error::*;
pub use domain::order::task::*;
pub use domain::order::*;
pub use domain::route::*;
pub use domain::Document;

pub type Unit = ();
