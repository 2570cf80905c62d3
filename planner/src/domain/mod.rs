pub mod board;
pub mod movement;
pub mod session;
pub mod table;

pub use board::*;
pub use movement::*;
pub use session::*;
pub use table::*;
