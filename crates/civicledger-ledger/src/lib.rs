pub mod block;
pub mod canonical;
pub mod memory;
pub mod traits;
pub mod verify;

pub use block::*;
pub use memory::*;
pub use traits::*;
pub use verify::*;
