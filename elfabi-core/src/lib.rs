pub mod abi;
pub mod identity;
pub mod object;
pub mod stack;

pub use abi::*;
pub use identity::*;
pub use object::*;
pub use stack::*;
