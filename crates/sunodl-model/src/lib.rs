pub mod error;
pub mod failure;
pub mod item;
pub mod layout;
pub mod page;
pub mod sanitize;

pub use error::*;
pub use failure::*;
pub use item::*;
pub use layout::*;
pub use page::*;
