pub mod cart;
pub mod line_item;
pub mod snapshot;

pub use cart::*;
pub use line_item::*;
pub use snapshot::*;
