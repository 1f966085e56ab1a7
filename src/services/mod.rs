pub mod cart_service;
pub mod cart_store;

pub use cart_service::*;
pub use cart_store::*;
