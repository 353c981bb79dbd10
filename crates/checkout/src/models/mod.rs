//! Domain models for the checkout subsystem.

pub mod address;
pub mod cart;
pub mod order;

pub use address::{Address, Coordinates, StructuredDetails};
pub use cart::{Cart, CartItem, Product};
pub use order::Order;
