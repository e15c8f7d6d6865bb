pub mod bitcoin;
mod quantity;

pub use self::{bitcoin::Bitcoin, quantity::Quantity};
