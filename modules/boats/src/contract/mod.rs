pub mod client;
pub mod error;
pub mod model;

pub use client::BoatsApi;
pub use error::BoatsError;
pub use model::*;
