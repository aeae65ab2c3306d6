pub mod client;
pub mod model;

pub use client::ResourceClient;
pub use model::Resource;
