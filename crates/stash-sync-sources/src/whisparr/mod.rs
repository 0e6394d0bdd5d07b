pub mod client;

pub use client::WhisparrClient;
