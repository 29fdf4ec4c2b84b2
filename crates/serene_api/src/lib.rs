pub mod client;

pub use client::HttpWellnessApi;
