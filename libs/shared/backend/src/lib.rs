pub mod client;

pub use client::{ApiReply, BackendClient, BackendRejection};
