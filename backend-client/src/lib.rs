mod client;

pub use client::DEFAULT_USER_AGENT;
pub use client::HttpTransport;
