//! Screen components rendered inside the application frame.

pub mod routers;
