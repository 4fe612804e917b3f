//! localdns infrastructure: wire format, caches, upstream transports and
//! the DNS listeners.
pub mod dns;
