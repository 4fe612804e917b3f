pub mod admin;

pub use admin::{AdminCommand, AdminDispatcher};
