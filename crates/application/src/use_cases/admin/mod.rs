mod dispatch;

pub use dispatch::{AdminCommand, AdminDispatcher};
