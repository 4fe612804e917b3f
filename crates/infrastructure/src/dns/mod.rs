pub mod cache;
pub mod forwarding;
pub mod load_balancer;
pub mod local;
pub mod proxy;
pub mod server;
pub mod transport;

pub use cache::{CacheKey, DualCache};
pub use load_balancer::{UpstreamRacer, UpstreamResult};
pub use local::LocalResponder;
pub use proxy::DnsProxy;
pub use server::DnsServerHandler;
