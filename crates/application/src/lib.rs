//! localdns application layer: ports implemented by the infrastructure and
//! the use cases driving them.
pub mod ports;
pub mod use_cases;
