//! Rate-limit dialect recognition and pricing extraction from provider
//! responses.

pub mod dialect;
pub mod observer;
pub mod pricing;

pub use observer::LimitsObserver;
