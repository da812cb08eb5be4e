//! IO modules - external system interfaces
//!
//! This module contains all external IO operations:
//! - `transport` - HTTP transport trait and reqwest implementation
//! - `client` - carrier endpoint dispatch and tracking fetch
//! - `notify` - fire-and-forget notification channel and log sink

pub mod client;
pub mod notify;
pub mod transport;

// Re-export commonly used types
pub use client::TrackingClient;
pub use notify::{create_notify_channel, NotifyEvent, NotifyPublisher, NotifySender};
pub use transport::{CarrierRequest, HttpTransport, RequestMethod, Transport, TransportResponse};
