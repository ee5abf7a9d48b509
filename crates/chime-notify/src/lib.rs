//! chime-notify — [`Notifier`](chime_core::Notifier) sinks.
//!
//! Both sinks are fire-and-forget: nothing here can block or fail an
//! execution unit. [`LogNotifier`] emits structured tracing events only;
//! [`DesktopNotifier`] additionally pops native desktop notifications and
//! plays a sound where the platform supports it.

pub mod desktop;
pub mod log;

pub use desktop::DesktopNotifier;
pub use log::LogNotifier;
