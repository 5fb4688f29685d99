//! Regulatory country code reconciliation for managed radio interfaces.
//!
//! This crate decides which country code should be active on the radio
//! subsystem and propagates it to every managed interface once the
//! subsystem can accept the change. It handles:
//! - Merging a fixed default code with a telephony-supplied code
//! - Revert-on-loss policy when telephony withdraws its value
//! - Deferring pushes while the subsystem is not ready
//! - Fresh interface lookups on every push
//! - Serialized event delivery via a tokio task
//!
//! # Examples
//!
//! ```no_run
//! use regdomain_radio::{CountryCodeConfig, CountryCodeController, StaticRegistry};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(StaticRegistry::new());
//! let controller = CountryCodeController::new(
//!     CountryCodeConfig {
//!         default_country_code: "US".to_string(),
//!         revert_on_loss: true,
//!     },
//!     registry,
//! )
//! .unwrap();
//!
//! controller.set_country_code_and_update("jp");
//! controller.set_ready_for_change(true);
//! assert_eq!(controller.country_code_sent_to_driver().unwrap(), "JP");
//! ```

pub mod controller;
pub mod country;
pub mod event_loop;
pub mod interface;
pub mod snapshot;
pub mod telephony;

pub use controller::{
    active_country_code, resolve_telephony_code, CountryCodeConfig, CountryCodeController,
    PushReport,
};
pub use country::CountryCode;
pub use event_loop::{spawn_event_loop, CountryCodeEvent, CountryCodeHandle};
pub use interface::{InterfaceError, InterfaceRegistry, ManagedInterface, StaticRegistry};
pub use snapshot::CountryCodeSnapshot;
pub use telephony::{CountryCodeListener, NetworkCountrySource};
