//! Country code reconciliation.
//!
//! Merges the fixed default code with the telephony-supplied code, and pushes
//! the result to every managed interface whenever the radio subsystem is
//! ready to accept a change.

use regdomain_core::{current_timestamp_ms, CoreError, RegulatoryConfig};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::country::CountryCode;
use crate::interface::InterfaceRegistry;
use crate::snapshot::CountryCodeSnapshot;
use crate::telephony::{CountryCodeListener, NetworkCountrySource};

/// Fixed inputs of a controller
#[derive(Debug, Clone)]
pub struct CountryCodeConfig {
    /// Fallback code
    pub default_country_code: String,
    /// Whether a telephony withdrawal reverts to the default
    pub revert_on_loss: bool,
}

impl From<&RegulatoryConfig> for CountryCodeConfig {
    fn from(config: &RegulatoryConfig) -> Self {
        Self {
            default_country_code: config.default_country_code.clone(),
            revert_on_loss: config.revert_on_loss,
        }
    }
}

/// Outcome of one propagation to the managed interfaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushReport {
    /// Code that was pushed
    pub code: CountryCode,
    /// Number of interfaces the code was offered to
    pub attempted: usize,
    /// Names of the interfaces that reported a failure
    pub failed: Vec<String>,
    /// Push time (Unix milliseconds)
    pub timestamp_ms: u64,
}

/// Telephony value to keep after an update.
///
/// A withdrawal (`incoming == None`) clears the value under revert-on-loss and
/// otherwise keeps the last known one.
pub fn resolve_telephony_code(
    previous: Option<&CountryCode>,
    incoming: Option<CountryCode>,
    revert_on_loss: bool,
) -> Option<CountryCode> {
    match incoming {
        Some(code) => Some(code),
        None if revert_on_loss => None,
        None => previous.cloned(),
    }
}

/// Code that should be in effect: telephony when present, else the default.
pub fn active_country_code<'a>(
    default: &'a CountryCode,
    telephony: Option<&'a CountryCode>,
) -> &'a CountryCode {
    telephony.unwrap_or(default)
}

#[derive(Default)]
struct ControllerState {
    telephony_code: Option<CountryCode>,
    driver_code: Option<CountryCode>,
    ready: bool,
    telephony_updated_ms: Option<u64>,
    driver_updated_ms: Option<u64>,
    ready_changed_ms: Option<u64>,
    last_push: Option<PushReport>,
    listeners: Vec<Arc<dyn CountryCodeListener>>,
}

/// Decides which country code is active and pushes it to the managed interfaces.
///
/// Every operation takes the internal lock for its whole duration, so the
/// recompute-then-push sequence is atomic. Interfaces and listeners run under
/// that lock and must not call back into the controller.
pub struct CountryCodeController {
    default_code: CountryCode,
    revert_on_loss: bool,
    registry: Arc<dyn InterfaceRegistry>,
    network_source: Option<Arc<dyn NetworkCountrySource>>,
    state: Mutex<ControllerState>,
}

impl CountryCodeController {
    /// Create a controller. Fails when the default code is blank.
    pub fn new(
        config: CountryCodeConfig,
        registry: Arc<dyn InterfaceRegistry>,
    ) -> Result<Self, CoreError> {
        let default_code = CountryCode::parse(&config.default_country_code).ok_or_else(|| {
            CoreError::InvalidConfig("default country code must not be empty".to_string())
        })?;

        info!(
            default_country_code = %default_code,
            revert_on_loss = config.revert_on_loss,
            "Country code controller created"
        );

        Ok(Self {
            default_code,
            revert_on_loss: config.revert_on_loss,
            registry,
            network_source: None,
            state: Mutex::new(ControllerState::default()),
        })
    }

    /// Attach a telephony query used on readiness while no telephony code is stored.
    pub fn with_network_source(mut self, source: Arc<dyn NetworkCountrySource>) -> Self {
        self.network_source = Some(source);
        self
    }

    /// Register an observer of driver code changes
    pub fn add_listener(&self, listener: Arc<dyn CountryCodeListener>) {
        self.lock().listeners.push(listener);
    }

    /// Record subsystem readiness. Every `true` call pushes, even without a value change.
    pub fn set_ready_for_change(&self, ready: bool) {
        let mut state = self.lock();
        state.ready = ready;
        state.ready_changed_ms = Some(current_timestamp_ms());
        info!(ready, "Readiness for country code change updated");

        if ready {
            self.probe_network_country(&mut state);
            self.push(&mut state);
        }
    }

    /// Record a telephony-supplied code; blank input means withdrawal.
    ///
    /// Returns `false` when a withdrawal was ignored because revert-on-loss is off.
    pub fn set_country_code_and_update(&self, code: &str) -> bool {
        let incoming = CountryCode::parse(code);
        let mut state = self.lock();

        let accepted = incoming.is_some() || self.revert_on_loss;
        let resolved =
            resolve_telephony_code(state.telephony_code.as_ref(), incoming, self.revert_on_loss);
        state.telephony_code = resolved;
        state.telephony_updated_ms = Some(current_timestamp_ms());

        let active = self.active(&state).clone();
        info!(
            raw = code,
            country_code = %active,
            accepted,
            "Telephony country code updated"
        );

        if !state.ready {
            debug!(country_code = %active, "Not ready, deferring push");
        } else {
            self.push(&mut state);
        }

        accepted
    }

    /// Logical active code, whether or not it has been pushed yet
    pub fn country_code(&self) -> CountryCode {
        let state = self.lock();
        self.active(&state).clone()
    }

    /// Code last pushed to the interfaces, `None` before the first push
    pub fn country_code_sent_to_driver(&self) -> Option<CountryCode> {
        self.lock().driver_code.clone()
    }

    /// Last stored telephony code
    pub fn telephony_country_code(&self) -> Option<CountryCode> {
        self.lock().telephony_code.clone()
    }

    /// Outcome of the most recent push
    pub fn last_push(&self) -> Option<PushReport> {
        self.lock().last_push.clone()
    }

    /// Diagnostic view of the controller state
    pub fn dump(&self) -> CountryCodeSnapshot {
        let state = self.lock();
        CountryCodeSnapshot {
            driver_country_code: state.driver_code.clone(),
            telephony_country_code: state.telephony_code.clone(),
            default_country_code: self.default_code.clone(),
            active_country_code: self.active(&state).clone(),
            ready: state.ready,
            revert_on_loss: self.revert_on_loss,
            telephony_updated_ms: state.telephony_updated_ms,
            driver_updated_ms: state.driver_updated_ms,
            ready_changed_ms: state.ready_changed_ms,
            last_push: state.last_push.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn active<'a>(&'a self, state: &'a ControllerState) -> &'a CountryCode {
        active_country_code(&self.default_code, state.telephony_code.as_ref())
    }

    fn probe_network_country(&self, state: &mut ControllerState) {
        if state.telephony_code.is_some() {
            return;
        }
        let Some(source) = &self.network_source else {
            return;
        };

        if let Some(code) = source
            .network_country_iso()
            .as_deref()
            .and_then(CountryCode::parse)
        {
            info!(country_code = %code, "Adopted network country reported by telephony");
            state.telephony_code = Some(code);
            state.telephony_updated_ms = Some(current_timestamp_ms());
        }
    }

    fn push(&self, state: &mut ControllerState) -> PushReport {
        let code = self.active(state).clone();
        let interfaces = self.registry.managed_interfaces();

        let mut failed = Vec::new();
        for iface in &interfaces {
            match iface.set_country_code(&code) {
                Ok(()) => {
                    debug!(interface = iface.name(), country_code = %code, "Country code applied");
                }
                Err(e) => {
                    warn!(
                        interface = iface.name(),
                        country_code = %code,
                        error = %e,
                        "Failed to apply country code"
                    );
                    failed.push(iface.name().to_string());
                }
            }
        }

        let timestamp_ms = current_timestamp_ms();
        let changed = state.driver_code.as_ref() != Some(&code);
        state.driver_code = Some(code.clone());
        state.driver_updated_ms = Some(timestamp_ms);

        info!(
            country_code = %code,
            interfaces = interfaces.len(),
            failed = failed.len(),
            "Country code pushed to driver"
        );

        if changed {
            for listener in &state.listeners {
                listener.on_driver_country_code_changed(&code);
            }
        }

        let report = PushReport {
            code,
            attempted: interfaces.len(),
            failed,
            timestamp_ms,
        };
        state.last_push = Some(report.clone());
        report
    }
}
