//! Hooks toward the telephony side and toward observers of driver changes.

use crate::country::CountryCode;

/// Query for the network country currently reported by telephony.
///
/// Consulted on a readiness edge while no telephony value is stored,
/// so a value known before the controller existed is not lost.
pub trait NetworkCountrySource: Send + Sync {
    /// Raw ISO code, possibly empty or lower-case
    fn network_country_iso(&self) -> Option<String>;
}

/// Observer notified when the code applied to the interfaces changes.
pub trait CountryCodeListener: Send + Sync {
    /// Called after a push whose code differs from the previous driver code
    fn on_driver_country_code_changed(&self, code: &CountryCode);
}
