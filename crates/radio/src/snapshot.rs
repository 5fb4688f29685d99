//! Diagnostic view of the controller

use serde::Serialize;
use std::fmt;

use crate::controller::PushReport;
use crate::country::CountryCode;

/// Point-in-time copy of the controller state. Timestamps are Unix milliseconds.
#[derive(Debug, Clone, Serialize)]
pub struct CountryCodeSnapshot {
    /// Code last pushed to the interfaces
    pub driver_country_code: Option<CountryCode>,
    /// Stored telephony code
    pub telephony_country_code: Option<CountryCode>,
    /// Fixed fallback code
    pub default_country_code: CountryCode,
    /// Code that should be in effect
    pub active_country_code: CountryCode,
    /// Subsystem accepts a change
    pub ready: bool,
    /// Withdrawal policy
    pub revert_on_loss: bool,
    /// Last telephony update
    pub telephony_updated_ms: Option<u64>,
    /// Last push
    pub driver_updated_ms: Option<u64>,
    /// Last readiness change
    pub ready_changed_ms: Option<u64>,
    /// Outcome of the last push
    pub last_push: Option<PushReport>,
}

struct OrNone<'a, T>(&'a Option<T>);

impl<T: fmt::Display> fmt::Display for OrNone<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => fmt::Display::fmt(value, f),
            None => f.write_str("none"),
        }
    }
}

impl fmt::Display for CountryCodeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "driver_country_code: {}", OrNone(&self.driver_country_code))?;
        writeln!(f, "telephony_country_code: {}", OrNone(&self.telephony_country_code))?;
        writeln!(f, "default_country_code: {}", self.default_country_code)?;
        writeln!(f, "active_country_code: {}", self.active_country_code)?;
        writeln!(f, "telephony_updated_ms: {}", OrNone(&self.telephony_updated_ms))?;
        writeln!(f, "driver_updated_ms: {}", OrNone(&self.driver_updated_ms))?;
        writeln!(f, "ready_changed_ms: {}", OrNone(&self.ready_changed_ms))?;
        writeln!(f, "ready: {}", self.ready)?;
        writeln!(f, "revert_on_loss: {}", self.revert_on_loss)?;
        match &self.last_push {
            Some(push) => writeln!(
                f,
                "last_push: {} to {} interface(s), failed: [{}]",
                push.code,
                push.attempted,
                push.failed.join(", ")
            ),
            None => writeln!(f, "last_push: none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> CountryCodeSnapshot {
        CountryCodeSnapshot {
            driver_country_code: None,
            telephony_country_code: CountryCode::parse("jp"),
            default_country_code: CountryCode::parse("us").unwrap(),
            active_country_code: CountryCode::parse("jp").unwrap(),
            ready: false,
            revert_on_loss: false,
            telephony_updated_ms: Some(1_700_000_000_000),
            driver_updated_ms: None,
            ready_changed_ms: None,
            last_push: None,
        }
    }

    #[test]
    fn test_display_lists_every_field() {
        let text = snapshot().to_string();
        for key in [
            "driver_country_code: none",
            "telephony_country_code: JP",
            "default_country_code: US",
            "telephony_updated_ms: 1700000000000",
            "driver_updated_ms: none",
            "ready_changed_ms: none",
            "ready: false",
            "last_push: none",
        ] {
            assert!(text.contains(key), "missing {key:?} in {text}");
        }
    }

    #[test]
    fn test_json_uses_null_for_absent_codes() {
        let json = serde_json::to_value(snapshot()).unwrap();
        assert!(json["driver_country_code"].is_null());
        assert_eq!(json["telephony_country_code"], "JP");
        assert_eq!(json["ready"], false);
    }
}
