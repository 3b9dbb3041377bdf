//! Network bring-up settings and failure kinds.

pub use odometer_core::link::{WIFI_CONNECT_ATTEMPTS, WIFI_CONNECT_POLL_SECS};
use odometer_core::strava::Credentials;

/// Wi-Fi credentials source.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WifiConfig {
    pub ssid: &'static str,
    pub password: &'static str,
}

impl WifiConfig {
    pub const fn new(ssid: &'static str, password: &'static str) -> Self {
        Self { ssid, password }
    }
}

/// Strava application credentials and the tracked gear.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StravaConfig {
    pub client_id: &'static str,
    pub client_secret: &'static str,
    pub refresh_token: &'static str,
    pub gear_id: &'static str,
}

impl StravaConfig {
    pub const fn new(
        client_id: &'static str,
        client_secret: &'static str,
        refresh_token: &'static str,
        gear_id: &'static str,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            refresh_token,
            gear_id,
        }
    }

    pub const fn credentials(&self) -> Credentials<'static> {
        Credentials {
            client_id: self.client_id,
            client_secret: self.client_secret,
            refresh_token: self.refresh_token,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NetworkError {
    /// Radio driver or Wi-Fi peripheral could not be initialized.
    RadioInit,
    /// Station configuration was rejected.
    WifiConfig,
    /// No association or IPv4 lease within the allowed attempts.
    Unavailable,
}
