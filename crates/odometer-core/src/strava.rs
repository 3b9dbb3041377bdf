//! Strava request and response payloads.
//!
//! Only the JSON shapes and URL/header text live here; the HTTPS transport is
//! provided by the firmware.

use core::fmt::{self, Write};

use heapless::String as HeaplessString;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, Visitor},
};

use crate::format::DistanceKm;

pub const TOKEN_URL: &str = "https://www.strava.com/oauth/token";
pub const GEAR_URL_PREFIX: &str = "https://www.strava.com/api/v3/gear/";
pub const UNKNOWN_GEAR: &str = "Unknown Gear";

pub const GEAR_NAME_BYTES: usize = 64;
pub const ACCESS_TOKEN_BYTES: usize = 64;
/// Scratch for decoding JSON string escapes; the longest string in a response
/// (including ignored fields) must fit once unescaped.
pub const UNESCAPE_BYTES: usize = 1024;

pub type GearName = HeaplessString<GEAR_NAME_BYTES>;
pub type AccessToken = HeaplessString<ACCESS_TOKEN_BYTES>;
pub type GearUrl = HeaplessString<128>;
pub type BearerHeader = HeaplessString<{ ACCESS_TOKEN_BYTES + 7 }>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FetchError {
    /// DNS, TCP, TLS or HTTP framing failure.
    Transport,
    /// Non-success HTTP status.
    Status(u16),
    /// Token endpoint answered without a usable `access_token`.
    Token,
    /// Body was not the expected JSON or did not fit local buffers.
    Decode,
}

/// One gear lookup result.
#[derive(Clone, Debug, PartialEq)]
pub struct GearReading {
    pub name: GearName,
    pub distance: DistanceKm,
}

impl GearReading {
    /// Names longer than the buffer are cut at a character boundary.
    pub fn new(name: &str, distance: DistanceKm) -> Self {
        Self {
            name: truncated_name(name),
            distance,
        }
    }
}

fn truncated_name(name: &str) -> GearName {
    let mut out = GearName::new();
    for c in name.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Gear name decoded from JSON, cut to [`GEAR_NAME_BYTES`] instead of rejected.
struct LossyName(GearName);

impl<'de> Deserialize<'de> for LossyName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NameVisitor;

        impl Visitor<'_> for NameVisitor {
            type Value = LossyName;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a gear name")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<LossyName, E> {
                Ok(LossyName(truncated_name(value)))
            }
        }

        deserializer.deserialize_str(NameVisitor)
    }
}

/// Static credentials for the refresh-token grant.
#[derive(Clone, Copy, Debug)]
pub struct Credentials<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub refresh_token: &'a str,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    grant_type: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<AccessToken>,
}

#[derive(Deserialize)]
struct GearResponse {
    #[serde(default)]
    name: Option<LossyName>,
    /// Metres.
    #[serde(default)]
    distance: Option<f64>,
}

/// Writes the token refresh JSON into `out`, returning the used length.
pub fn token_request_body(credentials: &Credentials<'_>, out: &mut [u8]) -> Result<usize, FetchError> {
    let request = TokenRequest {
        client_id: credentials.client_id,
        client_secret: credentials.client_secret,
        refresh_token: credentials.refresh_token,
        grant_type: "refresh_token",
    };
    serde_json_core::to_slice(&request, out).map_err(|_| FetchError::Decode)
}

/// A token longer than [`ACCESS_TOKEN_BYTES`] fails to decode.
pub fn parse_access_token(body: &[u8]) -> Result<AccessToken, FetchError> {
    let mut scratch = [0u8; UNESCAPE_BYTES];
    let (response, _) = serde_json_core::from_slice_escaped::<TokenResponse>(body, &mut scratch)
        .map_err(|_| FetchError::Decode)?;

    response
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or(FetchError::Token)
}

pub fn bearer_header(token: &str) -> Result<BearerHeader, FetchError> {
    let mut out = BearerHeader::new();
    write!(out, "Bearer {}", token).map_err(|_| FetchError::Token)?;
    Ok(out)
}

pub fn gear_url(gear_id: &str) -> Result<GearUrl, FetchError> {
    let mut out = GearUrl::new();
    write!(out, "{}{}", GEAR_URL_PREFIX, gear_id).map_err(|_| FetchError::Decode)?;
    Ok(out)
}

/// Missing `name` falls back to [`UNKNOWN_GEAR`], missing `distance` to zero.
pub fn parse_gear(body: &[u8]) -> Result<GearReading, FetchError> {
    let mut scratch = [0u8; UNESCAPE_BYTES];
    let (response, _) = serde_json_core::from_slice_escaped::<GearResponse>(body, &mut scratch)
        .map_err(|_| FetchError::Decode)?;

    let distance = DistanceKm::from_meters(response.distance.unwrap_or(0.0))
        .ok_or(FetchError::Decode)?;
    let name = match response.name {
        Some(LossyName(name)) => name,
        None => truncated_name(UNKNOWN_GEAR),
    };
    Ok(GearReading { name, distance })
}
