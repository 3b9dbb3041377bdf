//! Remote control over plain HTTP: a status page and a restart trigger.
//!
//! Request parsing is deliberately loose: any request whose text mentions
//! `restart` in any case restarts the device; everything else gets the page.

use core::fmt::Write;

use heapless::String as HeaplessString;

use crate::format::DistanceKm;

pub const CONTROL_PORT: u16 = 80;
/// A single read of at most this many bytes is classified.
pub const REQUEST_BUFFER_BYTES: usize = 1024;
pub const POLL_INTERVAL_MS: u64 = 1_000;

/// Scrolled on the matrix right before a remote restart.
pub const RESTART_BANNER: &str = "Updating...";

pub const RESTART_RESPONSE: &[u8] =
    b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\n\r\nRestarting device...";

const STATUS_HEADER: &str = "HTTP/1.0 200 OK\r\nContent-Type: text/html\r\n\r\n";
const STATUS_PAGE_BYTES: usize = 512;

pub type StatusPage = HeaplessString<STATUS_PAGE_BYTES>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlRequest {
    Restart,
    Status,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlError {
    /// Request bytes were not valid UTF-8.
    Malformed,
}

/// Full HTTP response for one connection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ControlReply {
    Restart,
    Status(StatusPage),
}

impl ControlReply {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Restart => RESTART_RESPONSE,
            Self::Status(page) => page.as_bytes(),
        }
    }

    pub fn is_restart(&self) -> bool {
        matches!(self, Self::Restart)
    }
}

pub fn classify_request(raw: &[u8]) -> Result<ControlRequest, ControlError> {
    let text = core::str::from_utf8(raw).map_err(|_| ControlError::Malformed)?;
    if contains_ignore_ascii_case(text.as_bytes(), b"restart") {
        Ok(ControlRequest::Restart)
    } else {
        Ok(ControlRequest::Status)
    }
}

/// Status page showing `distance`, or `Unknown` when there is none.
pub fn status_page(distance: Option<DistanceKm>) -> StatusPage {
    let mut out = StatusPage::new();
    let _ = out.push_str(STATUS_HEADER);
    let _ = out.push_str(
        "<html><body style='font-family: Arial, sans-serif; max-width: 600px; \
         margin: 40px auto; padding: 20px;'>",
    );
    let _ = out.push_str("<h1>Strava Gear km Display</h1>");
    let _ = match distance {
        Some(distance) => write!(
            out,
            "<h2>Current Distance: {:.1}km</h2>",
            distance.get()
        ),
        None => write!(out, "<h2>Current Distance: Unknown</h2>"),
    };
    let _ = out.push_str(
        "<p>To restart the device, visit: <a href='/restart'>/restart</a></p>",
    );
    let _ = out.push_str("</body></html>");
    out
}

fn contains_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_matches_anywhere_in_any_case() {
        for raw in [
            &b"GET /restart HTTP/1.1\r\nHost: odometer\r\n\r\n"[..],
            b"GET /RESTART HTTP/1.1\r\n\r\n",
            b"POST / HTTP/1.1\r\n\r\naction=ReStArT",
            b"restart",
        ] {
            assert_eq!(classify_request(raw), Ok(ControlRequest::Restart));
        }
    }

    #[test]
    fn everything_else_gets_the_status_page() {
        assert_eq!(
            classify_request(b"GET / HTTP/1.1\r\n\r\n"),
            Ok(ControlRequest::Status)
        );
        assert_eq!(classify_request(b"GET /restar"), Ok(ControlRequest::Status));
        assert_eq!(classify_request(b""), Ok(ControlRequest::Status));
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        assert_eq!(
            classify_request(&[b'G', b'E', b'T', 0xFF, 0xFE]),
            Err(ControlError::Malformed)
        );
    }

    #[test]
    fn status_page_reports_distance_or_unknown() {
        let page = status_page(DistanceKm::new(87.34));
        assert!(page.starts_with("HTTP/1.0 200 OK\r\nContent-Type: text/html\r\n\r\n<html>"));
        assert!(page.contains("<h1>Strava Gear km Display</h1>"));
        assert!(page.contains("<h2>Current Distance: 87.3km</h2>"));
        assert!(page.contains("<a href='/restart'>/restart</a>"));
        assert!(page.ends_with("</body></html>"));

        let page = status_page(None);
        assert!(page.contains("<h2>Current Distance: Unknown</h2>"));
    }

    #[test]
    fn status_page_fits_the_largest_distance() {
        let page = status_page(DistanceKm::new(1e300));
        assert!(page.contains("<h2>Current Distance: 9999999.9km</h2>"));
        assert!(page.ends_with("</body></html>"));
    }

    #[test]
    fn restart_reply_is_plain_text() {
        let reply = ControlReply::Restart;
        assert!(reply.is_restart());
        assert!(reply.as_bytes().ends_with(b"\r\n\r\nRestarting device..."));
    }
}
