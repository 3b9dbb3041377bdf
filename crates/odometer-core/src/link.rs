//! Bounded Wi-Fi join.
//!
//! Association and the DHCP lease wait draw from one attempt budget, spaced
//! [`WIFI_CONNECT_POLL_SECS`] apart. A failed association is retried on the
//! next attempt; there is no reconnect once the budget is spent.

/// Attempts before the network is declared unavailable.
pub const WIFI_CONNECT_ATTEMPTS: u32 = 10;
pub const WIFI_CONNECT_POLL_SECS: u64 = 1;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinStep {
    /// Issue (or reissue) the association request, then look for a lease.
    Associate,
    /// Already associated; only look for a lease.
    AwaitLease,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct JoinAttempts {
    used: u32,
    limit: u32,
    associated: bool,
}

impl JoinAttempts {
    pub const fn new(limit: u32) -> Self {
        Self {
            used: 0,
            limit,
            associated: false,
        }
    }

    /// Spends one attempt; `None` once the budget is exhausted.
    pub fn next_step(&mut self) -> Option<JoinStep> {
        if self.used >= self.limit {
            return None;
        }
        self.used += 1;
        Some(if self.associated {
            JoinStep::AwaitLease
        } else {
            JoinStep::Associate
        })
    }

    pub fn mark_associated(&mut self) {
        self.associated = true;
    }

    /// Association failed or dropped; the next attempt associates again.
    pub fn mark_disassociated(&mut self) {
        self.associated = false;
    }

    /// 1-based number of the attempt in progress.
    pub fn attempt(&self) -> u32 {
        self.used
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

impl Default for JoinAttempts {
    fn default() -> Self {
        Self::new(WIFI_CONNECT_ATTEMPTS)
    }
}
