//! `tsh status` profile scanning
//!
//! Decides whether a fresh `tsh login` is needed. The scan is best-effort:
//! a malformed `Valid until` line leaves the profile without an expiry, which
//! reads as expired, instead of aborting.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use url::Url;

const PROFILE_URL_MARKER: &str = "Profile URL:";
const VALID_UNTIL_MARKER: &str = "Valid until:";
const TIMESTAMP_LAYOUT: &str = "%Y-%m-%d %H:%M:%S %z";

/// One logged-in proxy as reported by `tsh status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProfile {
    pub proxy_url: String,
    /// `None` when the line was missing or malformed
    pub valid_until: Option<DateTime<FixedOffset>>,
}

impl SessionProfile {
    fn new(proxy_url: impl Into<String>) -> Self {
        Self {
            proxy_url: proxy_url.into(),
            valid_until: None,
        }
    }

    /// Strictly before expiry; a missing expiry is never valid
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_until
            .is_some_and(|until| until.with_timezone(&Utc) > now)
    }

    /// Whether this profile belongs to the configured proxy address
    ///
    /// Exact match, or same scheme, host and port with the path ignored
    /// (`https://proxy.example.com` matches `https://proxy.example.com/webapi`).
    pub fn matches_address(&self, address: &str) -> bool {
        if self.proxy_url == address {
            return true;
        }
        match (Url::parse(&self.proxy_url), Url::parse(address)) {
            (Ok(profile), Ok(target)) => {
                profile.scheme() == target.scheme()
                    && profile.host_str().is_some()
                    && profile.host_str() == target.host_str()
                    && profile.port_or_known_default() == target.port_or_known_default()
            }
            _ => false,
        }
    }
}

/// Zone abbreviations accepted after the numeric offset in `Valid until`
///
/// The offset alone fixes the instant; the abbreviation is only checked so
/// that output from an unexpected locale is not silently trusted. An empty
/// set accepts any abbreviation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeZones(Vec<String>);

impl TimeZones {
    pub fn new<I, S>(zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(zones.into_iter().map(Into::into).collect())
    }

    /// Accept any abbreviation
    pub fn any() -> Self {
        Self(Vec::new())
    }

    pub fn accepts(&self, abbreviation: &str) -> bool {
        self.0.is_empty() || self.0.iter().any(|z| z.eq_ignore_ascii_case(abbreviation))
    }
}

impl Default for TimeZones {
    fn default() -> Self {
        Self::new(["UTC", "WIB"])
    }
}

/// Profiles keyed by proxy URL
pub type Profiles = HashMap<String, SessionProfile>;

/// Scan `tsh status` output into profiles keyed by proxy URL
pub fn parse_profiles(status: &str, zones: &TimeZones) -> Profiles {
    let mut profiles = Profiles::new();
    let mut current: Option<SessionProfile> = None;

    for line in status.lines() {
        if let Some((_, rest)) = line.split_once(PROFILE_URL_MARKER) {
            commit(&mut profiles, current.take());
            let url = rest.trim().trim_start_matches('>').trim();
            current = Some(SessionProfile::new(url));
        } else if let Some((_, rest)) = line.split_once(VALID_UNTIL_MARKER) {
            let Some(profile) = current.as_mut() else {
                tracing::debug!(line, "Valid until line before any profile, ignoring");
                continue;
            };
            let timestamp = rest.split('[').next().unwrap_or_default().trim();
            profile.valid_until = parse_timestamp(timestamp, zones);
        }
    }
    commit(&mut profiles, current);

    profiles
}

fn commit(profiles: &mut Profiles, profile: Option<SessionProfile>) {
    if let Some(profile) = profile {
        if !profile.proxy_url.is_empty() {
            profiles.insert(profile.proxy_url.clone(), profile);
        }
    }
}

/// Parse `2024-01-01 10:00:00 +0700 WIB`
pub fn parse_timestamp(timestamp: &str, zones: &TimeZones) -> Option<DateTime<FixedOffset>> {
    let Some((datetime, zone)) = timestamp.rsplit_once(' ') else {
        tracing::warn!(timestamp, "Malformed session expiry, treating as expired");
        return None;
    };
    if !zones.accepts(zone) {
        tracing::warn!(timestamp, zone, "Unrecognized time zone in session expiry, treating as expired");
        return None;
    }
    match DateTime::parse_from_str(datetime, TIMESTAMP_LAYOUT) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(timestamp, error = %e, "Malformed session expiry, treating as expired");
            None
        }
    }
}

/// Logged in iff some profile for `address` expires strictly after `now`
///
/// Every profile matching the address is considered, so the answer does not
/// depend on map order when several share the proxy origin.
pub fn has_valid_session(profiles: &Profiles, address: &str, now: DateTime<Utc>) -> bool {
    profiles
        .values()
        .filter(|p| p.matches_address(address))
        .any(|p| p.is_valid_at(now))
}
