// Database models for the submissions table
use diesel::prelude::*;
use geotrace::NormalizedSubmission;
use serde::Serialize;

use super::schema::*;

/// A stored row. Everything past the identity is optional: columns added by
/// later migrations read as null on rows written before they existed.
///
/// Field order matches the table's column order; the JSON listing and the
/// CSV export both rely on it.
#[derive(Queryable, Selectable, Serialize, Clone, Debug, PartialEq)]
#[diesel(table_name = submissions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Submission {
    pub id: i64,
    pub created_at: String,

    pub public_ip: Option<String>,
    pub public_ipv4: Option<String>,
    pub public_ipv6: Option<String>,

    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub postal: Option<String>,

    pub isp: Option<String>,
    pub org: Option<String>,
    pub asn: Option<String>,

    pub ip_lat: Option<f64>,
    pub ip_lon: Option<f64>,

    pub gps_lat: Option<f64>,
    pub gps_lon: Option<f64>,
    pub gps_accuracy_m: Option<f64>,

    pub is_vpn: Option<i64>,     // null = unknown
    pub is_proxy: Option<i64>,
    pub is_tor: Option<i64>,

    pub device_name: Option<String>,
    pub platform: Option<String>,
    pub language: Option<String>,
    pub timezone: Option<String>,
    pub screen: Option<String>,
    pub viewport: Option<String>,
    pub device_pixel_ratio: Option<f64>,
    pub touch_points: Option<i64>,
    pub user_agent: Option<String>,

    pub referrer: Option<String>,
    pub page_url: Option<String>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = submissions)]
pub struct NewSubmission {
    pub created_at: String,         // UTC, ISO-8601 with trailing Z

    pub public_ip: String,
    pub public_ipv4: String,
    pub public_ipv6: String,

    pub country: String,
    pub region: String,
    pub city: String,
    pub postal: String,

    pub isp: String,
    pub org: String,
    pub asn: String,

    pub ip_lat: Option<f64>,
    pub ip_lon: Option<f64>,

    pub gps_lat: Option<f64>,
    pub gps_lon: Option<f64>,
    pub gps_accuracy_m: Option<f64>,

    pub is_vpn: Option<i64>,
    pub is_proxy: Option<i64>,
    pub is_tor: Option<i64>,

    pub device_name: String,
    pub platform: String,
    pub language: String,
    pub timezone: String,
    pub screen: String,
    pub viewport: String,
    pub device_pixel_ratio: f64,
    pub touch_points: i64,
    pub user_agent: String,

    pub referrer: String,
    pub page_url: String,
}

impl NewSubmission {
    /// Stamp a normalized submission with its insertion time
    pub fn stamped(n: NormalizedSubmission, created_at: String) -> Self {
        NewSubmission {
            created_at,
            public_ip: n.public_ip,
            public_ipv4: n.public_ipv4,
            public_ipv6: n.public_ipv6,
            country: n.country,
            region: n.region,
            city: n.city,
            postal: n.postal,
            isp: n.isp,
            org: n.org,
            asn: n.asn,
            ip_lat: n.ip_lat,
            ip_lon: n.ip_lon,
            gps_lat: n.gps_lat,
            gps_lon: n.gps_lon,
            gps_accuracy_m: n.gps_accuracy_m,
            is_vpn: n.is_vpn,
            is_proxy: n.is_proxy,
            is_tor: n.is_tor,
            device_name: n.device_name,
            platform: n.platform,
            language: n.language,
            timezone: n.timezone,
            screen: n.screen,
            viewport: n.viewport,
            device_pixel_ratio: n.device_pixel_ratio,
            touch_points: n.touch_points,
            user_agent: n.user_agent,
            referrer: n.referrer,
            page_url: n.page_url,
        }
    }
}

/// Current UTC time in the stored `created_at` format
pub fn utc_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Result of wiping the table; `reclaimed` is false when VACUUM failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearOutcome {
    pub deleted: usize,
    pub reclaimed: bool,
}
