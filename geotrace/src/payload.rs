use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::normalize::*;

/// Body of `POST /api/submit` as sent by the landing page.
///
/// Leaves stay raw JSON values so coercion happens in one place
/// (`normalize`). Nested sections that are missing or not objects
/// deserialize to their empty default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubmitPayload {
    #[serde(rename = "publicIP")]
    pub public_ip: Value,
    #[serde(rename = "publicIPv4")]
    pub public_ipv4: Value,
    #[serde(rename = "publicIPv6")]
    pub public_ipv6: Value,
    #[serde(rename = "deviceInfo", deserialize_with = "object_or_default")]
    pub device_info: DeviceInfo,
    #[serde(deserialize_with = "object_or_default")]
    pub geo: GeoInfo,
    #[serde(deserialize_with = "object_or_default")]
    pub gps: GpsFix,
    #[serde(deserialize_with = "object_or_default")]
    pub page: PageContext,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceInfo {
    pub user_agent: Value,
    pub device_name: Value,
    pub platform: Value,
    pub language: Value,
    pub time_zone: Value,
    pub screen: Value,
    pub viewport: Value,
    pub device_pixel_ratio: Value,
    pub touch_points: Value,
}

/// Geo-IP lookup result, keys as produced by the lookup service
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GeoInfo {
    pub country: Value,
    pub region: Value,
    pub city: Value,
    pub postal: Value,
    pub isp: Value,
    pub org: Value,
    pub asn: Value,
    pub lat: Value,
    pub lon: Value,
    pub is_vpn: Value,
    pub is_proxy: Value,
    pub is_tor: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GpsFix {
    pub lat: Value,
    pub lon: Value,
    pub accuracy_m: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageContext {
    pub referrer: Value,
    pub url: Value,
}

fn object_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
        _ => T::default(),
    })
}

/// Fully coerced submission, ready to be stamped and stored
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedSubmission {
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

impl SubmitPayload {
    /// Parse a request body. Never fails: empty, malformed or non-object
    /// bodies yield the empty payload.
    pub fn from_slice(body: &[u8]) -> Self {
        serde_json::from_slice::<Value>(body)
            .ok()
            .filter(Value::is_object)
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    pub fn normalize(&self) -> NormalizedSubmission {
        let di = &self.device_info;
        let geo = &self.geo;

        let platform = clean_text(&di.platform, DEVICE_LIMIT);
        let mut device_name = clean_text(&di.device_name, DEVICE_LIMIT);
        if device_name.is_empty() {
            device_name = platform.clone();
        }

        NormalizedSubmission {
            public_ip: clean_text(&self.public_ip, PUBLIC_IP_LIMIT),
            public_ipv4: clean_text(&self.public_ipv4, PUBLIC_IPV4_LIMIT),
            public_ipv6: clean_text(&self.public_ipv6, PUBLIC_IPV6_LIMIT),

            country: clean_text(&geo.country, PLACE_LIMIT),
            region: clean_text(&geo.region, PLACE_LIMIT),
            city: clean_text(&geo.city, PLACE_LIMIT),
            postal: clean_text(&geo.postal, POSTAL_LIMIT),

            isp: clean_text(&geo.isp, NETWORK_OWNER_LIMIT),
            org: clean_text(&geo.org, NETWORK_OWNER_LIMIT),
            asn: clean_text(&geo.asn, ASN_LIMIT),

            ip_lat: fnum(&geo.lat),
            ip_lon: fnum(&geo.lon),

            gps_lat: fnum(&self.gps.lat),
            gps_lon: fnum(&self.gps.lon),
            gps_accuracy_m: fnum(&self.gps.accuracy_m),

            is_vpn: inum(&geo.is_vpn),
            is_proxy: inum(&geo.is_proxy),
            is_tor: inum(&geo.is_tor),

            device_name,
            platform,
            language: clean_text(&di.language, LANGUAGE_LIMIT),
            timezone: clean_text(&di.time_zone, TIMEZONE_LIMIT),
            screen: clean_text(&di.screen, DIMENSION_LIMIT),
            viewport: clean_text(&di.viewport, DIMENSION_LIMIT),
            device_pixel_ratio: fnum(&di.device_pixel_ratio).unwrap_or(0.0),
            touch_points: inum(&di.touch_points).unwrap_or(0),
            user_agent: clean_text(&di.user_agent, USER_AGENT_LIMIT),

            referrer: clean_text(&self.page.referrer, PAGE_LIMIT),
            page_url: clean_text(&self.page.url, PAGE_LIMIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(body: Value) -> NormalizedSubmission {
        SubmitPayload::from_slice(body.to_string().as_bytes()).normalize()
    }

    #[test]
    fn malformed_bodies_become_empty_payloads() {
        let bodies: [&[u8]; 5] = [b"", b"not json", b"[1,2,3]", b"\"text\"", b"null"];
        for body in bodies {
            let n = SubmitPayload::from_slice(body).normalize();
            assert_eq!(n, NormalizedSubmission::default());
        }
    }

    #[test]
    fn out_of_range_numbers_only_lose_their_own_field() {
        let body = br#"{"deviceInfo":{"userAgent":"Mozilla","touchPoints":1e400},"geo":{"lat":1e400,"lon":"2.5","is_vpn":-1e999}}"#;
        let n = SubmitPayload::from_slice(body).normalize();
        assert_eq!(n.user_agent, "Mozilla");
        assert_eq!(n.ip_lat, None);
        assert_eq!(n.ip_lon, Some(2.5));
        assert_eq!(n.is_vpn, None);
        assert_eq!(n.touch_points, 0);
    }

    #[test]
    fn non_object_sections_are_treated_as_empty() {
        let n = normalize(json!({
            "deviceInfo": "oops",
            "geo": [1, 2],
            "gps": null,
            "page": 17
        }));
        assert_eq!(n.user_agent, "");
        assert_eq!(n.country, "");
        assert_eq!(n.gps_lat, None);
        assert_eq!(n.page_url, "");
    }

    #[test]
    fn full_payload_is_coerced() {
        let n = normalize(json!({
            "publicIP": " 203.0.113.7 ",
            "publicIPv4": "203.0.113.7",
            "publicIPv6": "2001:db8::1",
            "deviceInfo": {
                "userAgent": "Mozilla/5.0 (X11; Linux x86_64)",
                "deviceName": "Pixel 8",
                "platform": "Linux",
                "language": "fr-FR",
                "timeZone": "Europe/Paris",
                "screen": "1080x2400",
                "viewport": "412x915",
                "devicePixelRatio": "2.625",
                "touchPoints": 5
            },
            "geo": {
                "country": "France",
                "region": "Ile-de-France",
                "city": "Paris",
                "postal": 75001,
                "isp": "Example ISP",
                "org": "Example Org",
                "asn": "AS64500",
                "lat": "48.8566",
                "lon": 2.3522,
                "is_vpn": true,
                "is_proxy": "0",
                "is_tor": ""
            },
            "gps": {"lat": 48.85, "lon": "2.35", "accuracy_m": "12.5"},
            "page": {"referrer": "https://example.org/", "url": "https://example.com/?a=1"}
        }));

        assert_eq!(n.public_ip, "203.0.113.7");
        assert_eq!(n.public_ipv6, "2001:db8::1");
        assert_eq!(n.postal, "75001");
        assert_eq!(n.ip_lat, Some(48.8566));
        assert_eq!(n.ip_lon, Some(2.3522));
        assert_eq!(n.gps_lon, Some(2.35));
        assert_eq!(n.gps_accuracy_m, Some(12.5));
        assert_eq!(n.is_vpn, Some(1));
        assert_eq!(n.is_proxy, Some(0));
        assert_eq!(n.is_tor, None);
        assert_eq!(n.device_name, "Pixel 8");
        assert_eq!(n.timezone, "Europe/Paris");
        assert_eq!(n.device_pixel_ratio, 2.625);
        assert_eq!(n.touch_points, 5);
        assert_eq!(n.page_url, "https://example.com/?a=1");
    }

    #[test]
    fn device_name_falls_back_to_platform() {
        let n = normalize(json!({"deviceInfo": {"platform": "MacIntel"}}));
        assert_eq!(n.device_name, "MacIntel");

        let n = normalize(json!({"deviceInfo": {"deviceName": "  ", "platform": "Win32"}}));
        assert_eq!(n.device_name, "Win32");

        let n = normalize(json!({"deviceInfo": {}}));
        assert_eq!(n.device_name, "");
    }

    #[test]
    fn invalid_display_metrics_default_to_zero() {
        let n = normalize(json!({
            "deviceInfo": {"devicePixelRatio": "wide", "touchPoints": "many"}
        }));
        assert_eq!(n.device_pixel_ratio, 0.0);
        assert_eq!(n.touch_points, 0);
    }

    #[test]
    fn every_text_field_is_capped() {
        let long = "x".repeat(5000);
        let n = normalize(json!({
            "publicIPv6": long,
            "deviceInfo": {"userAgent": long, "language": long},
            "geo": {"postal": long, "asn": long},
            "page": {"url": long}
        }));
        assert_eq!(n.public_ipv6.len(), PUBLIC_IPV6_LIMIT);
        assert_eq!(n.user_agent.len(), USER_AGENT_LIMIT);
        assert_eq!(n.language.len(), LANGUAGE_LIMIT);
        assert_eq!(n.postal.len(), POSTAL_LIMIT);
        assert_eq!(n.asn.len(), ASN_LIMIT);
        assert_eq!(n.page_url.len(), PAGE_LIMIT);
    }
}
