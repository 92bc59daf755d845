use crate::KV;
use chrono::{DateTime, Utc};

/// Status of an alert, or of a group of alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Firing,
    Resolved,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Firing => "firing",
            Status::Resolved => "resolved",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An alert as produced by rule evaluation, before it's been shaped
/// for notification templates.
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(default)]
    pub labels: KV,
    #[serde(default)]
    pub annotations: KV,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "generatorURL")]
    pub generator_url: String,
}

impl Alert {
    /// Status of the alert as of `now`. An alert is resolved once its end
    /// time has passed, and firing otherwise.
    pub fn status_at(&self, now: DateTime<Utc>) -> Status {
        match self.ends_at {
            Some(ends_at) if ends_at <= now => Status::Resolved,
            _ => Status::Firing,
        }
    }

    /// Fingerprint which identifies the alert by its label set.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_labels(&self.labels)
    }
}

/// Fingerprint is a stable 64-bit FNV-1a hash of a label set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub u64);

const FNV_OFFSET: u64 = 14695981039346656037;
const FNV_PRIME: u64 = 1099511628211;
const SEPARATOR: u8 = 0xff;

impl Fingerprint {
    pub fn of_labels(labels: &KV) -> Self {
        let mut hash = FNV_OFFSET;
        let mut add = |bytes: &[u8]| {
            for b in bytes {
                hash ^= *b as u64;
                hash = hash.wrapping_mul(FNV_PRIME);
            }
        };
        // KV iterates in sorted name order.
        for (name, value) in labels.iter() {
            add(name.as_bytes());
            add(&[SEPARATOR]);
            add(value.as_bytes());
            add(&[SEPARATOR]);
        }
        Self(hash)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_at() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let mut alert = Alert::default();
        assert_eq!(alert.status_at(now), Status::Firing);

        alert.ends_at = Some(now + chrono::Duration::minutes(5));
        assert_eq!(alert.status_at(now), Status::Firing);

        alert.ends_at = Some(now);
        assert_eq!(alert.status_at(now), Status::Resolved);

        alert.ends_at = Some(now - chrono::Duration::seconds(1));
        assert_eq!(alert.status_at(now), Status::Resolved);
    }

    #[test]
    fn test_fingerprint() {
        let empty = Alert::default();
        assert_eq!(empty.fingerprint().0, FNV_OFFSET);
        assert_eq!(empty.fingerprint().to_string(), "cbf29ce484222325");

        let a = Alert {
            labels: [("alertname", "A"), ("team", "infra")].into_iter().collect(),
            ..Default::default()
        };
        let b = Alert {
            labels: [("team", "infra"), ("alertname", "A")].into_iter().collect(),
            annotations: [("summary", "ignored")].into_iter().collect(),
            ..Default::default()
        };
        let c = Alert {
            labels: [("alertname", "A"), ("team", "infrb")].into_iter().collect(),
            ..Default::default()
        };

        // Order of insertion and annotations don't matter. Values do.
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().to_string().len(), 16);
    }

    #[test]
    fn test_alert_deserialize() {
        let alert: Alert = serde_json::from_str(
            r#"{
                "labels": {"alertname": "HighCPU"},
                "startsAt": "2024-05-01T12:00:00Z",
                "generatorURL": "http://localhost:3000/alerting/grafana/abc/view"
            }"#,
        )
        .unwrap();

        assert_eq!(alert.labels.get("alertname"), Some("HighCPU"));
        assert!(alert.annotations.is_empty());
        assert!(alert.ends_at.is_none());
        assert_eq!(
            alert.starts_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(
            alert.generator_url,
            "http://localhost:3000/alerting/grafana/abc/view"
        );
    }
}
