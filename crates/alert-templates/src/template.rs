use crate::{Alert, Status, KV};
use chrono::{DateTime, Utc};

/// An alert as seen by notification templates.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateAlert {
    pub status: Status,
    pub labels: KV,
    pub annotations: KV,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(rename = "generatorURL")]
    pub generator_url: String,
    pub fingerprint: String,
}

/// Data of a single notification: a group of alerts bound for one receiver.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateData {
    pub receiver: String,
    pub status: Status,
    pub alerts: Vec<TemplateAlert>,
    pub group_labels: KV,
    pub common_labels: KV,
    pub common_annotations: KV,
    #[serde(rename = "externalURL")]
    pub external_url: String,
}

impl TemplateData {
    /// Build TemplateData for the group of `alerts`, evaluating each alert's
    /// status as of `now`.
    pub fn new(
        receiver: impl Into<String>,
        group_labels: KV,
        alerts: &[Alert],
        external_url: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let alerts: Vec<TemplateAlert> = alerts
            .iter()
            .map(|alert| TemplateAlert {
                status: alert.status_at(now),
                labels: alert.labels.clone(),
                annotations: alert.annotations.clone(),
                starts_at: alert.starts_at,
                ends_at: alert.ends_at,
                generator_url: alert.generator_url.clone(),
                fingerprint: alert.fingerprint().to_string(),
            })
            .collect();

        let status = if alerts.iter().any(|a| a.status == Status::Firing) {
            Status::Firing
        } else {
            Status::Resolved
        };

        let common_labels = common(alerts.iter().map(|a| &a.labels));
        let common_annotations = common(alerts.iter().map(|a| &a.annotations));

        Self {
            receiver: receiver.into(),
            status,
            alerts,
            group_labels,
            common_labels,
            common_annotations,
            external_url: external_url.into(),
        }
    }
}

/// Notification is a group of Alerts bound for a receiver, as accepted
/// from outside callers.
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default)]
    pub receiver: String,
    #[serde(default)]
    pub group_labels: KV,
    #[serde(default, rename = "externalURL")]
    pub external_url: String,
    pub alerts: Vec<Alert>,
}

impl Notification {
    pub fn into_template_data(self, now: DateTime<Utc>) -> TemplateData {
        let Notification {
            receiver,
            group_labels,
            external_url,
            alerts,
        } = self;

        TemplateData::new(receiver, group_labels, &alerts, external_url, now)
    }
}

// Pairs which are present, with equal values, in every set.
fn common<'a>(mut sets: impl Iterator<Item = &'a KV>) -> KV {
    let Some(first) = sets.next() else {
        return KV::new();
    };
    let mut out = first.clone();

    for set in sets {
        let drop: Vec<String> = out
            .iter()
            .filter(|(name, value)| set.get(name) != Some(*value))
            .map(|(name, _)| name.to_string())
            .collect();
        out = out.remove(drop.iter().map(String::as_str));
    }
    out
}
