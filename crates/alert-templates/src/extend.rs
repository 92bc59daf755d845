use crate::template::{TemplateAlert, TemplateData};
use crate::urls::{self, Link};
use crate::{kv, Status, KV};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Annotation holding the UID of the dashboard the alert rule belongs to.
pub const DASHBOARD_UID_ANNOTATION: &str = "__dashboardUid__";
/// Annotation holding the ID of the dashboard panel the alert rule belongs to.
pub const PANEL_ID_ANNOTATION: &str = "__panelId__";
/// Annotation holding the ID of the organization which owns the alert rule.
pub const ORG_ID_ANNOTATION: &str = "__orgId__";
/// Annotation holding a JSON object of the evaluated values of the alert rule.
pub const VALUES_ANNOTATION: &str = "__values__";
/// Annotation holding a human-readable string of the evaluated values.
pub const VALUE_STRING_ANNOTATION: &str = "__value_string__";
/// Annotation holding a token for a screenshot taken when the alert fired.
pub const IMAGE_TOKEN_ANNOTATION: &str = "__alertImageToken__";

/// An image captured for an alert.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Image {
    /// Public URL of the image, if it was uploaded.
    pub url: Option<String>,
    /// Name under which the image is embedded into the notification, if any.
    pub embedded: Option<String>,
}

/// ImageStore resolves image tokens of alerts into their Images.
pub trait ImageStore {
    fn image(&self, token: &str) -> Option<Image>;
}

/// ImageStore which has no images.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImages;

impl ImageStore for NoImages {
    fn image(&self, _token: &str) -> Option<Image> {
        None
    }
}

impl<F> ImageStore for F
where
    F: Fn(&str) -> Option<Image>,
{
    fn image(&self, token: &str) -> Option<Image> {
        self(token)
    }
}

/// An alert, extended with links and values for use within notification templates.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedAlert {
    pub status: Status,
    pub labels: KV,
    pub annotations: KV,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(rename = "generatorURL")]
    pub generator_url: String,
    pub fingerprint: String,
    #[serde(rename = "silenceURL")]
    pub silence_url: String,
    #[serde(rename = "dashboardURL")]
    pub dashboard_url: String,
    #[serde(rename = "panelURL")]
    pub panel_url: String,
    pub values: BTreeMap<String, f64>,
    pub value_string: String,
    #[serde(rename = "imageURL", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_image: Option<String>,
}

/// ExtendedAlerts of a notification.
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ExtendedAlerts(pub Vec<ExtendedAlert>);

impl ExtendedAlerts {
    /// Alerts which are firing.
    pub fn firing(&self) -> Vec<&ExtendedAlert> {
        self.with_status(Status::Firing)
    }

    /// Alerts which are resolved.
    pub fn resolved(&self) -> Vec<&ExtendedAlert> {
        self.with_status(Status::Resolved)
    }

    fn with_status(&self, status: Status) -> Vec<&ExtendedAlert> {
        self.0.iter().filter(|a| a.status == status).collect()
    }
}

impl std::ops::Deref for ExtendedAlerts {
    type Target = [ExtendedAlert];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// TemplateData which has been extended for use within notification templates.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedData {
    pub receiver: String,
    pub status: Status,
    pub alerts: ExtendedAlerts,
    pub group_labels: KV,
    pub common_labels: KV,
    pub common_annotations: KV,
    #[serde(rename = "externalURL")]
    pub external_url: String,
}

/// Extend all alerts of the TemplateData, and remove private labels and
/// annotations from the group.
pub fn extend_data(data: TemplateData, images: &dyn ImageStore) -> ExtendedData {
    let TemplateData {
        receiver,
        status,
        alerts,
        group_labels,
        common_labels,
        common_annotations,
        external_url,
    } = data;

    let alerts = alerts
        .into_iter()
        .map(|alert| extend_alert(alert, &external_url, images))
        .collect();

    ExtendedData {
        receiver,
        status,
        alerts: ExtendedAlerts(alerts),
        group_labels: group_labels.remove_private(),
        common_labels: common_labels.remove_private(),
        common_annotations: common_annotations.remove_private(),
        external_url,
    }
}

/// Extend a TemplateAlert with links into `external_url` and with its
/// evaluated values. Links or values which can't be built are logged
/// and left empty.
pub fn extend_alert(
    alert: TemplateAlert,
    external_url: &str,
    images: &dyn ImageStore,
) -> ExtendedAlert {
    let TemplateAlert {
        status,
        labels,
        annotations,
        starts_at,
        ends_at,
        generator_url,
        fingerprint,
    } = alert;

    let mut extended = ExtendedAlert {
        status,
        labels: labels.clone().remove_private(),
        annotations: annotations.clone().remove_private(),
        starts_at,
        ends_at,
        generator_url,
        fingerprint,
        silence_url: String::new(),
        dashboard_url: String::new(),
        panel_url: String::new(),
        values: BTreeMap::new(),
        value_string: String::new(),
        image_url: None,
        embedded_image: None,
    };

    if let Some(values) = annotations.get(VALUES_ANNOTATION) {
        match serde_json::from_str::<Option<BTreeMap<String, f64>>>(values) {
            Ok(values) => extended.values = values.unwrap_or_default(),
            Err(error) => {
                tracing::warn!(%error, %values, "failed to unmarshal values annotation")
            }
        }
    }
    if let Some(value_string) = annotations.get(VALUE_STRING_ANNOTATION) {
        extended.value_string = value_string.to_string();
    }

    if let Some(image) = annotations
        .get(IMAGE_TOKEN_ANNOTATION)
        .and_then(|token| images.image(token))
    {
        extended.image_url = image.url;
        extended.embedded_image = image.embedded;
    }

    if external_url.is_empty() {
        return extended;
    }
    let mut link = match Link::parse(external_url) {
        Ok(link) => link,
        Err(error) => {
            tracing::debug!(
                url = %external_url,
                %error,
                "failed to parse external URL while extending template data"
            );
            return extended;
        }
    };
    let external_path = link.path().to_string();

    let annotation = |name: &str| annotations.get(name).filter(|s| !s.is_empty());

    if let Some(dashboard_uid) = annotation(DASHBOARD_UID_ANNOTATION) {
        // Other reserved characters of the UID are escaped by `set_path`.
        let dashboard_uid = dashboard_uid.replace('%', "%25");
        link.set_path(&urls::join_path([
            external_path.as_str(),
            "/d/",
            dashboard_uid.as_str(),
        ]));
        let mut dashboard_link = link.clone();

        let mut panel_link = annotation(PANEL_ID_ANNOTATION).map(|panel_id| {
            let mut panel_link = link.clone();
            panel_link.set_query(Some(&format!("viewPanel={panel_id}")));
            panel_link
        });

        if let Some(org_id) = annotation(ORG_ID_ANNOTATION) {
            dashboard_link.set_query_param("orgId", org_id);

            if let Some(panel_link) = panel_link.as_mut() {
                panel_link.set_query_param("orgId", org_id);
            }

            if !extended.generator_url.is_empty() {
                match Link::parse(&extended.generator_url) {
                    Ok(mut generator_link) => {
                        generator_link.set_query_param("orgId", org_id);
                        extended.generator_url = generator_link.to_string();
                    }
                    Err(error) => {
                        tracing::debug!(
                            url = %extended.generator_url,
                            %error,
                            "failed to parse generator URL while extending template data"
                        );
                    }
                }
            }
        }

        extended.dashboard_url = dashboard_link.to_string();
        extended.panel_url = panel_link.map(|l| l.to_string()).unwrap_or_default();
    }

    link.set_path(&urls::join_path([
        external_path.as_str(),
        "/alerting/silence/new",
    ]));
    extended.silence_url = silence_url(link, &labels);

    extended
}

// Build a link which creates a silence matching all public `labels`.
fn silence_url(mut link: Link, labels: &KV) -> String {
    let mut matchers: Vec<String> = labels
        .iter()
        .filter(|(name, _)| !kv::is_private_key(name))
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    matchers.sort();

    let query = urls::encode_query(
        std::iter::once(("alertmanager", "grafana"))
            .chain(matchers.iter().map(|m| ("matcher", m.as_str()))),
    );
    link.set_query(Some(&query));

    link.to_string()
}
