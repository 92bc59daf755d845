use alert_templates::{extend_data, NoImages, Notification, Status, TemplateData};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn notification(external_url: &str, annotations: serde_json::Value) -> TemplateData {
    let notification: Notification = serde_json::from_value(serde_json::json!({
        "receiver": "ops-email",
        "groupLabels": {"alertname": "HighLatency"},
        "externalURL": external_url,
        "alerts": [{
            "labels": {"alertname": "HighLatency", "service": "api", "__alert_rule_uid__": "rule-1"},
            "annotations": annotations,
            "startsAt": "2024-05-01T11:30:00Z",
            "generatorURL": "https://grafana.example.com/alerting/grafana/rule-1/view"
        }]
    }))
    .unwrap();

    notification.into_template_data(now())
}

#[test]
fn test_extended_notification_snapshot() {
    let data = notification(
        "https://grafana.example.com/",
        serde_json::json!({
            "summary": "p99 latency above 1s",
            "__dashboardUid__": "dash-1",
            "__panelId__": "4",
            "__orgId__": "2",
            "__values__": r#"{"B": 1.5}"#,
            "__value_string__": "[ var='B' value=1.5 ]"
        }),
    );
    let extended = extend_data(data, &NoImages);

    insta::assert_json_snapshot!(extended, {".alerts[].fingerprint" => "[fingerprint]"}, @r###"
    {
      "receiver": "ops-email",
      "status": "firing",
      "alerts": [
        {
          "status": "firing",
          "labels": {
            "alertname": "HighLatency",
            "service": "api"
          },
          "annotations": {
            "summary": "p99 latency above 1s"
          },
          "startsAt": "2024-05-01T11:30:00Z",
          "endsAt": null,
          "generatorURL": "https://grafana.example.com/alerting/grafana/rule-1/view?orgId=2",
          "fingerprint": "[fingerprint]",
          "silenceURL": "https://grafana.example.com/alerting/silence/new?alertmanager=grafana&matcher=alertname%3DHighLatency&matcher=service%3Dapi",
          "dashboardURL": "https://grafana.example.com/d/dash-1?orgId=2",
          "panelURL": "https://grafana.example.com/d/dash-1?orgId=2&viewPanel=4",
          "values": {
            "B": 1.5
          },
          "valueString": "[ var='B' value=1.5 ]"
        }
      ],
      "groupLabels": {
        "alertname": "HighLatency"
      },
      "commonLabels": {
        "alertname": "HighLatency",
        "service": "api"
      },
      "commonAnnotations": {
        "summary": "p99 latency above 1s"
      },
      "externalURL": "https://grafana.example.com/"
    }
    "###);
}

#[test]
fn test_no_dashboard_uid_means_no_dashboard_links() {
    let data = notification(
        "https://grafana.example.com/",
        serde_json::json!({"__panelId__": "4", "__orgId__": "2"}),
    );
    let extended = extend_data(data, &NoImages);
    let alert = &extended.alerts[0];

    assert_eq!(alert.dashboard_url, "");
    assert_eq!(alert.panel_url, "");
    // Without a dashboard, the generator URL isn't scoped to the org.
    assert_eq!(
        alert.generator_url,
        "https://grafana.example.com/alerting/grafana/rule-1/view"
    );
}

#[test]
fn test_dashboard_url_joins_base_path() {
    for (external_url, expect) in [
        ("http://localhost:3000", "http://localhost:3000/d/abc"),
        ("http://localhost:3000/", "http://localhost:3000/d/abc"),
        ("http://localhost:3000/grafana", "http://localhost:3000/grafana/d/abc"),
        ("http://localhost:3000/grafana/", "http://localhost:3000/grafana/d/abc"),
        ("http://localhost:3000//a/./b/", "http://localhost:3000/a/b/d/abc"),
    ] {
        let data = notification(external_url, serde_json::json!({"__dashboardUid__": "abc"}));
        let extended = extend_data(data, &NoImages);
        assert_eq!(extended.alerts[0].dashboard_url, expect, "external URL {external_url}");
    }
}

#[test]
fn test_silence_url_matchers() {
    let data = notification("http://localhost:3000/grafana/", serde_json::json!({}));
    let extended = extend_data(data, &NoImages);

    let silence = url::Url::parse(&extended.alerts[0].silence_url).unwrap();
    assert_eq!(silence.path(), "/grafana/alerting/silence/new");

    let pairs: Vec<(String, String)> = silence
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("alertmanager".to_string(), "grafana".to_string()),
            ("matcher".to_string(), "alertname=HighLatency".to_string()),
            ("matcher".to_string(), "service=api".to_string()),
        ]
    );
}

#[test]
fn test_malformed_values_are_empty() {
    let data = notification(
        "http://localhost:3000",
        serde_json::json!({"__values__": "{not json", "__value_string__": "[ var='B' ]"}),
    );
    let extended = extend_data(data, &NoImages);
    let alert = &extended.alerts[0];

    assert!(alert.values.is_empty());
    // The rest of the alert is still extended.
    assert_eq!(alert.value_string, "[ var='B' ]");
    assert!(!alert.silence_url.is_empty());
    assert_eq!(alert.status, Status::Firing);
}

#[test]
fn test_private_group_labels_are_removed() {
    let mut data = notification("http://localhost:3000", serde_json::json!({}));
    data.group_labels.insert("__folder__", "ops");
    data.common_annotations.insert("__orgId__", "1");

    let extended = extend_data(data, &NoImages);
    assert_eq!(extended.group_labels.names(), vec!["alertname"]);
    assert!(extended.common_annotations.is_empty());
    assert_eq!(extended.common_labels.names(), vec!["alertname", "service"]);
}
