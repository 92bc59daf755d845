// Templates which are always registered, and may be used as partials
// (ex `{{> default_title}}`) from any template text.
//
// `alert_subject` and `alert_details` are building blocks, while
// `default_title` and `default_message` are the complete texts used by
// notifiers which haven't been given templates of their own.
pub const TEMPLATES: [(&str, &str); 4] = [
    ("alert_subject", ALERT_SUBJECT),
    ("alert_details", ALERT_DETAILS),
    ("default_title", DEFAULT_TITLE),
    ("default_message", DEFAULT_MESSAGE),
];

const ALERT_SUBJECT: &str = r#"[{{upper status}}{{#if (eq status "firing")}}:{{len (firing alerts)}}{{#if (gt (len (resolved alerts)) 0)}}, RESOLVED:{{len (resolved alerts)}}{{/if}}{{/if}}] {{join (values groupLabels) " "}} {{#if (gt (len commonLabels) (len groupLabels))}}({{join (values (remove commonLabels groupLabels)) " "}}){{/if}}"#;

// Rendered with a single alert as its context.
const ALERT_DETAILS: &str = r#"
Value: {{#if valueString}}{{valueString}}{{else}}[no value]{{/if}}
Labels:
{{#each labels}} - {{@key}} = {{this}}
{{/each}}Annotations:
{{#each annotations}} - {{@key}} = {{this}}
{{/each}}{{#if generatorURL}}Source: {{generatorURL}}
{{/if}}{{#if silenceURL}}Silence: {{silenceURL}}
{{/if}}{{#if dashboardURL}}Dashboard: {{dashboardURL}}
{{/if}}{{#if panelURL}}Panel: {{panelURL}}
{{/if}}"#;

const DEFAULT_TITLE: &str = r#"{{> alert_subject}}"#;

const DEFAULT_MESSAGE: &str = r#"{{#if (gt (len (firing alerts)) 0)}}**Firing**
{{#each (firing alerts)}}{{> alert_details}}{{/each}}{{#if (gt (len (resolved alerts)) 0)}}

{{/if}}{{/if}}{{#if (gt (len (resolved alerts)) 0)}}**Resolved**
{{#each (resolved alerts)}}{{> alert_details}}{{/each}}{{/if}}"#;
