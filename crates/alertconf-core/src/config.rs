//! # Configuration Model
//!
//! The subset of the Alertmanager configuration schema that fragments can
//! contribute. Field names match `alertmanager.yml` exactly.
//!
//! Decoding is structural only: unknown keys are ignored and no value is
//! checked for meaning (a route may name a receiver that does not exist).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn is_false(b: &bool) -> bool {
    !*b
}

// =============================================================================
// TOP LEVEL
// =============================================================================

/// The aggregate configuration, the sole output artifact of one pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<GlobalConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inhibit_rules: Vec<InhibitRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub receivers: Vec<Receiver>,
    /// Always emitted, as `[]` when nothing contributed a template.
    #[serde(default)]
    pub templates: Vec<String>,
}

/// Parameters valid globally unless overridden by a receiver.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Time after which an alert is declared resolved if it has not been updated.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub resolve_timeout: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub smtp_from: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub smtp_smarthost: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub smtp_auth_username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub smtp_auth_password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub smtp_auth_secret: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub smtp_auth_identity: String,
    pub smtp_require_tls: bool,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub slack_api_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pagerduty_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hipchat_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hipchat_auth_token: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub opsgenie_api_host: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub victorops_api_url: String,
}

// =============================================================================
// ROUTING
// =============================================================================

/// A node of the routing tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Route {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub receiver: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,

    #[serde(rename = "match", skip_serializing_if = "BTreeMap::is_empty")]
    pub matchers: BTreeMap<String, String>,
    #[serde(rename = "match_re", skip_serializing_if = "BTreeMap::is_empty")]
    pub regex_matchers: BTreeMap<String, String>,
    /// Keep evaluating sibling routes after this one matches.
    #[serde(rename = "continue", skip_serializing_if = "is_false")]
    pub continue_matching: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_wait: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_interval: Option<String>,
}

impl Route {
    /// Create a route delivering to `receiver` with no matchers.
    #[must_use]
    pub fn to_receiver(receiver: impl Into<String>) -> Self {
        Self {
            receiver: receiver.into(),
            ..Self::default()
        }
    }

    /// Builder helper: add an exact label matcher.
    #[must_use]
    pub fn matching(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.matchers.insert(label.into(), value.into());
        self
    }
}

/// Mutes alerts matching the target matchers while an alert matching the
/// source matchers is firing. Both alerts must agree on the `equal` labels.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InhibitRule {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub source_match: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub source_match_re: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub target_match: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub target_match_re: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub equal: Vec<String>,
}

// =============================================================================
// RECEIVERS
// =============================================================================

/// A named notification target.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Receiver {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub email_configs: Vec<EmailConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub webhook_configs: Vec<WebhookConfig>,
}

/// Options shared by every notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Also notify when an alert resolves.
    #[serde(default)]
    pub send_resolved: bool,
}

/// Notifications via mail.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    #[serde(flatten)]
    pub notifier: NotifierConfig,

    /// Address to notify.
    pub to: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub from: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub smarthost: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auth_username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auth_password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auth_secret: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auth_identity: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_tls: Option<bool>,
}

/// Notifications via a generic webhook.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    #[serde(flatten)]
    pub notifier: NotifierConfig,

    /// URL to send the POST request to.
    pub url: String,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_uses_alertmanager_field_names() {
        let yaml = "receiver: db-team\nmatch:\n  severity: critical\nmatch_re:\n  service: ^db.*\ncontinue: true\ngroup_wait: 30s\n";
        let route: Route = serde_yaml::from_str(yaml).expect("decode");
        assert_eq!(route.receiver, "db-team");
        assert_eq!(
            route.matchers.get("severity").map(String::as_str),
            Some("critical")
        );
        assert_eq!(
            route.regex_matchers.get("service").map(String::as_str),
            Some("^db.*")
        );
        assert!(route.continue_matching);
        assert_eq!(route.group_wait.as_deref(), Some("30s"));
    }

    #[test]
    fn empty_route_fields_are_omitted() {
        let out = serde_yaml::to_string(&Route::to_receiver("ops")).expect("encode");
        assert_eq!(out.trim(), "receiver: ops");
    }

    #[test]
    fn receiver_notifiers_carry_send_resolved() {
        let yaml = r#"
name: team-x
email_configs:
  - to: team-x@example.org
    send_resolved: true
webhook_configs:
  - url: http://hooks.example.org/alert
"#;
        let r: Receiver = serde_yaml::from_str(yaml).expect("decode");
        assert_eq!(r.name, "team-x");
        assert!(r.email_configs[0].notifier.send_resolved);
        assert!(!r.webhook_configs[0].notifier.send_resolved);
        assert_eq!(r.webhook_configs[0].url, "http://hooks.example.org/alert");
    }

    #[test]
    fn inhibit_rule_equal_is_a_list() {
        let yaml = "source_match:\n  severity: critical\ntarget_match:\n  severity: warning\nequal: [alertname, cluster]\n";
        let rule: InhibitRule = serde_yaml::from_str(yaml).expect("decode");
        assert_eq!(rule.equal, vec!["alertname", "cluster"]);
    }

    #[test]
    fn templates_always_emitted() {
        let out = serde_yaml::to_string(&Config::default()).expect("encode");
        assert_eq!(out.trim(), "templates: []");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let g: GlobalConfig =
            serde_yaml::from_str("resolve_timeout: 5m\nwechat_api_url: x\n").expect("decode");
        assert_eq!(g.resolve_timeout, "5m");
    }
}
