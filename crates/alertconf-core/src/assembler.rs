//! # Assembler Module
//!
//! Folds classified fragments into one `Config` and renders it.
//!
//! - Global settings: last fragment wins, no field-level merge
//! - Inhibit rules, receivers, templates: appended in merge order
//! - Routes: delegated to a per-pass `RouteAssembler`
//! - No cross-reference checks (a route may name a missing receiver)
//!
//! Records are merged in `(namespace, name)` order so the rendered document
//! does not depend on the order the store listed them in.

use crate::classifier::{Classified, Classifier, Fragment};
use crate::primitives::CONFIG_FILE_KEY;
use crate::routes::RouteAssembler;
use crate::{AggregateError, Config, ConfigMap, Notice, RecordRef};

/// Output of one assembly: the configuration plus everything worth reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub config: Config,
    pub notices: Vec<Notice>,
    /// Number of records that contributed a fragment.
    pub fragments: usize,
}

impl Assembly {
    /// Render the configuration into a fresh record for `target`.
    pub fn to_record(&self, target: &RecordRef) -> Result<ConfigMap, AggregateError> {
        let document = render(&self.config)?;
        Ok(target_record(target, document))
    }
}

/// Accumulates one pass worth of fragments.
#[derive(Debug, Default)]
pub struct ConfigAssembler {
    config: Config,
    routes: RouteAssembler,
    notices: Vec<Notice>,
    fragments: usize,
}

impl ConfigAssembler {
    /// Create an empty assembler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a whole listing in one call.
    ///
    /// Sorts by identity, drops repeated identities and the `exclude`d record
    /// (the published document itself), then classifies and folds each
    /// record. Fails fast on the first decode error.
    pub fn assemble<'a, I>(
        records: I,
        exclude: Option<&RecordRef>,
    ) -> Result<Assembly, AggregateError>
    where
        I: IntoIterator<Item = &'a ConfigMap>,
    {
        let mut sorted: Vec<(RecordRef, &ConfigMap)> = records
            .into_iter()
            .map(|r| (r.record_ref(), r))
            .filter(|(id, _)| Some(id) != exclude)
            .collect();
        // stable: the first listing of a repeated identity is the one kept
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let mut assembler = Self::new();
        let mut previous: Option<&RecordRef> = None;
        for (id, record) in &sorted {
            if previous == Some(id) {
                assembler.notices.push(Notice::DuplicateRecord(id.clone()));
                continue;
            }
            previous = Some(id);
            assembler.add(record)?;
        }
        assembler.finish()
    }

    /// Classify one record and fold it in.
    pub fn add(&mut self, record: &ConfigMap) -> Result<(), AggregateError> {
        match Classifier::classify(record)? {
            Classified::Fragment(fragment) => self.fold(record.record_ref(), fragment),
            Classified::MissingSpec(_) => {
                self.notices.push(Notice::MissingSpec(record.record_ref()));
            }
            Classified::Unrecognized => {}
        }
        Ok(())
    }

    /// Fold an already decoded fragment.
    pub fn fold(&mut self, origin: RecordRef, fragment: Fragment) {
        self.fragments += 1;
        match fragment {
            Fragment::Global(global) => self.config.global = Some(global),
            Fragment::InhibitRule(rule) => self.config.inhibit_rules.push(rule),
            Fragment::Receiver(receiver) => self.config.receivers.push(receiver),
            Fragment::Template(path) => {
                if !path.is_empty() {
                    self.config.templates.push(path);
                }
            }
            Fragment::Route { route, is_default } => self.routes.push(origin, route, is_default),
        }
    }

    /// Close the pass: build the routing tree and hand back the result.
    ///
    /// Returns `AggregateError::NoDefaultRoute` if no default route was folded.
    pub fn finish(self) -> Result<Assembly, AggregateError> {
        let Self {
            mut config,
            routes,
            mut notices,
            fragments,
        } = self;
        let (root, route_notices) = routes.finish()?;
        config.route = Some(root);
        notices.extend(route_notices);
        Ok(Assembly {
            config,
            notices,
            fragments,
        })
    }
}

/// Render a configuration as `alertmanager.yml` text.
pub fn render(config: &Config) -> Result<String, AggregateError> {
    serde_yaml::to_string(config).map_err(|e| AggregateError::Serialization(e.to_string()))
}

/// Build the record that publishes `document` at `target`.
#[must_use]
pub fn target_record(target: &RecordRef, document: String) -> ConfigMap {
    ConfigMap::new(&target.namespace, &target.name).with_data(CONFIG_FILE_KEY, document)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{DEFAULT_ROUTE_ANNOTATION_KEY, SPEC_DATA_KEY, TYPE_ANNOTATION_KEY};

    fn fragment(ns: &str, name: &str, kind: &str, spec: &str) -> ConfigMap {
        ConfigMap::new(ns, name)
            .with_annotation(TYPE_ANNOTATION_KEY, kind)
            .with_data(SPEC_DATA_KEY, spec)
    }

    fn default_route(ns: &str, name: &str, receiver: &str) -> ConfigMap {
        fragment(ns, name, "route", &format!("receiver: {receiver}"))
            .with_annotation(DEFAULT_ROUTE_ANNOTATION_KEY, "true")
    }

    #[test]
    fn global_last_one_wins_without_merge() {
        let records = vec![
            default_route("m", "root", "ops"),
            fragment("m", "g1", "global", "resolve_timeout: 5m\nsmtp_from: a@x"),
            fragment("m", "g2", "global", "resolve_timeout: 1m"),
        ];
        let assembly = ConfigAssembler::assemble(&records, None).expect("assemble");
        let global = assembly.config.global.expect("global");
        assert_eq!(global.resolve_timeout, "1m");
        assert_eq!(global.smtp_from, "");
    }

    #[test]
    fn lists_append_in_identity_order() {
        let records = vec![
            fragment("b", "r", "receiver", "name: second"),
            default_route("m", "root", "ops"),
            fragment("a", "r", "receiver", "name: first"),
            fragment("a", "r2", "receiver", "name: first"),
        ];
        let assembly = ConfigAssembler::assemble(&records, None).expect("assemble");
        let names: Vec<_> = assembly
            .config
            .receivers
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        // duplicates by name are kept; uniqueness is the consumer's problem
        assert_eq!(names, vec!["first", "first", "second"]);
        assert_eq!(assembly.fragments, 4);
    }

    #[test]
    fn excluded_target_is_not_read() {
        let target = RecordRef::new("m", "alertmanager");
        let records = vec![
            default_route("m", "root", "ops"),
            fragment("m", "alertmanager", "receiver", "name: [broken"),
        ];
        assert!(ConfigAssembler::assemble(&records, Some(&target)).is_ok());
    }

    #[test]
    fn repeated_identity_is_used_once() {
        let records = vec![
            default_route("m", "root", "ops"),
            fragment("m", "r", "receiver", "name: team"),
            fragment("m", "r", "receiver", "name: team"),
        ];
        let assembly = ConfigAssembler::assemble(&records, None).expect("assemble");
        assert_eq!(assembly.config.receivers.len(), 1);
        assert_eq!(
            assembly.notices,
            vec![Notice::DuplicateRecord(RecordRef::new("m", "r"))]
        );
    }

    #[test]
    fn decode_failure_aborts_the_pass() {
        let records = vec![
            default_route("m", "root", "ops"),
            fragment("m", "bad", "inhibitrule", "equal: {not: a list}"),
        ];
        assert!(matches!(
            ConfigAssembler::assemble(&records, None),
            Err(AggregateError::Decode { .. })
        ));
    }

    #[test]
    fn missing_spec_is_noted() {
        let records = vec![
            default_route("m", "root", "ops"),
            ConfigMap::new("m", "empty").with_annotation(TYPE_ANNOTATION_KEY, "receiver"),
        ];
        let assembly = ConfigAssembler::assemble(&records, None).expect("assemble");
        assert_eq!(
            assembly.notices,
            vec![Notice::MissingSpec(RecordRef::new("m", "empty"))]
        );
        assert_eq!(assembly.fragments, 1);
    }

    #[test]
    fn no_default_route_is_fatal() {
        let records = vec![fragment("m", "r", "receiver", "name: team")];
        assert!(matches!(
            ConfigAssembler::assemble(&records, None),
            Err(AggregateError::NoDefaultRoute)
        ));
    }

    #[test]
    fn record_holds_rendered_document() {
        let records = vec![default_route("m", "root", "ops")];
        let assembly = ConfigAssembler::assemble(&records, None).expect("assemble");
        let target = RecordRef::new("monitoring", "alertmanager");
        let record = assembly.to_record(&target).expect("render");

        assert_eq!(record.record_ref(), target);
        let document = record.data.get(CONFIG_FILE_KEY).expect("document");
        assert!(document.contains("receiver: ops"));
        assert!(document.contains("templates: []"));
    }

    #[test]
    fn render_is_deterministic() {
        let records = vec![
            default_route("m", "root", "ops"),
            fragment("m", "i", "inhibitrule", "source_match:\n  z: '1'\n  a: '2'\n"),
        ];
        let first = ConfigAssembler::assemble(&records, None).expect("assemble");
        let reversed: Vec<_> = records.iter().rev().cloned().collect();
        let second = ConfigAssembler::assemble(&reversed, None).expect("assemble");
        assert_eq!(
            render(&first.config).expect("render"),
            render(&second.config).expect("render")
        );
    }
}
