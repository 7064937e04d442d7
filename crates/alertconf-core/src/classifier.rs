//! # Classifier Module
//!
//! Kind dispatch for fragment records.
//!
//! - Read the declared kind from the `alertmanager-type` annotation
//! - Decode the `spec` payload into that kind's typed shape
//! - Unknown kinds are skipped, never rejected, so newer fragment kinds can be
//!   deployed before the controller understands them

use crate::primitives::{DEFAULT_ROUTE_ANNOTATION_KEY, DEFAULT_ROUTE_MARKER, TYPE_ANNOTATION_KEY};
use crate::{AggregateError, ConfigMap, GlobalConfig, InhibitRule, Receiver, Route};
use serde::de::DeserializeOwned;
use std::str::FromStr;

/// The fragment kinds the controller understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Global,
    InhibitRule,
    Receiver,
    Template,
    Route,
}

impl FragmentKind {
    /// The annotation value naming this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::InhibitRule => "inhibitrule",
            Self::Receiver => "receiver",
            Self::Template => "template",
            Self::Route => "route",
        }
    }
}

impl FromStr for FragmentKind {
    type Err = ();

    /// Case-insensitive parse of an annotation value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "inhibitrule" => Ok(Self::InhibitRule),
            "receiver" => Ok(Self::Receiver),
            "template" => Ok(Self::Template),
            "route" => Ok(Self::Route),
            _ => Err(()),
        }
    }
}

/// A decoded fragment, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Global(GlobalConfig),
    InhibitRule(InhibitRule),
    Receiver(Receiver),
    Template(String),
    Route { route: Route, is_default: bool },
}

impl Fragment {
    /// The kind this fragment was decoded as.
    #[must_use]
    pub fn kind(&self) -> FragmentKind {
        match self {
            Self::Global(_) => FragmentKind::Global,
            Self::InhibitRule(_) => FragmentKind::InhibitRule,
            Self::Receiver(_) => FragmentKind::Receiver,
            Self::Template(_) => FragmentKind::Template,
            Self::Route { .. } => FragmentKind::Route,
        }
    }
}

/// Result of classifying one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// A recognized kind with a decoded payload.
    Fragment(Fragment),
    /// No kind annotation, or a kind this controller does not know.
    Unrecognized,
    /// A recognized kind without a `spec` payload.
    MissingSpec(FragmentKind),
}

/// Stateless record classifier.
pub struct Classifier;

impl Classifier {
    /// Read the declared kind of a record, if it is one we understand.
    #[must_use]
    pub fn kind_of(record: &ConfigMap) -> Option<FragmentKind> {
        record
            .annotation(TYPE_ANNOTATION_KEY)
            .and_then(|s| s.parse().ok())
    }

    /// Whether a record carries the default-route marker.
    #[must_use]
    pub fn is_default_route(record: &ConfigMap) -> bool {
        record.annotation(DEFAULT_ROUTE_ANNOTATION_KEY) == Some(DEFAULT_ROUTE_MARKER)
    }

    /// Classify a record and decode its payload.
    ///
    /// Returns `AggregateError::Decode` naming the record if the payload is
    /// present but does not fit the declared kind.
    pub fn classify(record: &ConfigMap) -> Result<Classified, AggregateError> {
        let Some(kind) = Self::kind_of(record) else {
            return Ok(Classified::Unrecognized);
        };
        let Some(spec) = record.spec() else {
            return Ok(Classified::MissingSpec(kind));
        };

        let fragment = match kind {
            FragmentKind::Global => Fragment::Global(decode(record, spec)?),
            FragmentKind::InhibitRule => Fragment::InhibitRule(decode(record, spec)?),
            FragmentKind::Receiver => Fragment::Receiver(decode(record, spec)?),
            FragmentKind::Template => Fragment::Template(decode(record, spec)?),
            FragmentKind::Route => Fragment::Route {
                route: decode(record, spec)?,
                is_default: Self::is_default_route(record),
            },
        };
        Ok(Classified::Fragment(fragment))
    }
}

fn decode<T: DeserializeOwned>(record: &ConfigMap, spec: &str) -> Result<T, AggregateError> {
    serde_yaml::from_str(spec).map_err(|e| AggregateError::Decode {
        record: record.record_ref(),
        reason: e.to_string(),
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::primitives::SPEC_DATA_KEY;

    fn fragment(kind: &str, spec: &str) -> ConfigMap {
        ConfigMap::new("monitoring", "frag")
            .with_annotation(TYPE_ANNOTATION_KEY, kind)
            .with_data(SPEC_DATA_KEY, spec)
    }

    #[test]
    fn kind_is_case_insensitive() {
        assert_eq!("Route".parse::<FragmentKind>(), Ok(FragmentKind::Route));
        assert_eq!("INHIBITRULE".parse::<FragmentKind>(), Ok(FragmentKind::InhibitRule));
        assert_eq!("silence".parse::<FragmentKind>(), Err(()));
    }

    #[test]
    fn kind_names_parse_back() {
        for kind in [
            FragmentKind::Global,
            FragmentKind::InhibitRule,
            FragmentKind::Receiver,
            FragmentKind::Template,
            FragmentKind::Route,
        ] {
            assert_eq!(kind.as_str().parse::<FragmentKind>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_kind_is_skipped() {
        let cm = fragment("silence", "this: [is not valid");
        assert_eq!(
            Classifier::classify(&cm).expect("classify"),
            Classified::Unrecognized
        );
    }

    #[test]
    fn missing_annotation_is_skipped() {
        let cm = ConfigMap::new("a", "b").with_data(SPEC_DATA_KEY, "receiver: x");
        assert_eq!(
            Classifier::classify(&cm).expect("classify"),
            Classified::Unrecognized
        );
    }

    #[test]
    fn missing_spec_is_reported_not_failed() {
        let cm = ConfigMap::new("a", "b").with_annotation(TYPE_ANNOTATION_KEY, "receiver");
        assert_eq!(
            Classifier::classify(&cm).expect("classify"),
            Classified::MissingSpec(FragmentKind::Receiver)
        );
    }

    #[test]
    fn malformed_payload_names_the_record() {
        let cm = fragment("receiver", "name: [unterminated");
        let err = Classifier::classify(&cm).expect_err("must fail");
        match err {
            AggregateError::Decode { record, .. } => {
                assert_eq!(record.to_string(), "monitoring/frag");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_shape_is_a_decode_error() {
        let cm = fragment("route", "- just\n- a list\n");
        assert!(matches!(
            Classifier::classify(&cm),
            Err(AggregateError::Decode { .. })
        ));
    }

    #[test]
    fn route_reads_default_annotation() {
        let cm = fragment("route", "receiver: ops")
            .with_annotation(DEFAULT_ROUTE_ANNOTATION_KEY, "true");
        let Classified::Fragment(Fragment::Route { route, is_default }) =
            Classifier::classify(&cm).expect("classify")
        else {
            panic!("expected a route");
        };
        assert!(is_default);
        assert_eq!(route.receiver, "ops");
    }

    #[test]
    fn default_marker_must_be_literal_true() {
        let cm = fragment("route", "receiver: ops")
            .with_annotation(DEFAULT_ROUTE_ANNOTATION_KEY, "yes");
        assert!(!Classifier::is_default_route(&cm));
    }

    #[test]
    fn template_decodes_to_string() {
        let cm = fragment("template", "/etc/templates/a.tmpl");
        assert_eq!(
            Classifier::classify(&cm).expect("classify"),
            Classified::Fragment(Fragment::Template("/etc/templates/a.tmpl".to_string()))
        );
    }

    #[test]
    fn fragment_reports_its_kind() {
        let f = Fragment::Receiver(Receiver::default());
        assert_eq!(f.kind(), FragmentKind::Receiver);
    }
}
