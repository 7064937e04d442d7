//! # Primitives
//!
//! Fixed keys of the ConfigMap contract between fragment authors and the
//! controller.
//!
//! These values are part of the external interface: changing any of them
//! breaks every fragment already deployed in a cluster.

/// Annotation declaring which kind of fragment a ConfigMap carries.
///
/// Values are matched case-insensitively against the names in
/// [`crate::FragmentKind`]. Records without it are ignored.
pub const TYPE_ANNOTATION_KEY: &str = "alertmanager-type";

/// Annotation marking a route fragment as the root of the routing tree.
///
/// Only the literal value [`DEFAULT_ROUTE_MARKER`] counts.
pub const DEFAULT_ROUTE_ANNOTATION_KEY: &str = "alertmanager-default-route";

/// The value of [`DEFAULT_ROUTE_ANNOTATION_KEY`] that marks a default route.
pub const DEFAULT_ROUTE_MARKER: &str = "true";

/// Data key holding a fragment's YAML payload.
pub const SPEC_DATA_KEY: &str = "spec";

/// Data key holding the rendered document in the published ConfigMap.
pub const CONFIG_FILE_KEY: &str = "alertmanager.yml";

/// API version written on records created by the controller.
pub const CONFIGMAP_API_VERSION: &str = "v1";

/// Kind written on records created by the controller.
pub const CONFIGMAP_KIND: &str = "ConfigMap";
