//! # Routes Module
//!
//! One-level routing tree assembly.
//!
//! - Exactly one route fragment becomes the root (the default route)
//! - Every other route fragment becomes a direct child of the root
//! - Child routes declared inside a fragment are discarded
//!
//! A `RouteAssembler` lives for one pass only. Build a new one every pass so
//! neither the child list nor the chosen default can leak into the next pass.

use crate::{AggregateError, Notice, RecordRef, Route};

/// Accumulates route fragments for a single pass.
#[derive(Debug, Default)]
pub struct RouteAssembler {
    default: Option<(RecordRef, Route)>,
    children: Vec<Route>,
    notices: Vec<Notice>,
}

impl RouteAssembler {
    /// Create an empty assembler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one decoded route fragment, in discovery order.
    ///
    /// The first default seen is kept; later defaults are dropped with a
    /// notice.
    pub fn push(&mut self, origin: RecordRef, mut route: Route, is_default: bool) {
        if !route.routes.is_empty() {
            self.notices.push(Notice::ChildRoutesDiscarded {
                origin: origin.clone(),
                count: route.routes.len(),
            });
            route.routes.clear();
        }

        if !is_default {
            self.children.push(route);
            return;
        }

        match &self.default {
            Some((kept, _)) => self.notices.push(Notice::DuplicateDefaultRoute {
                kept: kept.clone(),
                ignored: origin,
            }),
            None => self.default = Some((origin, route)),
        }
    }

    /// Number of non-default routes collected so far.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Whether a default route has been seen.
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Finish the pass: attach all children to the default route.
    ///
    /// Returns the tree together with the notices raised while pushing.
    pub fn finish(self) -> Result<(Route, Vec<Notice>), AggregateError> {
        let (_, mut root) = self.default.ok_or(AggregateError::NoDefaultRoute)?;
        root.routes = self.children;
        Ok((root, self.notices))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(name: &str) -> RecordRef {
        RecordRef::new("monitoring", name)
    }

    #[test]
    fn no_default_is_fatal() {
        let mut routes = RouteAssembler::new();
        routes.push(origin("a"), Route::to_receiver("a"), false);
        assert!(matches!(
            routes.finish(),
            Err(AggregateError::NoDefaultRoute)
        ));
    }

    #[test]
    fn non_defaults_become_children_in_order() {
        let mut routes = RouteAssembler::new();
        routes.push(origin("x"), Route::to_receiver("first"), false);
        routes.push(origin("root"), Route::to_receiver("ops"), true);
        routes.push(origin("y"), Route::to_receiver("second"), false);
        assert_eq!(routes.child_count(), 2);

        let (root, notices) = routes.finish().expect("finish");
        assert_eq!(root.receiver, "ops");
        let names: Vec<_> = root.routes.iter().map(|r| r.receiver.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(notices.is_empty());
    }

    #[test]
    fn first_default_wins() {
        let mut routes = RouteAssembler::new();
        routes.push(origin("one"), Route::to_receiver("one"), true);
        routes.push(origin("two"), Route::to_receiver("two"), true);

        let (root, notices) = routes.finish().expect("finish");
        assert_eq!(root.receiver, "one");
        assert!(root.routes.is_empty());
        assert_eq!(
            notices,
            vec![Notice::DuplicateDefaultRoute {
                kept: origin("one"),
                ignored: origin("two"),
            }]
        );
    }

    #[test]
    fn nested_children_are_discarded_everywhere() {
        let mut nested = Route::to_receiver("ops");
        nested.routes.push(Route::to_receiver("hidden"));

        let mut nested_child = Route::to_receiver("db");
        nested_child.routes.push(Route::to_receiver("hidden-too"));
        nested_child.routes.push(Route::to_receiver("hidden-three"));

        let mut routes = RouteAssembler::new();
        routes.push(origin("root"), nested, true);
        routes.push(origin("db"), nested_child, false);

        let (root, notices) = routes.finish().expect("finish");
        assert_eq!(root.routes.len(), 1);
        assert_eq!(root.routes[0].receiver, "db");
        assert!(root.routes[0].routes.is_empty());
        assert_eq!(
            notices,
            vec![
                Notice::ChildRoutesDiscarded {
                    origin: origin("root"),
                    count: 1
                },
                Notice::ChildRoutesDiscarded {
                    origin: origin("db"),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn has_default_tracks_first_default() {
        let mut routes = RouteAssembler::new();
        assert!(!routes.has_default());
        routes.push(origin("root"), Route::to_receiver("ops"), true);
        assert!(routes.has_default());
    }
}
