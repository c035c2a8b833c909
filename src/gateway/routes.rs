//! Default-deny route matching
//!
//! A request path is forwardable only if it matches an explicit entry in some
//! enabled service's allow-list. A disabled service, an empty route list, and
//! an unmatched path all deny identically; there is no catch-all. Patterns
//! are method-agnostic; `:param` segments match exactly one non-empty path
//! segment.

use std::collections::BTreeMap;

use crate::config::ServiceConfig;

/// The service a path resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub service: &'a str,
    pub upstream: &'a str,
}

/// Resolve a path against the allow-lists of all enabled services.
pub fn match_route<'a>(
    services: &'a BTreeMap<String, ServiceConfig>,
    path: &str,
) -> Option<RouteMatch<'a>> {
    for (name, service) in services {
        if !service.enabled {
            continue;
        }
        if service.routes.iter().any(|p| pattern_matches(p, path)) {
            return Some(RouteMatch {
                service: name,
                upstream: &service.upstream,
            });
        }
    }
    None
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    let pattern_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_segments.len() != path_segments.len() {
        return false;
    }

    pattern_segments
        .iter()
        .zip(&path_segments)
        .all(|(pat, seg)| pat.starts_with(':') || pat == seg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services(entries: &[(&str, bool, &[&str])]) -> BTreeMap<String, ServiceConfig> {
        entries
            .iter()
            .map(|(name, enabled, routes)| {
                (
                    name.to_string(),
                    ServiceConfig {
                        enabled: *enabled,
                        upstream: format!("http://{}.internal:10000", name),
                        routes: routes.iter().map(|r| r.to_string()).collect(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_exact_route_matches() {
        let services = services(&[("api", true, &["/api/v1/health"])]);
        let matched = match_route(&services, "/api/v1/health").expect("should match");
        assert_eq!(matched.service, "api");
        assert_eq!(matched.upstream, "http://api.internal:10000");
    }

    #[test]
    fn test_param_segment_matches_one_segment() {
        let services = services(&[("api", true, &["/api/v1/transactions/:id"])]);

        assert!(match_route(&services, "/api/v1/transactions/123").is_some());
        assert!(match_route(&services, "/api/v1/transactions").is_none());
        assert!(match_route(&services, "/api/v1/transactions/123/extra").is_none());
    }

    #[test]
    fn test_unlisted_path_is_denied() {
        let services = services(&[("api", true, &["/api/v1/transactions/:id"])]);
        assert!(match_route(&services, "/api/v1/portfolios/9").is_none());
        assert!(match_route(&services, "/admin").is_none());
    }

    #[test]
    fn test_disabled_service_denies_silently() {
        let services = services(&[("api", false, &["/api/v1/transactions/:id"])]);
        assert!(match_route(&services, "/api/v1/transactions/123").is_none());
    }

    #[test]
    fn test_empty_route_list_denies() {
        let services = services(&[("api", true, &[])]);
        assert!(match_route(&services, "/api/v1/transactions/123").is_none());
    }

    #[test]
    fn test_no_services_denies() {
        let services = BTreeMap::new();
        assert!(match_route(&services, "/api/v1/transactions/123").is_none());
    }

    #[test]
    fn test_first_matching_enabled_service_wins() {
        let services = services(&[
            ("alpha", false, &["/shared/:id"]),
            ("beta", true, &["/shared/:id"]),
        ]);
        let matched = match_route(&services, "/shared/1").expect("should match");
        assert_eq!(matched.service, "beta");
    }

    #[test]
    fn test_matching_is_deterministic() {
        let services = services(&[("api", true, &["/api/v1/transactions/:id"])]);
        let first = match_route(&services, "/api/v1/transactions/42");
        let second = match_route(&services, "/api/v1/transactions/42");
        assert_eq!(first, second);
    }
}
