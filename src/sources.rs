// src/sources.rs
use std::path::PathBuf;

const TRAINING_MANUAL_API: &str = "https://helldiverstrainingmanual.com/api/v1/war/status";
const HELLHUB_API_BASE: &str = "https://api-hellhub-collective.koyeb.app/api";

/// Client identification the community APIs ask integrators to send.
const CLIENT_HEADERS: [(&str, &str); 2] = [
    ("X-Super-Client", "war-status-poller"),
    ("X-Super-Contact", "lumlich@lumlich.com"),
];

pub const DEFAULT_OUTPUT_PATH: &str = "war_status.json";

/// Which element to keep when a source runs in latest-only mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatestPolicy {
    First,
    Last,
}

/// One upstream endpoint. Static configuration, never mutated at runtime.
#[derive(Debug, Clone)]
pub struct Source {
    pub key: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// When set, a list-shaped 200 response is reduced to a single element.
    pub latest: Option<LatestPolicy>,
}

impl Source {
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
            headers: Vec::new(),
            latest: None,
        }
    }

    pub fn with_client_headers(mut self) -> Self {
        self.headers = CLIENT_HEADERS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    pub fn latest_only(mut self, policy: LatestPolicy) -> Self {
        self.latest = Some(policy);
        self
    }
}

/// A named group of sources. Declaration order is the fetch order.
#[derive(Debug, Clone)]
pub struct SourceGroup {
    pub name: String,
    pub sources: Vec<Source>,
}

impl SourceGroup {
    pub fn new(name: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            name: name.into(),
            sources,
        }
    }
}

/// The full run configuration: every group to poll plus the output path.
/// Production uses [`Config::default`]; tests build their own against mock
/// servers.
#[derive(Debug, Clone)]
pub struct Config {
    pub groups: Vec<SourceGroup>,
    pub output_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let hellhub = |key: &str| {
            Source::new(key, format!("{HELLHUB_API_BASE}/{key}")).with_client_headers()
        };

        Self {
            groups: vec![
                SourceGroup::new(
                    "TrainingManual",
                    vec![Source::new("status", TRAINING_MANUAL_API)],
                ),
                SourceGroup::new(
                    "HellHub",
                    vec![
                        hellhub("planets"),
                        hellhub("war"),
                        hellhub("contributions"),
                        hellhub("factions"),
                        hellhub("events"),
                    ],
                ),
                SourceGroup::new(
                    "OrdersAssignmentsReports",
                    vec![
                        hellhub("orders"),
                        hellhub("assignments"),
                        // The reports feed is long; keep only the newest entry.
                        hellhub("reports").latest_only(LatestPolicy::Last),
                    ],
                ),
            ],
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_covers_all_groups_in_order() {
        let cfg = Config::default();
        let names: Vec<&str> = cfg.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["TrainingManual", "HellHub", "OrdersAssignmentsReports"]
        );
        assert_eq!(cfg.output_path, PathBuf::from("war_status.json"));
    }

    #[test]
    fn hellhub_sources_carry_client_headers() {
        let cfg = Config::default();
        let hellhub = &cfg.groups[1];
        for s in &hellhub.sources {
            assert!(
                s.headers.iter().any(|(k, _)| k == "X-Super-Client"),
                "{} should identify the client",
                s.key
            );
        }
        // The public training-manual endpoint takes none.
        assert!(cfg.groups[0].sources[0].headers.is_empty());
    }

    #[test]
    fn only_reports_runs_latest_only() {
        let cfg = Config::default();
        let latest: Vec<&str> = cfg
            .groups
            .iter()
            .flat_map(|g| &g.sources)
            .filter(|s| s.latest.is_some())
            .map(|s| s.key.as_str())
            .collect();
        assert_eq!(latest, vec!["reports"]);
        assert_eq!(
            cfg.groups[2].sources[2].latest,
            Some(LatestPolicy::Last)
        );
    }
}
