use crate::types::EndpointId;
use std::collections::HashMap;

const DELAYED_FEATURES: &[&str] = &["explorer", "browser", "statistics"];

const LIVE_FEATURES: &[&str] = &[
    "party-management",
    "battle",
    "expedition",
    "market",
    "rewards",
    "real-time-stats",
    "leaderboard",
    "history",
    "nft-gallery",
];

/// Static feature name to endpoint mapping. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRoutingPolicy {
    routes: HashMap<String, EndpointId>,
}

impl FeatureRoutingPolicy {
    /// Builds the built-in map, then applies `overrides` on top.
    #[must_use]
    pub fn with_overrides(overrides: &HashMap<String, EndpointId>) -> Self {
        let mut policy = Self::default();
        policy.routes.extend(overrides.iter().map(|(feature, id)| (feature.clone(), *id)));
        policy
    }

    /// Endpoint for `feature`. Unknown features go to Delayed.
    #[must_use]
    pub fn route(&self, feature: &str) -> EndpointId {
        self.routes.get(feature).copied().unwrap_or(EndpointId::Delayed)
    }

    /// All mapped features, sorted by name.
    #[must_use]
    pub fn features(&self) -> Vec<(&str, EndpointId)> {
        let mut features: Vec<_> = self.routes.iter().map(|(f, id)| (f.as_str(), *id)).collect();
        features.sort_unstable_by_key(|(f, _)| *f);
        features
    }
}

impl Default for FeatureRoutingPolicy {
    fn default() -> Self {
        let routes = DELAYED_FEATURES
            .iter()
            .map(|f| ((*f).to_string(), EndpointId::Delayed))
            .chain(LIVE_FEATURES.iter().map(|f| ((*f).to_string(), EndpointId::Live)))
            .collect();
        Self { routes }
    }
}
