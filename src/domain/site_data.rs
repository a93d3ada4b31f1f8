// Loader output contract: typed collections the model is built from

use std::collections::BTreeMap;

use super::value_objects::StoreCategory;

/// A physical store site with its market side fixed at load time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocation {
    pub id: String,
    pub category: StoreCategory,
}

impl StoreLocation {
    pub fn new(id: impl Into<String>, category: StoreCategory) -> Self {
        Self {
            id: id.into(),
            category,
        }
    }

    pub fn existing(id: impl Into<String>) -> Self {
        Self::new(id, StoreCategory::Existing)
    }

    pub fn competitor(id: impl Into<String>) -> Self {
        Self::new(id, StoreCategory::Competitor)
    }

    pub fn potential(id: impl Into<String>) -> Self {
        Self::new(id, StoreCategory::Potential)
    }
}

/// Sets and sparse parameter tables as delivered by a loader.
///
/// Tables only hold the entries the source listed; defaults for missing keys
/// are applied by [`SiteModel`](super::site_model::SiteModel).
#[derive(Debug, Clone, Default)]
pub struct SiteData {
    /// I: locations that generate demand
    pub demand_locations: Vec<String>,
    /// J: candidate sites for new stores
    pub candidate_sites: Vec<String>,
    /// M: every store site, tagged existing / competitor / potential
    pub stores: Vec<StoreLocation>,
    /// S: customer segments
    pub segments: Vec<String>,
    /// h[i, s]
    pub demand: BTreeMap<(String, String), f64>,
    /// d[i, m]
    pub distance: BTreeMap<(String, String), f64>,
    /// v0[i]
    pub no_choice_utility: BTreeMap<String, f64>,
}

impl SiteData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_demand_location(mut self, id: impl Into<String>) -> Self {
        self.demand_locations.push(id.into());
        self
    }

    pub fn with_segment(mut self, id: impl Into<String>) -> Self {
        self.segments.push(id.into());
        self
    }

    /// Add a candidate site to J and the matching potential store to M
    pub fn with_candidate(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.candidate_sites.push(id.clone());
        self.stores.push(StoreLocation::potential(id));
        self
    }

    pub fn with_store(mut self, store: StoreLocation) -> Self {
        self.stores.push(store);
        self
    }

    pub fn with_demand(
        mut self,
        location: impl Into<String>,
        segment: impl Into<String>,
        value: f64,
    ) -> Self {
        self.demand.insert((location.into(), segment.into()), value);
        self
    }

    pub fn with_distance(
        mut self,
        location: impl Into<String>,
        store: impl Into<String>,
        value: f64,
    ) -> Self {
        self.distance.insert((location.into(), store.into()), value);
        self
    }

    pub fn with_no_choice_utility(mut self, location: impl Into<String>, value: f64) -> Self {
        self.no_choice_utility.insert(location.into(), value);
        self
    }
}
