// Model builder: validates loaded site data and freezes it into an immutable model

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use super::error::DataIntegrityError;
use super::models::Variable;
use super::site_data::{SiteData, StoreLocation};
use super::value_objects::StoreCategory;

/// Distance used for (location, store) pairs the data does not list.
/// Large enough that the pair contributes nothing meaningful to any utility.
pub const UNREACHABLE_DISTANCE: f64 = 1e6;

/// Number of new stores the planner may open when nothing else is configured
pub const DEFAULT_BUDGET: usize = 5;

/// Validated sets, parameters and decision variables of one site selection run.
///
/// Every lookup is total: unlisted demand is 0, unlisted distances are
/// [`UNREACHABLE_DISTANCE`] and an unlisted no-choice utility is 0.
#[derive(Debug, Clone)]
pub struct SiteModel {
    demand_locations: Vec<String>,
    segments: Vec<String>,
    stores: Vec<StoreLocation>,
    candidates: Vec<String>,

    location_index: HashMap<String, usize>,
    segment_index: HashMap<String, usize>,
    store_index: HashMap<String, usize>,

    existing_stores: Vec<usize>,
    competitor_stores: Vec<usize>,
    candidate_stores: Vec<usize>,

    // Dense tables, row-major by demand location
    demand: Vec<f64>,
    distance: Vec<f64>,
    no_choice: Vec<f64>,

    budget: usize,
    variables: Vec<Variable>,
}

impl SiteModel {
    /// Build the model, rejecting inputs that break any data invariant
    pub fn build(data: SiteData, budget: usize) -> Result<Self, DataIntegrityError> {
        let SiteData {
            demand_locations,
            candidate_sites,
            stores,
            segments,
            demand: demand_table,
            distance: distance_table,
            no_choice_utility,
        } = data;

        let location_index = index_unique("I", &demand_locations)?;
        let segment_index = index_unique("S", &segments)?;
        index_unique("J", &candidate_sites)?;
        let store_ids: Vec<String> = stores.iter().map(|s| s.id.clone()).collect();
        let store_index = index_unique("M", &store_ids)?;

        check_candidates_match(&candidate_sites, &stores)?;

        let mut existing_stores = Vec::new();
        let mut competitor_stores = Vec::new();
        for (idx, store) in stores.iter().enumerate() {
            match store.category {
                StoreCategory::Existing => existing_stores.push(idx),
                StoreCategory::Competitor => competitor_stores.push(idx),
                StoreCategory::Potential => {}
            }
        }
        // P follows the order of J so decision variables line up with candidates
        let candidate_stores = candidate_sites
            .iter()
            .map(|j| lookup(&store_index, "J", "M", j))
            .collect::<Result<Vec<_>, _>>()?;

        let n_locations = demand_locations.len();
        let n_segments = segments.len();
        let n_stores = stores.len();

        let mut demand = vec![0.0; n_locations * n_segments];
        for ((location, segment), value) in demand_table {
            let i = lookup(&location_index, "h", "I", &location)?;
            let s = lookup(&segment_index, "h", "S", &segment)?;
            if !value.is_finite() || value < 0.0 {
                return Err(DataIntegrityError::InvalidDemand {
                    location,
                    segment,
                    value,
                });
            }
            demand[i * n_segments + s] = value;
        }

        let mut distance = vec![UNREACHABLE_DISTANCE; n_locations * n_stores];
        for ((location, store), value) in distance_table {
            let i = lookup(&location_index, "d", "I", &location)?;
            let m = lookup(&store_index, "d", "M", &store)?;
            if !value.is_finite() || value <= 0.0 {
                return Err(DataIntegrityError::NonPositiveDistance {
                    location,
                    store,
                    value,
                });
            }
            distance[i * n_stores + m] = value;
        }

        let mut no_choice = vec![0.0; n_locations];
        for (location, value) in no_choice_utility {
            let i = lookup(&location_index, "v0", "I", &location)?;
            if !value.is_finite() {
                return Err(DataIntegrityError::InvalidNoChoiceUtility { location, value });
            }
            no_choice[i] = value;
        }

        let variables = candidate_sites
            .iter()
            .map(|j| Variable::binary(format!("x[{}]", j)))
            .collect();

        debug!(
            locations = n_locations,
            segments = n_segments,
            existing = existing_stores.len(),
            competitors = competitor_stores.len(),
            candidates = candidate_sites.len(),
            budget,
            "site model built"
        );

        Ok(Self {
            demand_locations,
            segments,
            stores,
            candidates: candidate_sites,
            location_index,
            segment_index,
            store_index,
            existing_stores,
            competitor_stores,
            candidate_stores,
            demand,
            distance,
            no_choice,
            budget,
            variables,
        })
    }

    pub fn demand_locations(&self) -> &[String] {
        &self.demand_locations
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn stores(&self) -> &[StoreLocation] {
        &self.stores
    }

    /// P, in the order the candidate sites were loaded
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// E
    pub fn existing_stores(&self) -> impl Iterator<Item = &str> {
        self.existing_stores.iter().map(|&m| self.stores[m].id.as_str())
    }

    /// C
    pub fn competitor_stores(&self) -> impl Iterator<Item = &str> {
        self.competitor_stores
            .iter()
            .map(|&m| self.stores[m].id.as_str())
    }

    /// h[i, s]
    pub fn demand(&self, location: &str, segment: &str) -> f64 {
        match (
            self.location_index.get(location),
            self.segment_index.get(segment),
        ) {
            (Some(&i), Some(&s)) => self.demand[i * self.segments.len() + s],
            _ => 0.0,
        }
    }

    /// d[i, m]
    pub fn distance(&self, location: &str, store: &str) -> f64 {
        match (self.location_index.get(location), self.store_index.get(store)) {
            (Some(&i), Some(&m)) => self.distance_at(i, m),
            _ => UNREACHABLE_DISTANCE,
        }
    }

    /// v0[i]
    pub fn no_choice_utility(&self, location: &str) -> f64 {
        self.location_index
            .get(location)
            .map(|&i| self.no_choice[i])
            .unwrap_or(0.0)
    }

    /// P_max
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// One binary open decision per candidate, same order as [`candidates`](Self::candidates)
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub(crate) fn total_demand_at(&self, location: usize) -> f64 {
        let n_segments = self.segments.len();
        self.demand[location * n_segments..(location + 1) * n_segments]
            .iter()
            .sum()
    }

    pub(crate) fn no_choice_at(&self, location: usize) -> f64 {
        self.no_choice[location]
    }

    /// u(i, m) = 1 / d[i, m]; distances are validated positive
    pub(crate) fn utility_at(&self, location: usize, store: usize) -> f64 {
        1.0 / self.distance_at(location, store)
    }

    pub(crate) fn existing_store_indices(&self) -> &[usize] {
        &self.existing_stores
    }

    pub(crate) fn competitor_store_indices(&self) -> &[usize] {
        &self.competitor_stores
    }

    pub(crate) fn candidate_store_indices(&self) -> &[usize] {
        &self.candidate_stores
    }

    fn distance_at(&self, location: usize, store: usize) -> f64 {
        self.distance[location * self.stores.len() + store]
    }
}

fn index_unique(
    set: &'static str,
    ids: &[String],
) -> Result<HashMap<String, usize>, DataIntegrityError> {
    let mut index = HashMap::with_capacity(ids.len());
    for (position, id) in ids.iter().enumerate() {
        if index.insert(id.clone(), position).is_some() {
            return Err(DataIntegrityError::DuplicateIdentifier {
                set,
                identifier: id.clone(),
            });
        }
    }
    Ok(index)
}

fn lookup(
    index: &HashMap<String, usize>,
    table: &'static str,
    set: &'static str,
    id: &str,
) -> Result<usize, DataIntegrityError> {
    index
        .get(id)
        .copied()
        .ok_or_else(|| DataIntegrityError::UnknownIdentifier {
            table,
            set,
            identifier: id.to_string(),
        })
}

fn check_candidates_match(
    candidates: &[String],
    stores: &[StoreLocation],
) -> Result<(), DataIntegrityError> {
    let candidate_set: HashSet<&str> = candidates.iter().map(String::as_str).collect();
    let potential_set: HashSet<&str> = stores
        .iter()
        .filter(|s| s.category == StoreCategory::Potential)
        .map(|s| s.id.as_str())
        .collect();

    if candidate_set == potential_set {
        return Ok(());
    }

    let only_in_candidates: BTreeSet<String> = candidate_set
        .difference(&potential_set)
        .map(|s| s.to_string())
        .collect();
    let only_in_potential: BTreeSet<String> = potential_set
        .difference(&candidate_set)
        .map(|s| s.to_string())
        .collect();

    Err(DataIntegrityError::CandidateMismatch {
        only_in_candidates: only_in_candidates.into_iter().collect(),
        only_in_potential: only_in_potential.into_iter().collect(),
    })
}
