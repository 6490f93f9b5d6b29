//! Destination storage and multi-candidate selection.

use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Destination, DestinationPolicy, Rejection};

/// Pick one destination among `candidates`.
///
/// `First` and `Last` follow the order the caller supplied; `Random` draws
/// uniformly from `rng`. Returns `None` only for an empty slice.
pub fn resolve<'a>(
    candidates: &'a [Destination],
    policy: DestinationPolicy,
    rng: &mut impl Rng,
) -> Option<&'a Destination> {
    match policy {
        DestinationPolicy::First => candidates.first(),
        DestinationPolicy::Last => candidates.last(),
        DestinationPolicy::Random => {
            if candidates.is_empty() {
                None
            } else {
                candidates.get(rng.gen_range(0..candidates.len()))
            }
        }
    }
}

/// Named destinations in insertion order.
///
/// Iteration order is the order entries were added (or loaded), and removal
/// keeps the relative order of the rest, so `First`/`Last` are stable across
/// save and load. Names are unique ignoring ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Destination>", into = "Vec<Destination>")]
pub struct DestinationStore {
    entries: IndexMap<String, Destination>,
}

impl DestinationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, destination: Destination) -> Result<(), Rejection> {
        let key = destination.name.to_ascii_lowercase();
        if self.entries.contains_key(&key) {
            return Err(Rejection::DuplicateDestination(destination.name));
        }
        self.entries.insert(key, destination);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<Destination, Rejection> {
        self.entries
            .shift_remove(&name.to_ascii_lowercase())
            .ok_or_else(|| Rejection::UnknownDestination(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&Destination> {
        self.entries.get(&name.to_ascii_lowercase())
    }

    /// Every destination whose owner matches `owner`, in insertion order.
    pub fn candidates_for(&self, owner: &str) -> Vec<Destination> {
        self.entries
            .values()
            .filter(|d| d.owner.eq_ignore_ascii_case(owner))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Destination> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Vec<Destination>> for DestinationStore {
    type Error = Rejection;

    fn try_from(destinations: Vec<Destination>) -> Result<Self, Self::Error> {
        let mut store = DestinationStore::new();
        for destination in destinations {
            store.insert(destination)?;
        }
        Ok(store)
    }
}

impl From<DestinationStore> for Vec<Destination> {
    fn from(store: DestinationStore) -> Self {
        store.entries.into_values().collect()
    }
}
