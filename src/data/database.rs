use std::collections::HashMap;

use super::filter::{Filters, Query};
use super::model::{
    ApproachId, ApproachRecord, CloseApproach, DataError, NearEarthObject, NeoId, NeoRecord,
};

// ---------------------------------------------------------------------------
// NeoDatabase – linked, read-only view of objects and their approaches
// ---------------------------------------------------------------------------

/// Objects and close approaches linked in both directions.
///
/// Built once from raw rows and never mutated afterwards, so a shared
/// reference can be queried from any number of threads at the same time.
/// Approaches are held in one chronological sequence; every object's
/// `approaches` list points into it and is therefore sorted as well.
#[derive(Debug, Clone, Default)]
pub struct NeoDatabase {
    neos: Vec<NearEarthObject>,
    /// Stable-sorted by time.
    approaches: Vec<CloseApproach>,
    /// Lowercased designation → object.
    by_designation: HashMap<String, NeoId>,
    /// Lowercased name → object. Only named objects appear here.
    by_name: HashMap<String, NeoId>,
}

impl NeoDatabase {
    /// Coerce and link raw rows. The first malformed row aborts the build.
    pub fn from_records(
        neo_rows: &[NeoRecord],
        approach_rows: &[ApproachRecord],
    ) -> Result<Self, DataError> {
        let neos = neo_rows
            .iter()
            .enumerate()
            .map(|(row, rec)| NearEarthObject::from_record(rec, row))
            .collect::<Result<Vec<_>, _>>()?;
        let approaches = approach_rows
            .iter()
            .enumerate()
            .map(|(row, rec)| CloseApproach::from_record(rec, row))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(neos, approaches)
    }

    /// Link already-typed entities. Any pre-existing links on the inputs are discarded.
    pub fn new(
        neos: Vec<NearEarthObject>,
        mut approaches: Vec<CloseApproach>,
    ) -> Result<Self, DataError> {
        let mut db = NeoDatabase {
            neos: Vec::with_capacity(neos.len()),
            approaches: Vec::new(),
            by_designation: HashMap::with_capacity(neos.len()),
            by_name: HashMap::new(),
        };

        for (row, mut neo) in neos.into_iter().enumerate() {
            if neo.designation.trim().is_empty() {
                return Err(DataError::MissingDesignation { row });
            }
            if db.by_designation.contains_key(&designation_key(&neo.designation)) {
                return Err(DataError::DuplicateDesignation(neo.designation));
            }
            neo.approaches.clear();
            db.insert(neo);
        }

        // Stable: equal times keep ingestion order, both globally and per object.
        approaches.sort_by_key(|a| a.time);

        let loaded = db.neos.len();
        for (idx, mut approach) in approaches.into_iter().enumerate() {
            let existing = db
                .by_designation
                .get(&designation_key(&approach.designation))
                .copied();
            let owner = match existing {
                Some(id) => id,
                None => db.insert(NearEarthObject::placeholder(approach.designation.as_str())),
            };
            approach.neo = owner;
            db.neos[owner.0].approaches.push(ApproachId(idx));
            db.approaches.push(approach);
        }

        let placeholders = db.neos.len() - loaded;
        if placeholders > 0 {
            log::info!("Created {placeholders} placeholder NEOs for unmatched approaches");
        }
        log::debug!(
            "Linked {} NEOs and {} close approaches",
            db.neos.len(),
            db.approaches.len()
        );

        Ok(db)
    }

    fn insert(&mut self, neo: NearEarthObject) -> NeoId {
        let id = NeoId(self.neos.len());
        self.by_designation.insert(designation_key(&neo.designation), id);
        if let Some(name) = &neo.name {
            if let Some(prev) = self.by_name.insert(name.to_lowercase(), id) {
                log::debug!(
                    "Name '{name}' shared by {} and {}; keeping the latter",
                    self.neos[prev.0].designation,
                    neo.designation
                );
            }
        }
        self.neos.push(neo);
        id
    }

    // -- Lookups --

    /// Case-insensitive match on the primary designation (input is trimmed).
    pub fn get_neo_by_designation(&self, designation: &str) -> Option<&NearEarthObject> {
        self.by_designation
            .get(&designation_key(designation))
            .map(|&id| &self.neos[id.0])
    }

    /// Case-insensitive match on the IAU name. Empty input never matches.
    pub fn get_neo_by_name(&self, name: &str) -> Option<&NearEarthObject> {
        let key = name.trim();
        if key.is_empty() {
            return None;
        }
        self.by_name
            .get(&key.to_lowercase())
            .map(|&id| &self.neos[id.0])
    }

    /// Stream the close approaches that satisfy every criterion in `filters`,
    /// earliest first.
    pub fn query(&self, filters: &Filters) -> Query<'_> {
        Query::new(self, filters)
    }

    // -- Navigation --

    /// Resolve an object handle.
    ///
    /// # Panics
    /// If `id` was produced by a different dataset and is out of range.
    pub fn neo(&self, id: NeoId) -> &NearEarthObject {
        &self.neos[id.0]
    }

    /// The object that made `approach`.
    pub fn neo_of(&self, approach: &CloseApproach) -> &NearEarthObject {
        self.neo(approach.neo)
    }

    pub fn approach(&self, id: ApproachId) -> &CloseApproach {
        &self.approaches[id.0]
    }

    /// Approaches of `neo`, earliest first.
    pub fn approaches_of<'a>(
        &'a self,
        neo: &'a NearEarthObject,
    ) -> impl Iterator<Item = &'a CloseApproach> + 'a {
        neo.approaches.iter().map(move |&id| self.approach(id))
    }

    pub fn neos(&self) -> &[NearEarthObject] {
        &self.neos
    }

    /// Every approach in chronological order.
    pub fn approaches(&self) -> &[CloseApproach] {
        &self.approaches
    }

    pub fn len_neos(&self) -> usize {
        self.neos.len()
    }

    pub fn len_approaches(&self) -> usize {
        self.approaches.len()
    }
}

fn designation_key(designation: &str) -> String {
    designation.trim().to_lowercase()
}
