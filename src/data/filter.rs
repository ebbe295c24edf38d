use std::fmt;
use std::slice;

use chrono::NaiveDate;

use super::database::NeoDatabase;
use super::model::{CloseApproach, NearEarthObject};

// ---------------------------------------------------------------------------
// Filters – user criteria, every field optional
// ---------------------------------------------------------------------------

/// Query criteria. Unset fields do not constrain the result; set fields are
/// combined with logical AND.
///
/// Contradictory combinations (a minimum above its maximum, a `date` outside
/// `start_date..=end_date`) are accepted and simply match nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub distance_min: Option<f64>,
    pub distance_max: Option<f64>,
    pub velocity_min: Option<f64>,
    pub velocity_max: Option<f64>,
    pub diameter_min: Option<f64>,
    pub diameter_max: Option<f64>,
    /// `Some(false)` selects only non-hazardous objects.
    pub hazardous: Option<bool>,
}

impl Filters {
    /// Compile the set criteria into predicates, cheapest attribute first.
    pub fn predicates(&self) -> Vec<Predicate> {
        use Bound::*;

        let dates = [
            self.date.map(Exactly),
            self.start_date.map(AtLeast),
            self.end_date.map(AtMost),
        ];
        let mut out: Vec<Predicate> = dates.into_iter().flatten().map(Predicate::Date).collect();

        let numeric: [(Option<Bound<f64>>, fn(Bound<f64>) -> Predicate); 6] = [
            (self.distance_min.map(AtLeast), Predicate::Distance),
            (self.distance_max.map(AtMost), Predicate::Distance),
            (self.velocity_min.map(AtLeast), Predicate::Velocity),
            (self.velocity_max.map(AtMost), Predicate::Velocity),
            (self.diameter_min.map(AtLeast), Predicate::Diameter),
            (self.diameter_max.map(AtMost), Predicate::Diameter),
        ];
        out.extend(numeric.into_iter().filter_map(|(bound, wrap)| bound.map(wrap)));

        if let Some(h) = self.hazardous {
            out.push(Predicate::Hazardous(h));
        }
        out
    }

    /// Whether no criterion is set.
    pub fn is_empty(&self) -> bool {
        *self == Filters::default()
    }
}

// ---------------------------------------------------------------------------
// Predicate – one comparison against an approach or its object
// ---------------------------------------------------------------------------

/// How an attribute is compared against the reference value. Inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound<T> {
    Exactly(T),
    AtLeast(T),
    AtMost(T),
}

impl<T: PartialOrd> Bound<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Bound::Exactly(v) => value == v,
            Bound::AtLeast(v) => value >= v,
            Bound::AtMost(v) => value <= v,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Bound<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Exactly(v) => write!(f, "== {v}"),
            Bound::AtLeast(v) => write!(f, ">= {v}"),
            Bound::AtMost(v) => write!(f, "<= {v}"),
        }
    }
}

/// A single criterion, evaluated against an approach and the object that made it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    Date(Bound<NaiveDate>),
    Distance(Bound<f64>),
    Velocity(Bound<f64>),
    /// Objects of unknown size never satisfy a diameter bound.
    Diameter(Bound<f64>),
    Hazardous(bool),
}

impl Predicate {
    pub fn matches(&self, approach: &CloseApproach, neo: &NearEarthObject) -> bool {
        match self {
            Predicate::Date(b) => b.admits(&approach.date()),
            Predicate::Distance(b) => b.admits(&approach.distance),
            Predicate::Velocity(b) => b.admits(&approach.velocity),
            Predicate::Diameter(b) => neo.diameter.is_some_and(|d| b.admits(&d)),
            Predicate::Hazardous(h) => neo.hazardous == *h,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Date(b) => write!(f, "date {b}"),
            Predicate::Distance(b) => write!(f, "distance {b} au"),
            Predicate::Velocity(b) => write!(f, "velocity {b} km/s"),
            Predicate::Diameter(b) => write!(f, "diameter {b} km"),
            Predicate::Hazardous(h) => write!(f, "hazardous == {h}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Query – lazy, time-ordered stream of matching approaches
// ---------------------------------------------------------------------------

/// Iterator over the approaches of a [`NeoDatabase`] that pass every predicate.
///
/// Walks the dataset once in chronological order and yields matches as they
/// are found. Nothing is buffered; with a cap set it stops as soon as the cap
/// is reached.
#[derive(Debug, Clone)]
pub struct Query<'a> {
    db: &'a NeoDatabase,
    remaining: slice::Iter<'a, CloseApproach>,
    predicates: Vec<Predicate>,
    cap: Option<usize>,
}

impl<'a> Query<'a> {
    pub(crate) fn new(db: &'a NeoDatabase, filters: &Filters) -> Self {
        let predicates = filters.predicates();
        for p in &predicates {
            log::debug!("Filter: {p}");
        }
        Query {
            db,
            remaining: db.approaches().iter(),
            predicates,
            cap: None,
        }
    }

    /// Yield at most `cap` results. `None` and `Some(0)` mean unlimited.
    pub fn limit(mut self, cap: Option<usize>) -> Self {
        self.cap = cap.filter(|&c| c > 0);
        self
    }
}

impl<'a> Iterator for Query<'a> {
    type Item = &'a CloseApproach;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cap == Some(0) {
            return None;
        }
        let db = self.db;
        let predicates = &self.predicates;
        let found = self.remaining.find(|approach| {
            let neo = db.neo_of(approach);
            predicates.iter().all(|p| p.matches(approach, neo))
        })?;
        if let Some(cap) = self.cap.as_mut() {
            *cap -= 1;
        }
        Some(found)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let upper = self.remaining.len();
        (0, Some(self.cap.map_or(upper, |c| c.min(upper))))
    }
}

/// Cap any iterator at `cap` items. `None` and `Some(0)` leave it unbounded.
pub fn limit<I: Iterator>(iter: I, cap: Option<usize>) -> std::iter::Take<I> {
    iter.take(cap.filter(|&c| c > 0).unwrap_or(usize::MAX))
}
