//! Property tests for dataset linking and query streaming.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use neo_explorer::data::model::{ApproachRecord, NeoRecord};
use neo_explorer::data::{Filters, NeoDatabase};

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn neo_rows(count: usize, hazard: &[bool], diameters: &[Option<f64>]) -> Vec<NeoRecord> {
    (0..count)
        .map(|i| NeoRecord {
            designation: format!("N{i}"),
            name: if i % 3 == 0 { format!("Name{i}") } else { String::new() },
            hazardous: if hazard[i % hazard.len()] { "Y".into() } else { "N".into() },
            diameter: diameters[i % diameters.len()]
                .map(|d| d.to_string())
                .unwrap_or_default(),
        })
        .collect()
}

/// `(owner index, minutes after epoch, distance, velocity)`; owners beyond the
/// object count refer to designations with no metadata row.
fn approach_rows(rows: &[(usize, i64, f64, f64)]) -> Vec<ApproachRecord> {
    rows.iter()
        .map(|&(owner, minutes, dist, v)| ApproachRecord {
            designation: format!("N{owner}"),
            time: (epoch() + Duration::minutes(minutes)).format("%Y-%m-%d %H:%M").to_string(),
            distance: dist.to_string(),
            velocity: v.to_string(),
        })
        .collect()
}

fn dataset() -> impl Strategy<Value = (Vec<NeoRecord>, Vec<ApproachRecord>)> {
    (
        1usize..8,
        prop::collection::vec(any::<bool>(), 1..4),
        prop::collection::vec(prop::option::of(0.0f64..50.0), 1..4),
        prop::collection::vec((0usize..10, 0i64..20_000, 0.0f64..1.0, 0.0f64..40.0), 0..60),
    )
        .prop_map(|(count, hazard, diameters, approaches)| {
            (neo_rows(count, &hazard, &diameters), approach_rows(&approaches))
        })
}

proptest! {
    #[test]
    fn every_row_is_reachable((neos, approaches) in dataset()) {
        let db = NeoDatabase::from_records(&neos, &approaches).unwrap();

        for row in &neos {
            let neo = db.get_neo_by_designation(&row.designation).unwrap();
            prop_assert_eq!(&neo.designation, &row.designation);
            prop_assert!(!neo.is_placeholder());
        }
        for row in &approaches {
            let neo = db.get_neo_by_designation(&row.designation).unwrap();
            let found = db.approaches_of(neo).any(|a| {
                a.time_str() == row.time
                    && a.distance.to_string() == row.distance
                    && a.velocity.to_string() == row.velocity
            });
            prop_assert!(found);
            if !neos.iter().any(|n| n.designation == row.designation) {
                prop_assert!(neo.is_placeholder());
                prop_assert_eq!(neo.diameter, None);
                prop_assert!(!neo.hazardous);
            }
        }
    }

    #[test]
    fn back_references_and_order((neos, approaches) in dataset()) {
        let db = NeoDatabase::from_records(&neos, &approaches).unwrap();

        let mut linked = 0;
        for neo in db.neos() {
            let owned: Vec<_> = db.approaches_of(neo).collect();
            prop_assert!(owned.windows(2).all(|w| w[0].time <= w[1].time));
            for a in owned {
                prop_assert_eq!(db.neo_of(a), neo);
                linked += 1;
            }
        }
        prop_assert_eq!(linked, approaches.len());
    }

    #[test]
    fn unfiltered_query_yields_everything_once((neos, approaches) in dataset()) {
        let db = NeoDatabase::from_records(&neos, &approaches).unwrap();
        let all: Vec<_> = db.query(&Filters::default()).collect();

        prop_assert_eq!(all.len(), approaches.len());
        prop_assert!(all.windows(2).all(|w| w[0].time <= w[1].time));
        for (a, b) in all.iter().zip(db.approaches()) {
            prop_assert!(std::ptr::eq(*a, b));
        }
    }

    #[test]
    fn limit_takes_earliest_matches(
        (neos, approaches) in dataset(),
        k in 0usize..20,
        max_distance in 0.0f64..1.0,
        hazardous in prop::option::of(any::<bool>()),
    ) {
        let db = NeoDatabase::from_records(&neos, &approaches).unwrap();
        let filters = Filters {
            distance_max: Some(max_distance),
            hazardous,
            ..Default::default()
        };

        let everything: Vec<_> = db.query(&filters).collect();
        let capped: Vec<_> = db.query(&filters).limit(Some(k)).collect();

        let expected = if k == 0 { everything.len() } else { k.min(everything.len()) };
        prop_assert_eq!(capped.len(), expected);
        prop_assert_eq!(&capped[..], &everything[..expected]);

        for a in &everything {
            prop_assert!(a.distance <= max_distance);
            if let Some(h) = hazardous {
                prop_assert_eq!(db.neo_of(a).hazardous, h);
            }
        }
    }

    #[test]
    fn inverted_bounds_are_empty(
        (neos, approaches) in dataset(),
        lo in 0.0f64..1.0,
        gap in 0.001f64..1.0,
    ) {
        let db = NeoDatabase::from_records(&neos, &approaches).unwrap();
        let distance = Filters {
            distance_min: Some(lo + gap),
            distance_max: Some(lo),
            ..Default::default()
        };
        let diameter = Filters {
            diameter_min: Some(lo + gap),
            diameter_max: Some(lo),
            ..Default::default()
        };
        prop_assert_eq!(db.query(&distance).count(), 0);
        prop_assert_eq!(db.query(&diameter).count(), 0);
    }

    #[test]
    fn diameter_bounds_skip_unknown_sizes(
        (neos, approaches) in dataset(),
        min in 0.0f64..50.0,
    ) {
        let db = NeoDatabase::from_records(&neos, &approaches).unwrap();
        let filters = Filters {
            diameter_min: Some(min),
            ..Default::default()
        };
        for a in db.query(&filters) {
            let d = db.neo_of(a).diameter;
            prop_assert!(d.is_some_and(|d| d >= min));
        }
    }
}
