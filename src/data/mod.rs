/// Data layer: raw records, the linked dataset, loading, and querying.
///
/// Architecture:
/// ```text
///  neos.csv          cad.json
///     │                 │
///     ▼                 ▼
///   ┌──────────────────────┐
///   │        loader        │  parse files → NeoRecord / ApproachRecord rows
///   └──────────────────────┘
///              │
///              ▼
///   ┌──────────────────────┐
///   │     NeoDatabase      │  NEOs ⇄ approaches, designation/name indices,
///   └──────────────────────┘  one chronological approach sequence
///              │
///              ▼
///   ┌──────────────────────┐
///   │        filter        │  Filters → predicates → lazy Query stream
///   └──────────────────────┘
/// ```

pub mod database;
pub mod filter;
pub mod loader;
pub mod model;

pub use database::NeoDatabase;
pub use filter::{Filters, Query};
pub use model::{CloseApproach, DataError, NearEarthObject};
