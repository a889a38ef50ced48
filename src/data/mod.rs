//! Data layer: core types, loading, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  .csv / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  read file → raw rows
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ normalize  │  raw row → TariffObservation (bad dates dropped)
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ Dataset   │  reference lists + ISIC / HS6 observations
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterRequest → FilterCriteria → filtered view
//!   └──────────┘
//!        │
//!        ├──────────────┐
//!        ▼              ▼
//!   ┌──────────┐   ┌──────────┐
//!   │  series   │   │ summary  │
//!   └──────────┘   └──────────┘
//! ```

pub mod code;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod series;
pub mod summary;
pub mod view;
