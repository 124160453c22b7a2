//! Batch removal of product images on a commercetools project.
//!
//! Three jobs share one pipeline: input (CSV or catalog scan) -> per-product
//! action planning -> chunked, version-guarded submission -> append-only
//! audit log. See `src/bin/` for the entry points.

pub mod catalog_ops;
pub mod cli;

pub mod util {
    pub mod env;
    pub mod logging;
}
