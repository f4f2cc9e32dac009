//! # Pyglass Diff - API Breakage Detection
//!
//! Compares two fully loaded snapshots of a package and yields a
//! structured list of API breakages: removed objects, changed kinds,
//! reordered or newly-required parameters, changed defaults and
//! attribute values, removed base classes.
//!
//! ## Example
//!
//! ```no_run
//! use pyglass_core::{load, LoadOptions};
//! use pyglass_diff::{check, Snapshot, Style};
//!
//! let old = load("pkg", LoadOptions::default()).unwrap();
//! let new = load("pkg", LoadOptions::default()).unwrap();
//! let breakages = check(
//!     Snapshot::new(old.root("pkg").unwrap(), &old.collection),
//!     Snapshot::new(new.root("pkg").unwrap(), &new.collection),
//! );
//! for breakage in &breakages {
//!     println!("{}", breakage.render(Style::OneLine));
//! }
//! ```

pub mod breakage;
pub mod differ;

pub use breakage::{Breakage, BreakageDetails, BreakageKind, Style};
pub use differ::{check, Snapshot};
