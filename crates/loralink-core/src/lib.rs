//! # LoRaLink Radio Link Parameter Engine
//!
//! This crate is the algorithmic core of the LoRaLink device web console:
//! everything needed to edit a LoRa radio configuration safely — on-air
//! performance estimation, regulatory/hardware envelope resolution,
//! named presets, and the confirmation workflow gating hardware band
//! changes. Transport, persistence and rendering live in the console;
//! this crate consumes JSON settings and reference tables and produces a
//! validated settings record plus derived read-only metrics.
//!
//! ## Components
//!
//! ```text
//! user edit ──> LinkSession(RadioParameters) ──> PerformanceEstimate
//!                      │
//!    band selection ──> BandChangeGuard ──confirm──> commit + recenter
//!                      │
//!             save ──> ComplianceResolver(ReferenceTables) ──> Ready | Blocked
//! ```
//!
//! - [`params`]: the settings record and the validated SF/BW/CR types
//! - [`tables`]: hardware band and regulatory catalogs with builtin fallback
//! - [`compliance`]: envelope resolution and save-time validation
//! - [`estimate`]: time-on-air and range estimation (pure functions)
//! - [`presets`]: named parameter presets and active-preset detection
//! - [`guard`]: the two-state band change confirmation machine
//! - [`wire`]: the device REST API JSON contract
//! - [`session`]: the editing session tying it all together
//!
//! ## Example
//!
//! ```rust
//! use loralink_core::prelude::*;
//!
//! let mut session = LinkSession::new(ReferenceTables::builtin());
//!
//! // Edits refresh the display estimate synchronously
//! session.set_spreading_factor(SpreadingFactor::SF9);
//! println!("airtime: {:.1} ms", session.estimate().time_on_air_ms);
//!
//! // Saving is gated on the resolved compliance envelope
//! match session.prepare_save().unwrap() {
//!     SaveGate::Ready(_doc) => { /* POST to /lora/settings */ }
//!     SaveGate::Blocked(violations) => {
//!         for v in violations {
//!             eprintln!("blocked: {v}");
//!         }
//!     }
//! }
//! ```

pub mod compliance;
pub mod error;
pub mod estimate;
pub mod guard;
pub mod params;
pub mod presets;
pub mod session;
pub mod tables;
pub mod wire;

// Re-export main types
pub use compliance::{ComplianceEnvelope, Violation};
pub use error::{EngineError, Result};
pub use estimate::{PerformanceEstimate, RangeModel};
pub use guard::BandChangeGuard;
pub use params::{Bandwidth, CodingRate, RadioParameters, SpreadingFactor};
pub use presets::Preset;
pub use session::{LinkSession, SaveGate, SaveStatus};
pub use tables::{HardwareBandProfile, ReferenceTables, Region, RegulatoryRule};
pub use wire::SettingsDocument;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::compliance::{ComplianceEnvelope, Violation};
    pub use crate::error::{EngineError, Result};
    pub use crate::estimate::{PerformanceEstimate, RangeModel};
    pub use crate::params::{Bandwidth, CodingRate, RadioParameters, SpreadingFactor};
    pub use crate::session::{LinkSession, SaveGate, SaveStatus};
    pub use crate::tables::ReferenceTables;
}
