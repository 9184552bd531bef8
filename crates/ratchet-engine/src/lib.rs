//! The ts-ratchet engine.
//!
//! Pipeline: collector → structural pass → collector (re-run) → offset pass.
//! The collector and the offset pass each run in an isolated worker; the
//! structural pass fans out over files with rayon.

pub mod checker;
pub mod collector;
pub mod offset;
pub mod project;
pub mod structural;
pub mod tsc_output;
pub mod worker;

pub use checker::{TscChecker, TypeChecker};
pub use collector::{collect, collect_in_worker, reduce_diagnostics};
pub use offset::{OffsetOutput, run_offset_pass, run_offset_pass_in_worker};
pub use project::{Project, resolve_tsconfig_path};
pub use structural::{StructuralSummary, run_structural_pass, transform_source};
pub use worker::run_worker;
