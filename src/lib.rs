//! Modbus Hook Patcher: anchor-based patching for ArduinoModbus
//!
//! Injects a request-callback hook into an ArduinoModbus checkout by applying
//! a fixed, ordered plan of idempotent textual patches across the bundled
//! libmodbus sources and the C++ `ModbusServer` wrapper.
//!
//! # Architecture
//!
//! The engine is deliberately dumb about C and C++: every insertion point is
//! located by literal-substring anchors tried in priority order, never by
//! parsing. Robustness against upstream drift comes from fallback anchors,
//! and safety from a per-step signature check that makes the whole plan
//! re-runnable.
//!
//! - [`store`]: reads and writes whole files, distinguishing absence from
//!   I/O faults.
//! - [`anchor`]: anchor location and the idempotency guard.
//! - [`step`]: the pure patch step, composing guard + locator + transform.
//! - [`runner`]: folds steps over each target file and persists only when a
//!   buffer actually changed.
//! - [`plan`]: the hard-coded hook plan.
//!
//! # Example
//!
//! ```no_run
//! use modbus_hook_patcher::{plan, runner};
//! use std::path::Path;
//!
//! let reports = runner::run_plan(Path::new("."), &plan::hook_plan(), runner::Mode::Apply)?;
//! for report in &reports {
//!     println!("{}: {:?}", report.path.display(), report.status);
//! }
//! # Ok::<(), modbus_hook_patcher::StoreError>(())
//! ```

pub mod anchor;
pub mod plan;
pub mod runner;
pub mod step;
pub mod store;

// Re-exports
pub use anchor::{already_applied, locate, AnchorMatch};
pub use runner::{run_plan, run_target, FileReport, FileStatus, FileTarget, Mode, StepOutcome, StepReport};
pub use step::{PatchStep, StepApplication, Transform};
pub use store::StoreError;
