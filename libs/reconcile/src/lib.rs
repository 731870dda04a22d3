//! Object reconciliation core.
//!
//! This library converges named device configuration objects toward a
//! desired declarative state. Key concepts:
//!
//! - **Desired state**: the object document the caller wants, plus a
//!   presence flag (`present` or `absent`).
//! - **Observed state**: what the device currently holds, fetched fresh on
//!   every pass and never cached.
//! - **Decision**: the minimal operation that converges the two —
//!   create, modify, delete, or nothing.
//!
//! # Invariants
//!
//! - Decisions are deterministic given the same inputs.
//! - The decision phase is side-effect free; only executing a plan writes
//!   to the device. Check mode runs the decision phase alone.
//! - Sequence-valued fields compare order-sensitively.
//! - Fields the schema does not manage never affect the decision.
//!
//! The reconciler is generic over an [`ObjectSchema`] descriptor, so one
//! implementation serves every object kind; a few common descriptors live
//! in [`objects`].

mod error;
pub mod objects;
mod reconciler;
mod schema;
mod state;

pub use error::{Action, ReconcileError};
pub use reconciler::{Plan, ReconcileDecision, Reconciler};
pub use schema::{FieldKind, FieldSpec, ObjectSchema};
pub use state::{DesiredState, Presence};
