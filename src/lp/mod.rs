//! Engine-independent linear optimization problems.
//!
//! Formulations are values: built fresh per optimization call, written to
//! LP text or handed to a solver backend, then dropped.

mod emit;
mod linear;

pub use emit::write_lp;
pub use linear::{
    Constraint, ConstraintKind, Formulation, LinearExpr, ObjSense, Objective, Sense, VarDomain,
    VarId, Variable,
};
