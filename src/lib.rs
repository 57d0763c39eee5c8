//! Provider selection and sequencing under a global time budget.
//!
//! Providers cost time to activate and then ship items at a fixed rate for
//! the rest of the budget. The goal is to choose which providers to
//! activate, in which order, and which distinct items each ships, so that
//! the total score of covered items is maximal.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Item`, `Provider`, `Instance`, `Schedule`
//! - **`lp`**: Engine-independent `Formulation` value and LP-format writer
//! - **`formulation`**: Fixed-order, subset, joint and windowed joint models
//! - **`solver`**: Solver gateway with in-process and command-line backends
//! - **`builder`**: Incremental schedule builder with move rejection
//! - **`validation`**: Full-schedule integrity checks
//! - **`scheduler`**: Scoring, KPIs and greedy construction
//! - **`dispatching`**: Ordering rules for candidate provider orders
//! - **`planner`**: Solve, decode, validate, score; windowed local search
//!
//! # Example
//!
//! ```
//! use u_provision::models::{Instance, Provider};
//! use u_provision::planner::Planner;
//!
//! let instance = Instance::new(
//!     2,
//!     vec![10, 1],
//!     vec![Provider::new(0, 1, 5).with_catalog(vec![0, 1])],
//! ).unwrap();
//!
//! let outcome = Planner::default().plan_fixed_order(&instance, &[0]).unwrap();
//! assert_eq!(outcome.score, 11);
//! ```

pub mod builder;
pub mod dispatching;
pub mod formulation;
pub mod lp;
pub mod models;
pub mod planner;
pub mod scheduler;
pub mod solver;
pub mod validation;
