//! # u-inference
//!
//! Statistical computation engine: descriptive statistics, hypothesis
//! tests, confidence intervals, ANOVA, rank tests, chi-square tests,
//! regression and resampling simulation, built on a tolerant floating-point
//! comparison layer.
//!
//! ## Modules
//!
//! - [`tolerance`]: tolerance-aware comparison and significant-digit rounding
//! - [`stats`]: summary statistics, moments, correlation
//! - [`special`]: gamma and beta functions behind the distributions
//! - [`distributions`]: normal, Student-t, chi-square and F
//! - [`matrix`]: transpose, multiply, Gauss–Jordan inverse
//! - [`discrete`]: finite discrete random variables
//! - [`tables`]: one- and two-way frequency tables
//! - [`inference`]: z, t, F, χ², ANOVA and rank procedures
//! - [`regression`]: polynomial, multiple and exponential least squares
//! - [`random`]: seeded RNG, shuffling, with-replacement draws
//! - [`resampling`]: bootstrap and permutation simulators
//! - [`error`]: the crate's error type
//!
//! ## Design Philosophy
//!
//! - **Explicit tolerance**: float comparisons go through a [`Tolerance`]
//!   passed by the caller, never through global state
//! - **Explicit failure**: invalid input and degenerate models are
//!   reported as [`StatsError`] instead of leaking NaN
//! - **Injected randomness**: simulators take the RNG as an argument
//! - **Property-based testing**: invariants verified via proptest
//!
//! ## Example
//!
//! ```
//! use u_inference::inference::{two_sample_t_test, Sidedness};
//! use u_inference::Tolerance;
//!
//! let a = [12.1, 14.3, 11.8, 15.2, 13.7, 12.9];
//! let b = [10.2, 11.5, 9.8, 12.1, 10.9, 11.3, 9.5, 10.7];
//! let r = two_sample_t_test(&a, &b, 0.0, Sidedness::Greater, false, &Tolerance::default())?;
//! assert!(r.p_value < 0.01);
//! # Ok::<(), u_inference::StatsError>(())
//! ```

pub mod discrete;
pub mod distributions;
pub mod error;
pub mod inference;
pub mod matrix;
pub mod random;
pub mod regression;
pub mod resampling;
pub mod special;
pub mod stats;
pub mod tables;
pub mod tolerance;

pub use error::{Result, StatsError};
pub use tolerance::Tolerance;
