//! chime-scheduler — the Chime scheduling engine.
//!
//! # Overview
//!
//! The [`Engine`] owns the in-memory job set and the lifecycle of the poll
//! loop. The loop scans the set every second and spawns one concurrent
//! execution unit per due job; each unit notifies, performs the work step,
//! recomputes `next_run` from the previous trigger time and persists the set.
//!
//! # Rule variants
//!
//! | Variant    | Behaviour                                            |
//! |------------|------------------------------------------------------|
//! | `Once`     | Single fire at an absolute UTC instant, then retired |
//! | `Hourly`   | Previous trigger + 1 hour                            |
//! | `Daily`    | Previous trigger + 1 day                             |
//! | `Weekly`   | Previous trigger + 7 days                            |
//! | `Interval` | Previous trigger + N seconds                         |

pub mod engine;
pub mod recurrence;
pub mod runner;

pub use engine::Engine;
pub use runner::SimulatedWork;
