//! Scenario-based testing framework.
//!
//! Scripts a sequence of caller commands and socket events against the pure
//! session state machine, records everything it asks for, then hands the
//! record to a mandatory oracle.
//!
//! ```text
//! Scenario::new(..).step(..).step(..)   ──oracle()──>   RunnableScenario
//!                                                            │ run()
//!                                                            ▼
//!                                        World { session, actions, ... }
//!                                                            │
//!                                                            ▼
//!                                                     oracle(&world)
//! ```

mod builder;
pub mod oracle;
mod world;

pub use builder::{RunnableScenario, Scenario, Step};
pub use world::World;

/// Verification run after all steps.
pub type OracleFn = Box<dyn Fn(&World) -> Result<(), String>>;
