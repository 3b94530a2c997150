//! Scenario builder API.
//!
//! Provides a declarative API for constructing scenario tests that enforce
//! the Oracle Pattern.

use deckbridge_core::{SessionConfig, SessionInput};
use deckbridge_proto::Envelope;

use crate::scenario::{OracleFn, World};

/// One scripted event.
#[derive(Debug, Clone)]
pub enum Step {
    /// Caller connects to `url`
    Connect(String),
    /// Caller disconnects
    Disconnect,
    /// Most recently opened socket finishes opening
    Open,
    /// Most recently opened socket errors, then closes
    Fail(String),
    /// Most recently opened socket closes
    Close,
    /// Retry timer fires
    RetryFires,
    /// Most recently opened socket delivers text
    Receive(String),
    /// Caller sends an envelope
    Send(Envelope),
}

/// Scenario builder.
///
/// Must call `.oracle()` to get a [`RunnableScenario`] that can be executed.
pub struct Scenario {
    name: String,
    config: SessionConfig,
    steps: Vec<Step>,
}

impl Scenario {
    /// Create a new scenario with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), config: SessionConfig::default(), steps: Vec::new() }
    }

    /// Use a custom session configuration.
    #[must_use]
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a step.
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append several steps.
    #[must_use]
    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Set the oracle function and return a runnable scenario.
    ///
    /// The oracle is mandatory - you cannot run a scenario without
    /// verification.
    pub fn oracle(self, oracle: OracleFn) -> RunnableScenario {
        RunnableScenario { scenario: self, oracle }
    }
}

/// A scenario with an oracle function that can be executed.
pub struct RunnableScenario {
    scenario: Scenario,
    oracle: OracleFn,
}

impl RunnableScenario {
    /// Execute every step in order, then run the oracle.
    ///
    /// Socket steps before any socket was opened are a scripting mistake and
    /// fail the scenario.
    pub fn run(self) -> Result<(), String> {
        let Scenario { name, config, steps } = self.scenario;
        let mut world = World::new(config);

        for (index, step) in steps.into_iter().enumerate() {
            let input = match step {
                Step::Connect(url) => SessionInput::Connect { url },
                Step::Disconnect => SessionInput::Disconnect,
                Step::RetryFires => SessionInput::RetryElapsed,
                Step::Send(envelope) => {
                    match world.session().send(&envelope) {
                        Ok(actions) => world.record(actions),
                        Err(e) => world.record_send_error(e),
                    }
                    continue;
                },
                Step::Open => SessionInput::TransportOpened { conn: last_opened(&world, &name, index)? },
                Step::Close => SessionInput::TransportClosed { conn: last_opened(&world, &name, index)? },
                Step::Receive(text) => {
                    SessionInput::TextReceived { conn: last_opened(&world, &name, index)?, text }
                },
                Step::Fail(reason) => {
                    let conn = last_opened(&world, &name, index)?;
                    let actions =
                        world.session_mut().handle(SessionInput::TransportError { conn, reason });
                    world.record(actions);
                    SessionInput::TransportClosed { conn }
                },
            };

            let actions = world.session_mut().handle(input);
            world.record(actions);
        }

        (self.oracle)(&world).map_err(|e| format!("Scenario '{name}': {e}"))
    }
}

fn last_opened(world: &World, name: &str, index: usize) -> Result<u64, String> {
    world
        .last_opened()
        .ok_or_else(|| format!("Scenario '{name}': step {index} needs a socket but none was opened"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_requires_oracle() {
        // This should compile - oracle provided
        let _scenario = Scenario::new("test").oracle(Box::new(|_world| Ok(())));

        // This should NOT compile - no oracle
        // let scenario = Scenario::new("test");
        // scenario.run(); // ERROR: no method `run` on type `Scenario`
    }

    #[test]
    fn socket_step_without_socket_fails() {
        let result = Scenario::new("no socket").step(Step::Open).oracle(Box::new(|_| Ok(()))).run();
        assert!(result.unwrap_err().contains("none was opened"));
    }

    #[test]
    fn oracle_failure_names_the_scenario() {
        let result = Scenario::new("named").oracle(Box::new(|_| Err("nope".into()))).run();
        assert_eq!(result, Err("Scenario 'named': nope".to_string()));
    }
}
