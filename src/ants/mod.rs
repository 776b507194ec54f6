//! Ant packet records and the state machine that drives them.

pub mod messages;
pub mod state_machine;

pub use messages::{
    AntType, BackwardAnt, ControlMessage, DiffusionEntry, ForwardAnt, HelloAck, HelloMsg,
    LinkFailureMsg, LinkFailureStatus, LinkFailureUpdate,
};
pub use state_machine::{AntOutcome, AntStateMachine};
