// ============================================================================
// Intake Domain - commands arriving over the received queue
// ============================================================================
//
// - topic           - Topic / TopicTag (wire tag → registered topic)
// - commands        - one payload shape per topic + the Command sum type
// - envelope        - decode body → envelope, resolve envelope → Command
// - registry        - topic → handler routing, falsy results → errors
// - command_handler - EventCommandHandler trait + Postgres implementation
// - validator       - IntakeValidator rules for tournament batches
// - errors          - IntakeError, ValidationError
//
// ============================================================================

pub mod command_handler;
pub mod commands;
pub mod envelope;
pub mod errors;
pub mod registry;
pub mod topic;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_support;

pub use command_handler::*;
pub use commands::*;
pub use envelope::*;
pub use errors::*;
pub use registry::*;
pub use topic::*;
pub use validator::*;
