// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Command model, routing and handlers for the intake queue. Transport and
// storage concerns stay outside this layer; handlers reach the store only
// through their own pool.
//
// ============================================================================

pub mod intake;
