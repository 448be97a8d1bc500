//! Centralized limits and thresholds for the fjs pipeline.
//!
//! Shared constants for recursion depths, fixed-point iteration caps, and the
//! scoring/cost tables used by the lifecycle and rebuild analyses.
//! Centralizing these values prevents duplicate definitions with inconsistent
//! numbers and keeps the weight tables documented in one place.

// =============================================================================
// Recursion and iteration guards
// =============================================================================

/// Maximum IR nesting depth for recursive passes (extraction, inference,
/// emission). Each nested expression or statement adds a stack frame; past
/// this depth a pass bails out with a diagnostic rather than overflowing.
pub const MAX_IR_DEPTH: u32 = 500;

/// Cap on fixed-point iterations for the rebuild trigger graph. The
/// iteration is bounded by field-count x build-count anyway; this guard only
/// exists so a logic error cannot spin forever.
pub const MAX_FIXPOINT_ITERATIONS: u32 = 10_000;

// =============================================================================
// Lifecycle health score deductions
// =============================================================================
// The health score starts at 100 and subtracts a fixed amount per detected
// issue, floored at 0.

/// Deduction for a resource created in `initState` and never disposed.
pub const DEDUCTION_RESOURCE_LEAK: u32 = 20;

/// Deduction for a field read before any lifecycle method initializes it.
pub const DEDUCTION_USE_BEFORE_INIT: u32 = 25;

/// Deduction for a lifecycle override that never calls its `super` method.
pub const DEDUCTION_MISSING_SUPER_CALL: u32 = 10;

/// Deduction for a mis-ordered super call (`super.initState()` not first,
/// `super.dispose()` not last).
pub const DEDUCTION_LIFECYCLE_ORDER: u32 = 15;

/// Starting health score before deductions.
pub const HEALTH_SCORE_MAX: u32 = 100;

// =============================================================================
// Rebuild cost weight table
// =============================================================================
// Static cost estimate for one execution of a build method. These are
// dimensionless weights, not measurements; they only need to rank rebuilds
// against each other and against the thresholds below.

/// Base cost of any build method invocation.
pub const COST_BASE: u32 = 1;

/// Per widget constructor call in the build body (subtree size proxy).
pub const COST_PER_WIDGET: u32 = 2;

/// Per level of widget nesting depth.
pub const COST_PER_NESTING_LEVEL: u32 = 3;

/// Per conditional (`if` / ternary) in the build body.
pub const COST_PER_CONDITIONAL: u32 = 2;

/// Per loop in the build body.
pub const COST_PER_LOOP: u32 = 5;

/// Flat cost added when the build produces dynamic children
/// (builder callbacks, `.map(...)` over children, `List.generate`).
pub const COST_DYNAMIC_CHILDREN: u32 = 10;

/// A rebuild with an estimated cost at or above this is flagged expensive.
pub const EXPENSIVE_REBUILD_THRESHOLD: u32 = 50;

/// A single field transitively affecting at least this many build methods is
/// flagged as a cascade.
pub const CASCADE_FANOUT_THRESHOLD: usize = 3;
