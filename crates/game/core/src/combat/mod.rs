//! Melee combat resolution.
//!
//! The entry point is [`AttackResolver`], which drives every swing through a
//! fixed phase pipeline and reports what happened in an [`AttackReport`].
//! The remaining modules hold the pure pieces the pipeline is built from:
//!
//! - [`hit`]: to-hit rolls, shield blocks and stab detection
//! - [`damage`]: the player and monster damage chains
//! - [`aux`]: the table of auxiliary unarmed attacks
//! - [`effects`]: the flavour and brand registry
//! - [`heads`]: hydra decapitation
//! - [`retaliation`]: harm a defender deals back to its attacker
//!
//! All randomness comes from a [`crate::env::Dice`] bound to the combat
//! stream, so a replay with the same seed and nonce gives the same report.

pub mod attempt;
pub mod aux;
mod brand;
pub mod context;
pub mod damage;
pub mod effects;
pub mod error;
pub mod heads;
pub mod hit;
pub mod report;
pub mod resolver;
pub mod retaliation;
pub mod types;

pub use attempt::{AttackAttempt, AttemptFlags, PhaseOutcome, SubAttack, Termination};
pub use aux::{AUX_ATTACKS, AuxAttack, AuxBrand, aux_attack};
pub use context::{AlwaysProceed, AttackConfirmation, CombatContext, RefuseAllies};
pub use effects::{EffectContext, EffectHandler, EffectRegistry, FlavourOutcome};
pub use error::CombatError;
pub use heads::Decapitation;
pub use hit::HitRoll;
pub use report::{AttackReport, SwingKind, SwingOutcome, SwingRecord};
pub use resolver::AttackResolver;
pub use retaliation::Reaction;
pub use types::{AttackType, Brand, DamageType, Flavour, Manoeuvre};
