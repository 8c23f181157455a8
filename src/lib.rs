//! Algebraic effects with free programs and handlers
//!
//! A [`Program`] is a tree of primitive operations drawn from an effect
//! [`Signature`], built with `pure`, `bind` and `op`. A [`Handler`] gives each
//! operation a meaning in a target [`Monad`] and folds whole programs into
//! that target, so the same program can be run under different
//! interpretations.
//!
//! The crate ships the State, Reader, Writer, Exception and nondeterministic
//! choice effects, `Sum` and `Product` composition of signatures, handler
//! fusion along monad morphisms, checkable law propositions, and middleware
//! for tracing and recording interpretations.
//!
//! Interpretation is an explicit loop over the program, and left-nested binds
//! are reassociated one node at a time, so long programs run in bounded stack
//! whichever way their binds nest.

pub mod compose;
pub mod effects;
pub mod fusion;
pub mod handler;
pub mod laws;
pub mod middleware;
pub mod monad;
pub mod program;

// Re-export main APIs
pub use compose::{lift_handler, Product, ProductHandler, Sum, SumHandler};
pub use fusion::{fuse, Fused, Morphism};
pub use handler::{interpret, Handler};
pub use laws::LawViolation;
pub use middleware::{Metrics, RecordedEvent, Recording, Trace};
pub use monad::{Identity, Monad, Monoid, Of};
pub use program::{Program, Resumed, Signature, Transform};
