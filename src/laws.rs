// Checkable law propositions
//
// Each check builds both sides of one law from the same inputs, observes them
// through a caller-supplied function and compares the observations. Programs
// are one-shot, so checks take builders rather than programs. A passing check
// is evidence for the inputs it was given; property tests supply many.

use std::fmt::Debug;

use thiserror::Error;

use crate::fusion::{fuse, Morphism};
use crate::handler::Handler;
use crate::monad::{Monad, Of};
use crate::program::{Program, Signature};

/// A law that did not hold, with both sides rendered with `Debug`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LawViolation {
    /// `pure(x).bind(f) != f(x)`.
    #[error("left identity violated: {lhs} != {rhs}")]
    LeftIdentity {
        /// Observation of `pure(x).bind(f)`.
        lhs: String,
        /// Observation of `f(x)`.
        rhs: String,
    },

    /// `m.bind(pure) != m`.
    #[error("right identity violated: {lhs} != {rhs}")]
    RightIdentity {
        /// Observation of `m.bind(pure)`.
        lhs: String,
        /// Observation of `m`.
        rhs: String,
    },

    /// `m.bind(f).bind(g) != m.bind(|x| f(x).bind(g))`.
    #[error("associativity violated: {lhs} != {rhs}")]
    Associativity {
        /// Observation of the left-nested bind.
        lhs: String,
        /// Observation of the right-nested bind.
        rhs: String,
    },

    /// `handle(pure(x)) != M::pure(x)`.
    #[error("handler does not preserve pure: {lhs} != {rhs}")]
    PreservesPure {
        /// Observation of the handled program.
        lhs: String,
        /// Observation of the target's `pure`.
        rhs: String,
    },

    /// `handle(m.bind(f)) != M::bind(handle(m), |x| handle(f(x)))`.
    #[error("handler does not preserve bind: {lhs} != {rhs}")]
    PreservesBind {
        /// Observation of the handled bind.
        lhs: String,
        /// Observation of the target's bind over handled parts.
        rhs: String,
    },

    /// `t.apply(h.handle(m)) != fuse(h, t).handle(m)`.
    #[error("fusion identity violated: {lhs} != {rhs}")]
    Fusion {
        /// Observation of the two-pass interpretation.
        lhs: String,
        /// Observation of the fused interpretation.
        rhs: String,
    },
}

/// Result of a law check.
pub type Result<T> = std::result::Result<T, LawViolation>;

fn compare<R, V>(lhs: R, rhs: R, violation: V) -> Result<()>
where
    R: PartialEq + Debug,
    V: FnOnce(String, String) -> LawViolation,
{
    if lhs == rhs {
        Ok(())
    } else {
        Err(violation(format!("{lhs:?}"), format!("{rhs:?}")))
    }
}

/// `pure(value).bind(f)` and `f(value)` are observed equal.
pub fn left_identity<F, A, B, K, O, R>(value: A, f: K, observe: O) -> Result<()>
where
    F: Signature,
    A: Clone + 'static,
    B: 'static,
    K: Fn(A) -> Program<F, B> + Clone + 'static,
    O: Fn(Program<F, B>) -> R,
    R: PartialEq + Debug,
{
    let lhs = observe(Program::pure(value.clone()).bind(f.clone()));
    let rhs = observe(f(value));
    compare(lhs, rhs, |lhs, rhs| LawViolation::LeftIdentity { lhs, rhs })
}

/// `m.bind(pure)` and `m` are observed equal.
pub fn right_identity<F, A, P, O, R>(build: P, observe: O) -> Result<()>
where
    F: Signature,
    A: 'static,
    P: Fn() -> Program<F, A>,
    O: Fn(Program<F, A>) -> R,
    R: PartialEq + Debug,
{
    let lhs = observe(build().bind(Program::pure));
    let rhs = observe(build());
    compare(lhs, rhs, |lhs, rhs| LawViolation::RightIdentity { lhs, rhs })
}

/// Left- and right-nested binds of `m`, `f` and `g` are observed equal.
pub fn associativity<F, A, B, C, P, K, L, O, R>(build: P, f: K, g: L, observe: O) -> Result<()>
where
    F: Signature,
    A: 'static,
    B: 'static,
    C: 'static,
    P: Fn() -> Program<F, A>,
    K: Fn(A) -> Program<F, B> + Clone + 'static,
    L: Fn(B) -> Program<F, C> + Clone + 'static,
    O: Fn(Program<F, C>) -> R,
    R: PartialEq + Debug,
{
    let lhs = observe(build().bind(f.clone()).bind(g.clone()));
    let rhs = observe(build().bind(move |x| f(x).bind(g.clone())));
    compare(lhs, rhs, |lhs, rhs| LawViolation::Associativity { lhs, rhs })
}

/// `handler` maps `pure(value)` to the target's `pure(value)`.
pub fn preserves_pure<F, H, A, O, R>(handler: &H, value: A, observe: O) -> Result<()>
where
    F: Signature,
    H: Handler<F>,
    A: Clone + 'static,
    O: Fn(Of<H::Target, A>) -> R,
    R: PartialEq + Debug,
{
    let lhs = observe(handler.handle(Program::pure(value.clone())));
    let rhs = observe(<H::Target as Monad>::pure(value));
    compare(lhs, rhs, |lhs, rhs| LawViolation::PreservesPure { lhs, rhs })
}

/// `handler` commutes with `bind`.
pub fn preserves_bind<F, H, A, B, P, K, O, R>(handler: &H, build: P, f: K, observe: O) -> Result<()>
where
    F: Signature,
    H: Handler<F>,
    A: 'static,
    B: 'static,
    P: Fn() -> Program<F, A>,
    K: Fn(A) -> Program<F, B> + Clone + 'static,
    O: Fn(Of<H::Target, B>) -> R,
    R: PartialEq + Debug,
{
    let lhs = observe(handler.handle(build().bind(f.clone())));
    let rest = handler.clone();
    let rhs = observe(<H::Target as Monad>::bind(handler.handle(build()), move |x| {
        rest.handle(f(x))
    }));
    compare(lhs, rhs, |lhs, rhs| LawViolation::PreservesBind { lhs, rhs })
}

/// Interpreting with `handler` and then applying `morphism` is observed equal
/// to interpreting once with `fuse(handler, morphism)`.
pub fn fusion<F, H, T, A, P, O, R>(handler: &H, morphism: &T, build: P, observe: O) -> Result<()>
where
    F: Signature,
    H: Handler<F>,
    T: Morphism<Source = H::Target>,
    A: 'static,
    P: Fn() -> Program<F, A>,
    O: Fn(Of<T::Target, A>) -> R,
    R: PartialEq + Debug,
{
    let lhs = observe(morphism.apply(handler.handle(build())));
    let fused = fuse(handler.clone(), morphism.clone());
    let rhs = observe(fused.handle(build()));
    compare(lhs, rhs, |lhs, rhs| LawViolation::Fusion { lhs, rhs })
}
