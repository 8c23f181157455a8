// Handler fusion
//
// A monad morphism `M -> N` applied after a handler into `M` equals a single
// handler into `N` whose per-operation meaning is the morphism applied to the
// original one. `fuse` builds that single handler, so a chain of
// interpretations costs one traversal of the program.

use std::marker::PhantomData;
use std::rc::Rc;

use crate::handler::Handler;
use crate::monad::{
    Either, Identity, List, Monad, Monoid, Of, ReaderFn, Reading, StateFn, StateOr, Stateful,
    StatefulResult, WriterOf,
};
use crate::program::Signature;

/// A monad morphism: a map `Source<T> -> Target<T>` for every `T` that
/// preserves `pure` and `bind`.
///
/// Preservation is not checked by the type system; see [`crate::laws`].
pub trait Morphism: Clone + 'static {
    /// The monad mapped from.
    type Source: Monad;
    /// The monad mapped into.
    type Target: Monad;

    /// Map one computation.
    fn apply<T: 'static>(&self, m: Of<Self::Source, T>) -> Of<Self::Target, T>;

    /// Follow this morphism with `next`.
    fn then<N>(self, next: N) -> Then<Self, N>
    where
        N: Morphism<Source = Self::Target>,
    {
        Then {
            first: self,
            second: next,
        }
    }
}

/// A handler followed by a morphism, as one handler.
#[derive(Debug, Clone)]
pub struct Fused<H, T> {
    handler: H,
    morphism: T,
}

impl<H, T> Fused<H, T> {
    /// The handler interpreting each operation.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The morphism applied to each interpreted operation.
    pub fn morphism(&self) -> &T {
        &self.morphism
    }
}

impl<F, H, T> Handler<F> for Fused<H, T>
where
    F: Signature,
    H: Handler<F>,
    T: Morphism<Source = H::Target>,
{
    type Target = T::Target;

    fn handle_op<K: 'static>(&self, op: F::Op<K>) -> Of<T::Target, K> {
        self.morphism.apply(self.handler.handle_op(op))
    }
}

/// Fuse `handler` and `morphism` into one pass.
///
/// `fuse(h, t).handle(m)` equals `t.apply(h.handle(m))` for every program `m`.
pub fn fuse<H, T>(handler: H, morphism: T) -> Fused<H, T> {
    Fused { handler, morphism }
}

macro_rules! marker_morphism {
    ($(#[$meta:meta])* $name:ident<$($param:ident),+>) => {
        $(#[$meta])*
        pub struct $name<$($param),+>(PhantomData<fn() -> ($($param,)+)>);

        impl<$($param),+> $name<$($param),+> {
            /// Create the morphism.
            pub fn new() -> Self {
                Self(PhantomData)
            }
        }

        impl<$($param),+> Default for $name<$($param),+> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<$($param),+> Clone for $name<$($param),+> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<$($param),+> Copy for $name<$($param),+> {}

        impl<$($param),+> std::fmt::Debug for $name<$($param),+> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(stringify!($name))
            }
        }
    };
}

marker_morphism! {
    /// The identity morphism on `M`.
    Id<M>
}

impl<M: Monad> Morphism for Id<M> {
    type Source = M;
    type Target = M;

    fn apply<T: 'static>(&self, m: Of<M, T>) -> Of<M, T> {
        m
    }
}

marker_morphism! {
    /// `Identity -> M`, through `M::pure`.
    Embed<M>
}

impl<M: Monad> Morphism for Embed<M> {
    type Source = Identity;
    type Target = M;

    fn apply<T: 'static>(&self, m: T) -> Of<M, T> {
        M::pure(m)
    }
}

marker_morphism! {
    /// `Result<T, E> -> Vec<T>`: an error contributes no results.
    ErrorToList<E>
}

impl<E: 'static> Morphism for ErrorToList<E> {
    type Source = Either<E>;
    type Target = List;

    fn apply<T: 'static>(&self, m: Result<T, E>) -> Vec<T> {
        m.into_iter().collect()
    }
}

marker_morphism! {
    /// `(T, W) -> S -> (T, S)` with `W` as the state: the output is appended
    /// to whatever the state already holds.
    LogInto<W>
}

impl<W: Monoid> Morphism for LogInto<W> {
    type Source = WriterOf<W>;
    type Target = StateFn<W>;

    fn apply<T: 'static>(&self, (value, output): (T, W)) -> Stateful<W, T> {
        Stateful::new(move |log: W| (value, log.combine(output)))
    }
}

marker_morphism! {
    /// `R -> T` into `R -> (T, R)`: the environment becomes a state that is
    /// read and never written.
    AskState<R>
}

impl<R: Clone + 'static> Morphism for AskState<R> {
    type Source = ReaderFn<R>;
    type Target = StateFn<R>;

    fn apply<T: 'static>(&self, m: Reading<R, T>) -> Stateful<R, T> {
        Stateful::new(move |env: R| (m.run(env.clone()), env))
    }
}

marker_morphism! {
    /// `S -> (T, S)` into the fallible `S -> Result<(T, S), E>`.
    LiftState<S, E>
}

impl<S: 'static, E: 'static> Morphism for LiftState<S, E> {
    type Source = StateFn<S>;
    type Target = StateOr<S, E>;

    fn apply<T: 'static>(&self, m: Stateful<S, T>) -> StatefulResult<S, E, T> {
        StatefulResult::new(move |state| Ok(m.run(state)))
    }
}

marker_morphism! {
    /// `Result<T, E>` into `S -> Result<(T, S), E>`, leaving the state alone.
    LiftError<S, E>
}

impl<S: 'static, E: 'static> Morphism for LiftError<S, E> {
    type Source = Either<E>;
    type Target = StateOr<S, E>;

    fn apply<T: 'static>(&self, m: Result<T, E>) -> StatefulResult<S, E, T> {
        StatefulResult::new(move |state| m.map(|value| (value, state)))
    }
}

/// `(T, W) -> (T, V)` through a monoid homomorphism `W -> V`.
///
/// The function must map `empty` to `empty` and `combine` to `combine`, or
/// the result is not a morphism.
pub struct MapLog<W, V> {
    f: Rc<dyn Fn(W) -> V>,
}

impl<W, V> MapLog<W, V> {
    /// Wrap a monoid homomorphism.
    pub fn new<M>(f: M) -> Self
    where
        M: Fn(W) -> V + 'static,
    {
        Self { f: Rc::new(f) }
    }
}

impl<W, V> Clone for MapLog<W, V> {
    fn clone(&self) -> Self {
        Self {
            f: Rc::clone(&self.f),
        }
    }
}

impl<W: Monoid, V: Monoid> Morphism for MapLog<W, V> {
    type Source = WriterOf<W>;
    type Target = WriterOf<V>;

    fn apply<T: 'static>(&self, (value, output): (T, W)) -> (T, V) {
        (value, (self.f)(output))
    }
}

/// Two morphisms, one after the other. Built by [`Morphism::then`].
#[derive(Debug, Clone, Copy)]
pub struct Then<A, B> {
    first: A,
    second: B,
}

impl<A, B> Morphism for Then<A, B>
where
    A: Morphism,
    B: Morphism<Source = A::Target>,
{
    type Source = A::Source;
    type Target = B::Target;

    fn apply<T: 'static>(&self, m: Of<A::Source, T>) -> Of<B::Target, T> {
        self.second.apply(self.first.apply(m))
    }
}
