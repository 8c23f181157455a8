// Target contexts for handlers
//
// Rust has no higher-kinded types, so a target context is a marker type whose
// generic associated type `Of<T>` names the context applied to `T`. Every
// target provides `tail_rec`, the loop handlers use to interpret programs
// without recursing on the program's length.

use std::marker::PhantomData;
use std::ops::ControlFlow;

/// A monad used as the target of a handler.
pub trait Monad: 'static {
    /// The context applied to `T`.
    type Of<T: 'static>: 'static;

    /// Wrap a value without any effect.
    fn pure<T: 'static>(value: T) -> Self::Of<T>;

    /// Sequence `f` after `m`.
    fn bind<T, U, K>(m: Self::Of<T>, f: K) -> Self::Of<U>
    where
        T: 'static,
        U: 'static,
        K: FnMut(T) -> Self::Of<U> + 'static;

    /// Apply `f` to the result.
    fn map<T, U, K>(m: Self::Of<T>, mut f: K) -> Self::Of<U>
    where
        T: 'static,
        U: 'static,
        K: FnMut(T) -> U + 'static,
    {
        Self::bind(m, move |value| Self::pure(f(value)))
    }

    /// Iterate `step` from `init` until it breaks, in constant stack.
    fn tail_rec<A, B, K>(init: A, step: K) -> Self::Of<B>
    where
        A: 'static,
        B: 'static,
        K: FnMut(A) -> Self::Of<ControlFlow<B, A>> + 'static;
}

/// `M` applied to `T`.
pub type Of<M, T> = <M as Monad>::Of<T>;

/// A type with an associative `combine` and an identity `empty`.
pub trait Monoid: 'static {
    /// The identity element.
    fn empty() -> Self;
    /// Append `other` after `self`.
    fn combine(self, other: Self) -> Self;
}

impl Monoid for String {
    fn empty() -> Self {
        String::new()
    }

    fn combine(mut self, other: Self) -> Self {
        self.push_str(&other);
        self
    }
}

impl<T: 'static> Monoid for Vec<T> {
    fn empty() -> Self {
        Vec::new()
    }

    fn combine(mut self, mut other: Self) -> Self {
        self.append(&mut other);
        self
    }
}

impl Monoid for () {
    fn empty() -> Self {}

    fn combine(self, _other: Self) -> Self {}
}

impl<A: Monoid, B: Monoid> Monoid for (A, B) {
    fn empty() -> Self {
        (A::empty(), B::empty())
    }

    fn combine(self, other: Self) -> Self {
        (self.0.combine(other.0), self.1.combine(other.1))
    }
}

/// The identity context: `T` itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Monad for Identity {
    type Of<T: 'static> = T;

    fn pure<T: 'static>(value: T) -> T {
        value
    }

    fn bind<T, U, K>(m: T, mut f: K) -> U
    where
        T: 'static,
        U: 'static,
        K: FnMut(T) -> U + 'static,
    {
        f(m)
    }

    fn tail_rec<A, B, K>(init: A, mut step: K) -> B
    where
        A: 'static,
        B: 'static,
        K: FnMut(A) -> ControlFlow<B, A> + 'static,
    {
        let mut current = init;
        loop {
            match step(current) {
                ControlFlow::Continue(next) => current = next,
                ControlFlow::Break(value) => return value,
            }
        }
    }
}

/// A state-passing function `S -> (T, S)`.
pub struct Stateful<S: 'static, T: 'static> {
    run: Box<dyn FnOnce(S) -> (T, S)>,
}

impl<S: 'static, T: 'static> Stateful<S, T> {
    /// Wrap a state transition.
    pub fn new<F>(run: F) -> Self
    where
        F: FnOnce(S) -> (T, S) + 'static,
    {
        Self { run: Box::new(run) }
    }

    /// Run from `initial`, returning the value and the final state.
    pub fn run(self, initial: S) -> (T, S) {
        (self.run)(initial)
    }

    /// Run from `initial`, keeping only the value.
    pub fn eval(self, initial: S) -> T {
        self.run(initial).0
    }

    /// Run from `initial`, keeping only the final state.
    pub fn exec(self, initial: S) -> S {
        self.run(initial).1
    }
}

/// Target marker for [`Stateful`].
pub struct StateFn<S>(PhantomData<fn(S) -> S>);

impl<S: 'static> Monad for StateFn<S> {
    type Of<T: 'static> = Stateful<S, T>;

    fn pure<T: 'static>(value: T) -> Stateful<S, T> {
        Stateful::new(move |state| (value, state))
    }

    fn bind<T, U, K>(m: Stateful<S, T>, mut f: K) -> Stateful<S, U>
    where
        T: 'static,
        U: 'static,
        K: FnMut(T) -> Stateful<S, U> + 'static,
    {
        Stateful::new(move |state| {
            let (value, state) = m.run(state);
            f(value).run(state)
        })
    }

    fn tail_rec<A, B, K>(init: A, mut step: K) -> Stateful<S, B>
    where
        A: 'static,
        B: 'static,
        K: FnMut(A) -> Stateful<S, ControlFlow<B, A>> + 'static,
    {
        Stateful::new(move |mut state| {
            let mut current = init;
            loop {
                let (flow, next) = step(current).run(state);
                state = next;
                match flow {
                    ControlFlow::Continue(seed) => current = seed,
                    ControlFlow::Break(value) => return (value, state),
                }
            }
        })
    }
}

/// A function of a read-only environment `R -> T`.
pub struct Reading<R: 'static, T: 'static> {
    run: Box<dyn FnOnce(R) -> T>,
}

impl<R: 'static, T: 'static> Reading<R, T> {
    /// Wrap a function of the environment.
    pub fn new<F>(run: F) -> Self
    where
        F: FnOnce(R) -> T + 'static,
    {
        Self { run: Box::new(run) }
    }

    /// Supply the environment.
    pub fn run(self, env: R) -> T {
        (self.run)(env)
    }
}

/// Target marker for [`Reading`].
pub struct ReaderFn<R>(PhantomData<fn(R)>);

impl<R: Clone + 'static> Monad for ReaderFn<R> {
    type Of<T: 'static> = Reading<R, T>;

    fn pure<T: 'static>(value: T) -> Reading<R, T> {
        Reading::new(move |_| value)
    }

    fn bind<T, U, K>(m: Reading<R, T>, mut f: K) -> Reading<R, U>
    where
        T: 'static,
        U: 'static,
        K: FnMut(T) -> Reading<R, U> + 'static,
    {
        Reading::new(move |env: R| {
            let value = m.run(env.clone());
            f(value).run(env)
        })
    }

    fn tail_rec<A, B, K>(init: A, mut step: K) -> Reading<R, B>
    where
        A: 'static,
        B: 'static,
        K: FnMut(A) -> Reading<R, ControlFlow<B, A>> + 'static,
    {
        Reading::new(move |env: R| {
            let mut current = init;
            loop {
                match step(current).run(env.clone()) {
                    ControlFlow::Continue(seed) => current = seed,
                    ControlFlow::Break(value) => return value,
                }
            }
        })
    }
}

/// Target marker for `(T, W)`: a value with an accumulated monoid output.
pub struct WriterOf<W>(PhantomData<fn() -> W>);

impl<W: Monoid> Monad for WriterOf<W> {
    type Of<T: 'static> = (T, W);

    fn pure<T: 'static>(value: T) -> (T, W) {
        (value, W::empty())
    }

    fn bind<T, U, K>((value, first): (T, W), mut f: K) -> (U, W)
    where
        T: 'static,
        U: 'static,
        K: FnMut(T) -> (U, W) + 'static,
    {
        let (out, second) = f(value);
        (out, first.combine(second))
    }

    fn tail_rec<A, B, K>(init: A, mut step: K) -> (B, W)
    where
        A: 'static,
        B: 'static,
        K: FnMut(A) -> (ControlFlow<B, A>, W) + 'static,
    {
        let mut log = W::empty();
        let mut current = init;
        loop {
            let (flow, out) = step(current);
            log = log.combine(out);
            match flow {
                ControlFlow::Continue(seed) => current = seed,
                ControlFlow::Break(value) => return (value, log),
            }
        }
    }
}

/// Target marker for `Result<T, E>`.
pub struct Either<E>(PhantomData<fn() -> E>);

impl<E: 'static> Monad for Either<E> {
    type Of<T: 'static> = Result<T, E>;

    fn pure<T: 'static>(value: T) -> Result<T, E> {
        Ok(value)
    }

    fn bind<T, U, K>(m: Result<T, E>, f: K) -> Result<U, E>
    where
        T: 'static,
        U: 'static,
        K: FnMut(T) -> Result<U, E> + 'static,
    {
        m.and_then(f)
    }

    fn tail_rec<A, B, K>(init: A, mut step: K) -> Result<B, E>
    where
        A: 'static,
        B: 'static,
        K: FnMut(A) -> Result<ControlFlow<B, A>, E> + 'static,
    {
        let mut current = init;
        loop {
            match step(current)? {
                ControlFlow::Continue(seed) => current = seed,
                ControlFlow::Break(value) => return Ok(value),
            }
        }
    }
}

/// Target marker for `Vec<T>`: every result, in exploration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct List;

impl Monad for List {
    type Of<T: 'static> = Vec<T>;

    fn pure<T: 'static>(value: T) -> Vec<T> {
        vec![value]
    }

    fn bind<T, U, K>(m: Vec<T>, f: K) -> Vec<U>
    where
        T: 'static,
        U: 'static,
        K: FnMut(T) -> Vec<U> + 'static,
    {
        m.into_iter().flat_map(f).collect()
    }

    // Depth-first over an explicit work stack. Pending items are pushed in
    // reverse so they pop in the order `step` produced them.
    fn tail_rec<A, B, K>(init: A, mut step: K) -> Vec<B>
    where
        A: 'static,
        B: 'static,
        K: FnMut(A) -> Vec<ControlFlow<B, A>> + 'static,
    {
        let mut results = Vec::new();
        let mut pending = vec![ControlFlow::Continue(init)];
        while let Some(flow) = pending.pop() {
            match flow {
                ControlFlow::Break(value) => results.push(value),
                ControlFlow::Continue(seed) => pending.extend(step(seed).into_iter().rev()),
            }
        }
        results
    }
}

/// A state-passing function that may fail: `S -> Result<(T, S), E>`.
///
/// The common target when State and Exception are combined; a failure discards
/// the state reached so far.
pub struct StatefulResult<S: 'static, E: 'static, T: 'static> {
    run: Box<dyn FnOnce(S) -> Result<(T, S), E>>,
}

impl<S: 'static, E: 'static, T: 'static> StatefulResult<S, E, T> {
    /// Wrap a fallible state transition.
    pub fn new<F>(run: F) -> Self
    where
        F: FnOnce(S) -> Result<(T, S), E> + 'static,
    {
        Self { run: Box::new(run) }
    }

    /// Run from `initial`.
    pub fn run(self, initial: S) -> Result<(T, S), E> {
        (self.run)(initial)
    }
}

/// Target marker for [`StatefulResult`].
pub struct StateOr<S, E>(PhantomData<fn(S) -> (S, E)>);

impl<S: 'static, E: 'static> Monad for StateOr<S, E> {
    type Of<T: 'static> = StatefulResult<S, E, T>;

    fn pure<T: 'static>(value: T) -> StatefulResult<S, E, T> {
        StatefulResult::new(move |state| Ok((value, state)))
    }

    fn bind<T, U, K>(m: StatefulResult<S, E, T>, mut f: K) -> StatefulResult<S, E, U>
    where
        T: 'static,
        U: 'static,
        K: FnMut(T) -> StatefulResult<S, E, U> + 'static,
    {
        StatefulResult::new(move |state| {
            let (value, state) = m.run(state)?;
            f(value).run(state)
        })
    }

    fn tail_rec<A, B, K>(init: A, mut step: K) -> StatefulResult<S, E, B>
    where
        A: 'static,
        B: 'static,
        K: FnMut(A) -> StatefulResult<S, E, ControlFlow<B, A>> + 'static,
    {
        StatefulResult::new(move |mut state| {
            let mut current = init;
            loop {
                let (flow, next) = step(current).run(state)?;
                state = next;
                match flow {
                    ControlFlow::Continue(seed) => current = seed,
                    ControlFlow::Break(value) => return Ok((value, state)),
                }
            }
        })
    }
}
