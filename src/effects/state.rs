// State effect: `get` and `put` over a single mutable cell, interpreted by
// threading the state through a `Stateful` function.

use std::marker::PhantomData;
use std::rc::Rc;

use crate::handler::Handler;
use crate::monad::{StateFn, Stateful};
use crate::program::{Program, Signature};

/// Signature of the State effect over `S`.
pub struct State<S>(PhantomData<fn(S) -> S>);

/// Operations of [`State`].
pub enum StateOp<S, K> {
    /// Read the current state.
    Get(Rc<dyn Fn(S) -> K>),
    /// Replace the current state.
    Put(S, K),
}

impl<S: 'static> StateOp<S, S> {
    /// `get`, yielding the state.
    pub fn get() -> Self {
        StateOp::Get(Rc::new(|state| state))
    }
}

impl<S> StateOp<S, ()> {
    /// `put`, yielding `()`.
    pub fn put(state: S) -> Self {
        StateOp::Put(state, ())
    }
}

impl<S: Clone, K: Clone> Clone for StateOp<S, K> {
    fn clone(&self) -> Self {
        match self {
            StateOp::Get(k) => StateOp::Get(Rc::clone(k)),
            StateOp::Put(state, k) => StateOp::Put(state.clone(), k.clone()),
        }
    }
}

impl<S: Clone + 'static> Signature for State<S> {
    const NAME: &'static str = "State";

    type Op<K: 'static> = StateOp<S, K>;

    fn map_op<K, L, M>(op: StateOp<S, K>, f: M) -> StateOp<S, L>
    where
        K: 'static,
        L: 'static,
        M: Fn(K) -> L + 'static,
    {
        match op {
            StateOp::Get(k) => StateOp::Get(Rc::new(move |state| f(k(state)))),
            StateOp::Put(state, k) => StateOp::Put(state, f(k)),
        }
    }

    fn op_name<K: 'static>(op: &StateOp<S, K>) -> &'static str {
        match op {
            StateOp::Get(_) => "get",
            StateOp::Put(..) => "put",
        }
    }
}

/// Canonical handler: State into `S -> (A, S)`.
pub struct StateHandler<S>(PhantomData<fn(S) -> S>);

impl<S> StateHandler<S> {
    /// Create the handler.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<S> Default for StateHandler<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for StateHandler<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for StateHandler<S> {}

impl<S: Clone + 'static> Handler<State<S>> for StateHandler<S> {
    type Target = StateFn<S>;

    fn handle_op<K: 'static>(&self, op: StateOp<S, K>) -> Stateful<S, K> {
        match op {
            StateOp::Get(k) => Stateful::new(move |state: S| (k(state.clone()), state)),
            StateOp::Put(state, k) => Stateful::new(move |_| (k, state)),
        }
    }
}

/// Read the state.
pub fn get<S: Clone + 'static>() -> Program<State<S>, S> {
    Program::op(StateOp::get())
}

/// Replace the state.
pub fn put<S: Clone + 'static>(state: S) -> Program<State<S>, ()> {
    Program::op(StateOp::put(state))
}

/// Replace the state with `f` of the current state: a `get` followed by a `put`.
pub fn modify<S, M>(f: M) -> Program<State<S>, ()>
where
    S: Clone + 'static,
    M: Fn(S) -> S + 'static,
{
    get().bind(move |state| put(f(state)))
}

/// Read a projection of the state.
pub fn gets<S, A, M>(f: M) -> Program<State<S>, A>
where
    S: Clone + 'static,
    A: 'static,
    M: Fn(&S) -> A + 'static,
{
    get().map(move |state: S| f(&state))
}

/// Compute a value and the next state from the current state.
pub fn state<S, A, M>(f: M) -> Program<State<S>, A>
where
    S: Clone + 'static,
    A: 'static,
    M: Fn(S) -> (A, S) + 'static,
{
    get().bind(move |current| {
        let (value, next) = f(current);
        Program::op(StateOp::Put(next, value))
    })
}

/// Run from `initial`, returning the value and the final state.
pub fn run_state<S, A>(program: Program<State<S>, A>, initial: S) -> (A, S)
where
    S: Clone + 'static,
    A: 'static,
{
    StateHandler::new().handle(program).run(initial)
}

/// Run from `initial`, keeping only the value.
pub fn eval_state<S, A>(program: Program<State<S>, A>, initial: S) -> A
where
    S: Clone + 'static,
    A: 'static,
{
    run_state(program, initial).0
}

/// Run from `initial`, keeping only the final state.
pub fn exec_state<S, A>(program: Program<State<S>, A>, initial: S) -> S
where
    S: Clone + 'static,
    A: 'static,
{
    run_state(program, initial).1
}
