// Reader effect: `ask` for a read-only environment.

use std::marker::PhantomData;
use std::rc::Rc;

use crate::handler::Handler;
use crate::monad::{ReaderFn, Reading};
use crate::program::{Program, Resumed, Signature};

/// Signature of the Reader effect over environment `R`.
pub struct Reader<R>(PhantomData<fn() -> R>);

/// Operations of [`Reader`].
pub enum ReaderOp<R, K> {
    /// Read the environment.
    Ask(Rc<dyn Fn(R) -> K>),
}

impl<R: 'static> ReaderOp<R, R> {
    /// `ask`, yielding the environment.
    pub fn ask() -> Self {
        ReaderOp::Ask(Rc::new(|env| env))
    }
}

impl<R, K> Clone for ReaderOp<R, K> {
    fn clone(&self) -> Self {
        match self {
            ReaderOp::Ask(k) => ReaderOp::Ask(Rc::clone(k)),
        }
    }
}

impl<R: Clone + 'static> Signature for Reader<R> {
    const NAME: &'static str = "Reader";

    type Op<K: 'static> = ReaderOp<R, K>;

    fn map_op<K, L, M>(op: ReaderOp<R, K>, f: M) -> ReaderOp<R, L>
    where
        K: 'static,
        L: 'static,
        M: Fn(K) -> L + 'static,
    {
        match op {
            ReaderOp::Ask(k) => ReaderOp::Ask(Rc::new(move |env| f(k(env)))),
        }
    }

    fn op_name<K: 'static>(_op: &ReaderOp<R, K>) -> &'static str {
        "ask"
    }
}

/// Canonical handler: Reader into `R -> A`.
pub struct ReaderHandler<R>(PhantomData<fn() -> R>);

impl<R> ReaderHandler<R> {
    /// Create the handler.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<R> Default for ReaderHandler<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for ReaderHandler<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for ReaderHandler<R> {}

impl<R: Clone + 'static> Handler<Reader<R>> for ReaderHandler<R> {
    type Target = ReaderFn<R>;

    fn handle_op<K: 'static>(&self, op: ReaderOp<R, K>) -> Reading<R, K> {
        match op {
            ReaderOp::Ask(k) => Reading::new(move |env| k(env)),
        }
    }
}

/// Read the environment.
pub fn ask<R: Clone + 'static>() -> Program<Reader<R>, R> {
    Program::op(ReaderOp::ask())
}

/// Read a projection of the environment.
pub fn asks<R, A, M>(f: M) -> Program<Reader<R>, A>
where
    R: Clone + 'static,
    A: 'static,
    M: Fn(&R) -> A + 'static,
{
    ask().map(move |env: R| f(&env))
}

/// Run `program` with the environment replaced by `f` of the outer one.
pub fn local<R, A, M>(f: M, program: Program<Reader<R>, A>) -> Program<Reader<R>, A>
where
    R: Clone + 'static,
    A: 'static,
    M: Fn(R) -> R + 'static,
{
    local_shared(Rc::new(f), program)
}

fn local_shared<R, A>(
    f: Rc<dyn Fn(R) -> R>,
    program: Program<Reader<R>, A>,
) -> Program<Reader<R>, A>
where
    R: Clone + 'static,
    A: 'static,
{
    Program::defer(move || match program.resume() {
        Resumed::Done(value) => Program::pure(value),
        Resumed::Step(ReaderOp::Ask(k)) => Program::step(ReaderOp::Ask(Rc::new(move |env| {
            local_shared(Rc::clone(&f), k(f(env)))
        }))),
    })
}

/// Run with environment `env`.
pub fn run_reader<R, A>(program: Program<Reader<R>, A>, env: R) -> A
where
    R: Clone + 'static,
    A: 'static,
{
    ReaderHandler::new().handle(program).run(env)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_returns_the_environment() {
        assert_eq!(run_reader(ask(), 42u8), 42);
    }

    #[test]
    fn asks_projects() {
        let program = asks(|env: &String| env.to_uppercase());
        assert_eq!(run_reader(program, "abc".to_string()), "ABC");
    }

    #[test]
    fn local_only_affects_its_sub_program() {
        let program = local(|n: i32| n * 100, ask())
            .bind(|inner| ask().map(move |outer: i32| (inner, outer)));
        assert_eq!(run_reader(program, 3), (300, 3));
    }

    #[test]
    fn nested_local_composes() {
        let program = local(|n: i32| n + 1, local(|n: i32| n * 2, ask()));
        assert_eq!(run_reader(program, 5), 12);
    }
}
