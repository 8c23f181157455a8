// Nondeterministic choice: every branch is explored and every result kept, in
// left-to-right order.

use std::collections::HashSet;
use std::hash::Hash;
use std::rc::Rc;

use crate::handler::Handler;
use crate::monad::List;
use crate::program::{Program, Signature};

/// Signature of nondeterministic choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nondet;

/// Operations of [`Nondet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NondetOp<K> {
    /// Continue with both slots, left first.
    Choice(K, K),
    /// Fail this branch.
    Empty,
}

impl Signature for Nondet {
    const NAME: &'static str = "Nondet";

    type Op<K: 'static> = NondetOp<K>;

    fn map_op<K, L, M>(op: NondetOp<K>, f: M) -> NondetOp<L>
    where
        K: 'static,
        L: 'static,
        M: Fn(K) -> L + 'static,
    {
        match op {
            NondetOp::Choice(left, right) => NondetOp::Choice(f(left), f(right)),
            NondetOp::Empty => NondetOp::Empty,
        }
    }

    fn op_name<K: 'static>(op: &NondetOp<K>) -> &'static str {
        match op {
            NondetOp::Choice(..) => "choice",
            NondetOp::Empty => "empty",
        }
    }
}

/// Canonical handler: Nondet into the list of all results.
#[derive(Debug, Clone, Copy, Default)]
pub struct NondetHandler;

impl Handler<Nondet> for NondetHandler {
    type Target = List;

    fn handle_op<K: 'static>(&self, op: NondetOp<K>) -> Vec<K> {
        match op {
            NondetOp::Choice(left, right) => vec![left, right],
            NondetOp::Empty => Vec::new(),
        }
    }
}

/// Explore `left`, then `right`.
pub fn choice<A: 'static>(left: Program<Nondet, A>, right: Program<Nondet, A>) -> Program<Nondet, A> {
    Program::step(NondetOp::Choice(left, right))
}

/// A branch with no results.
pub fn empty<A: 'static>() -> Program<Nondet, A> {
    Program::step(NondetOp::Empty)
}

/// Yield `true`, then `false`.
pub fn choose() -> Program<Nondet, bool> {
    Program::op(NondetOp::Choice(true, false))
}

/// Yield each item in order; no items behaves as [`empty`].
pub fn select<A, I>(items: I) -> Program<Nondet, A>
where
    A: Clone + 'static,
    I: IntoIterator<Item = A>,
{
    select_from(items.into_iter().collect(), 0)
}

fn select_from<A: Clone + 'static>(items: Rc<[A]>, index: usize) -> Program<Nondet, A> {
    match items.get(index).cloned() {
        None => empty(),
        Some(item) if index + 1 == items.len() => Program::pure(item),
        Some(item) => choice(
            Program::pure(item),
            Program::defer(move || select_from(items, index + 1)),
        ),
    }
}

/// Continue only when `condition` holds.
pub fn guard(condition: bool) -> Program<Nondet, ()> {
    if condition {
        Program::pure(())
    } else {
        empty()
    }
}

/// Every result, in exploration order, duplicates kept.
pub fn run_nondet<A: 'static>(program: Program<Nondet, A>) -> Vec<A> {
    NondetHandler.handle(program)
}

/// Every distinct result, in order of first occurrence.
pub fn run_nondet_distinct<A>(program: Program<Nondet, A>) -> Vec<A>
where
    A: Eq + Hash + Clone + 'static,
{
    let mut seen = HashSet::new();
    run_nondet(program)
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
