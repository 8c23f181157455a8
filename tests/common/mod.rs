// Shared proptest strategies
//
// Programs are one-shot values, so strategies generate small scripts that can
// build the same program any number of times.

#![allow(dead_code)]

use freehand::compose::Sum;
use freehand::effects::exception::{self, Exception};
use freehand::effects::nondet::{self, Nondet};
use freehand::effects::state::{self, State};
use freehand::effects::writer::{self, Writer};
use freehand::Program;
use proptest::prelude::*;

pub type Counter = State<i32>;
pub type Log = Writer<Vec<i32>>;
pub type Failing = Exception<String>;
pub type Guarded = Sum<Exception<String>, State<i32>>;

/// One step of a State script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateStep {
    Get,
    Put(i32),
    Add(i32),
}

pub fn state_step() -> impl Strategy<Value = StateStep> {
    prop_oneof![
        Just(StateStep::Get),
        any::<i32>().prop_map(StateStep::Put),
        (-100..100i32).prop_map(StateStep::Add),
    ]
}

pub fn state_script() -> impl Strategy<Value = Vec<StateStep>> {
    prop::collection::vec(state_step(), 0..12)
}

/// Run the script, returning the sum of every value read.
pub fn build_state(script: &[StateStep]) -> Program<Counter, i32> {
    Program::fold(script.to_vec(), 0i32, |acc, step| match step {
        StateStep::Get => state::get().map(move |s: i32| acc.wrapping_add(s)),
        StateStep::Put(n) => state::put(n).map(move |()| acc),
        StateStep::Add(d) => state::modify(move |s: i32| s.wrapping_add(d)).map(move |()| acc),
    })
}

/// A continuation `i32 -> Program<Counter, i32>` described as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKont {
    Pure(i32),
    Store(i32),
    Scale(i32),
}

impl StateKont {
    pub fn apply(self, x: i32) -> Program<Counter, i32> {
        match self {
            StateKont::Pure(n) => Program::pure(x.wrapping_add(n)),
            StateKont::Store(n) => state::put(x.wrapping_sub(n)).then(state::get),
            StateKont::Scale(n) => state::gets(move |s: &i32| s.wrapping_mul(n).wrapping_add(x)),
        }
    }
}

pub fn state_kont() -> impl Strategy<Value = StateKont> {
    prop_oneof![
        (-50..50i32).prop_map(StateKont::Pure),
        (-50..50i32).prop_map(StateKont::Store),
        (-5..5i32).prop_map(StateKont::Scale),
    ]
}

pub fn writer_script() -> impl Strategy<Value = Vec<Vec<i32>>> {
    prop::collection::vec(prop::collection::vec(-9..9i32, 0..3), 0..10)
}

/// Tell every chunk, returning how many chunks were told.
pub fn build_writer(script: &[Vec<i32>]) -> Program<Log, usize> {
    Program::fold(script.to_vec(), 0usize, |count, chunk| {
        writer::tell(chunk).map(move |()| count + 1)
    })
}

/// A continuation `usize -> Program<Log, usize>` described as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterKont {
    Pure,
    Echo,
}

impl WriterKont {
    pub fn apply(self, n: usize) -> Program<Log, usize> {
        match self {
            WriterKont::Pure => Program::pure(n * 2),
            WriterKont::Echo => writer::tell(vec![n as i32]).map(move |()| n + 1),
        }
    }
}

pub fn writer_kont() -> impl Strategy<Value = WriterKont> {
    prop_oneof![Just(WriterKont::Pure), Just(WriterKont::Echo)]
}

/// One step of an Exception script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExceptionStep {
    Add(i32),
    Throw(String),
}

pub fn exception_script() -> impl Strategy<Value = Vec<ExceptionStep>> {
    let step = prop_oneof![
        4 => (-20..20i32).prop_map(ExceptionStep::Add),
        1 => "[a-z]{1,4}".prop_map(ExceptionStep::Throw),
    ];
    prop::collection::vec(step, 0..8)
}

pub fn build_exception(script: &[ExceptionStep]) -> Program<Failing, i32> {
    Program::fold(script.to_vec(), 0i32, |acc, step| match step {
        ExceptionStep::Add(n) => Program::pure(acc.wrapping_add(n)),
        ExceptionStep::Throw(error) => exception::throw(error),
    })
}

/// The same script over State and Exception combined: additions also go into
/// the state.
pub fn build_guarded(script: &[ExceptionStep]) -> Program<Guarded, i32> {
    Program::fold(script.to_vec(), 0i32, |acc, step| match step {
        ExceptionStep::Add(n) => state::modify(move |s: i32| s.wrapping_add(n))
            .embed_right()
            .map(move |()| acc.wrapping_add(n)),
        ExceptionStep::Throw(error) => exception::raise(error),
    })
}

/// A nondeterministic computation described as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree {
    Leaf(u8),
    Empty,
    Choice(Box<Tree>, Box<Tree>),
}

pub fn tree() -> impl Strategy<Value = Tree> {
    let leaf = prop_oneof![
        4 => any::<u8>().prop_map(Tree::Leaf),
        1 => Just(Tree::Empty),
    ];
    leaf.prop_recursive(4, 24, 2, |inner| {
        (inner.clone(), inner).prop_map(|(l, r)| Tree::Choice(Box::new(l), Box::new(r)))
    })
}

pub fn build_tree(tree: &Tree) -> Program<Nondet, u8> {
    match tree {
        Tree::Leaf(value) => Program::pure(*value),
        Tree::Empty => nondet::empty(),
        Tree::Choice(left, right) => nondet::choice(build_tree(left), build_tree(right)),
    }
}

/// Sorted results: equality up to multiset.
pub fn multiset(mut values: Vec<u8>) -> Vec<u8> {
    values.sort_unstable();
    values
}
