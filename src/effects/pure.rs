// The empty signature: programs with no operations at all.

use std::convert::Infallible;
use std::marker::PhantomData;

use crate::handler::Handler;
use crate::monad::Identity;
use crate::program::{Program, Resumed, Signature};

/// Signature with no operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pure;

/// An operation of [`Pure`]. Uninhabited.
pub struct Never<K>(Infallible, PhantomData<fn() -> K>);

impl<K> Never<K> {
    /// Eliminate the impossible operation.
    pub fn absurd<T>(&self) -> T {
        match self.0 {}
    }
}

impl Signature for Pure {
    const NAME: &'static str = "Pure";

    type Op<K: 'static> = Never<K>;

    fn map_op<K, L, M>(op: Never<K>, _f: M) -> Never<L>
    where
        K: 'static,
        L: 'static,
        M: Fn(K) -> L + 'static,
    {
        op.absurd()
    }

    fn op_name<K: 'static>(op: &Never<K>) -> &'static str {
        op.absurd()
    }
}

/// Handler of [`Pure`] into [`Identity`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PureHandler;

impl Handler<Pure> for PureHandler {
    type Target = Identity;

    fn handle_op<K: 'static>(&self, op: Never<K>) -> K {
        op.absurd()
    }
}

/// Extract the value of an operation-free program.
pub fn run_pure<A: 'static>(program: Program<Pure, A>) -> A {
    match program.resume() {
        Resumed::Done(value) => value,
        Resumed::Step(op) => op.absurd(),
    }
}
