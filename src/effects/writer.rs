// Writer effect: `tell` appends to a monoid output in call order.

use std::marker::PhantomData;

use crate::handler::Handler;
use crate::monad::{Monoid, WriterOf};
use crate::program::{Program, Resumed, Signature};

/// Signature of the Writer effect over output `W`.
pub struct Writer<W>(PhantomData<fn() -> W>);

/// Operations of [`Writer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterOp<W, K> {
    /// Append to the output.
    Tell(W, K),
}

impl<W> WriterOp<W, ()> {
    /// `tell`, yielding `()`.
    pub fn tell(output: W) -> Self {
        WriterOp::Tell(output, ())
    }
}

impl<W: Monoid> Signature for Writer<W> {
    const NAME: &'static str = "Writer";

    type Op<K: 'static> = WriterOp<W, K>;

    fn map_op<K, L, M>(op: WriterOp<W, K>, f: M) -> WriterOp<W, L>
    where
        K: 'static,
        L: 'static,
        M: Fn(K) -> L + 'static,
    {
        match op {
            WriterOp::Tell(output, k) => WriterOp::Tell(output, f(k)),
        }
    }

    fn op_name<K: 'static>(_op: &WriterOp<W, K>) -> &'static str {
        "tell"
    }
}

/// Canonical handler: Writer into `(A, W)`.
pub struct WriterHandler<W>(PhantomData<fn() -> W>);

impl<W> WriterHandler<W> {
    /// Create the handler.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<W> Default for WriterHandler<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Clone for WriterHandler<W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W> Copy for WriterHandler<W> {}

impl<W: Monoid> Handler<Writer<W>> for WriterHandler<W> {
    type Target = WriterOf<W>;

    fn handle_op<K: 'static>(&self, op: WriterOp<W, K>) -> (K, W) {
        match op {
            WriterOp::Tell(output, k) => (k, output),
        }
    }
}

/// Append `output`.
pub fn tell<W: Monoid>(output: W) -> Program<Writer<W>, ()> {
    Program::op(WriterOp::tell(output))
}

/// Run `program`, passing its output through and also returning it alongside
/// the result.
pub fn listen<W, A>(program: Program<Writer<W>, A>) -> Program<Writer<W>, (A, W)>
where
    W: Monoid + Clone,
    A: 'static,
{
    listen_from(program, W::empty())
}

fn listen_from<W, A>(program: Program<Writer<W>, A>, heard: W) -> Program<Writer<W>, (A, W)>
where
    W: Monoid + Clone,
    A: 'static,
{
    Program::defer(move || match program.resume() {
        Resumed::Done(value) => Program::pure((value, heard)),
        Resumed::Step(WriterOp::Tell(output, rest)) => {
            let heard = heard.combine(output.clone());
            Program::step(WriterOp::Tell(output, listen_from(rest, heard)))
        }
    })
}

/// Run, returning the value and the combined output.
pub fn run_writer<W: Monoid, A: 'static>(program: Program<Writer<W>, A>) -> (A, W) {
    WriterHandler::new().handle(program)
}

/// Run, keeping only the combined output.
pub fn exec_writer<W: Monoid, A: 'static>(program: Program<Writer<W>, A>) -> W {
    run_writer(program).1
}
