// Effect handler abstraction
//
// A handler gives each primitive operation of a signature its meaning in a
// target monad. The fold over the program is derived from that per-operation
// interpretation, so every handler built this way preserves `pure` and `bind`
// whenever its target is a lawful monad.

use std::ops::ControlFlow;

use crate::monad::{Monad, Of};
use crate::program::{Program, Resumed, Signature};

/// Interprets programs over `F` into the target context `Self::Target`.
///
/// Implement [`Handler::handle_op`]; [`Handler::handle`] is the fold built from
/// it. Handlers are stateless values: any state lives in the target context.
pub trait Handler<F: Signature>: Clone + 'static {
    /// The monad programs are interpreted into.
    type Target: Monad;

    /// Meaning of one operation, generic over what its continuation slot holds.
    fn handle_op<K: 'static>(&self, op: F::Op<K>) -> Of<Self::Target, K>;

    /// Interpret a whole program.
    fn handle<A: 'static>(&self, program: Program<F, A>) -> Of<Self::Target, A> {
        drive(self, program)
    }
}

/// Interpret `program` with `handler`.
pub fn interpret<F, H, A>(handler: &H, program: Program<F, A>) -> Of<H::Target, A>
where
    F: Signature,
    H: Handler<F>,
    A: 'static,
{
    handler.handle(program)
}

/// The fold behind [`Handler::handle`]: `Done(x)` becomes `pure(x)`, and a step
/// becomes the operation's meaning followed by the rest of the program.
///
/// Runs through the target's `tail_rec`, so the stack does not grow with the
/// number of steps.
pub fn drive<F, H, A>(handler: &H, program: Program<F, A>) -> Of<H::Target, A>
where
    F: Signature,
    H: Handler<F>,
    A: 'static,
{
    let handler = handler.clone();
    <H::Target as Monad>::tail_rec(program, move |program: Program<F, A>| {
        match program.resume() {
            Resumed::Done(value) => <H::Target as Monad>::pure(ControlFlow::Break(value)),
            Resumed::Step(op) => {
                <H::Target as Monad>::map(handler.handle_op(op), ControlFlow::Continue)
            }
        }
    })
}

/// The same fold as [`drive`], written as direct structural recursion.
///
/// Stack depth grows with the program's length. Kept as the reference
/// semantics that `drive` is checked against.
pub fn fold<F, H, A>(handler: &H, program: Program<F, A>) -> Of<H::Target, A>
where
    F: Signature,
    H: Handler<F>,
    A: 'static,
{
    match program.resume() {
        Resumed::Done(value) => <H::Target as Monad>::pure(value),
        Resumed::Step(op) => {
            let rest = handler.clone();
            <H::Target as Monad>::bind(handler.handle_op(op), move |program| {
                fold(&rest, program)
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::state::{self, State, StateHandler};

    fn bump_twice() -> Program<State<i32>, i32> {
        state::modify(|s: i32| s + 1)
            .then(|| state::modify(|s: i32| s * 10))
            .then(state::get)
    }

    #[test]
    fn drive_and_fold_agree() {
        let handler = StateHandler::new();
        let driven = drive(&handler, bump_twice()).run(4);
        let folded = fold(&handler, bump_twice()).run(4);
        assert_eq!(driven, (50, 50));
        assert_eq!(driven, folded);
    }

    #[test]
    fn interpret_is_handle() {
        let handler = StateHandler::new();
        assert_eq!(interpret(&handler, bump_twice()).run(0), handler.handle(bump_twice()).run(0));
    }

    #[test]
    fn done_interprets_to_pure() {
        let handler = StateHandler::<i32>::new();
        assert_eq!(handler.handle(Program::pure("x")).run(9), ("x", 9));
    }
}
