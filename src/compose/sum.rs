// Sum of two signatures: each operation is either an F operation or a G
// operation, handled by dispatching to the matching component handler.

use std::marker::PhantomData;

use crate::effects::exception::{Exception, Throw, Throws};
use crate::handler::Handler;
use crate::monad::Of;
use crate::program::{Program, Signature, Transform};

/// Signature with the operations of `F` and of `G`.
pub struct Sum<F, G>(PhantomData<fn() -> (F, G)>);

/// An operation of [`Sum`].
pub enum SumOp<F: Signature, G: Signature, K: 'static> {
    /// An operation of `F`.
    Left(F::Op<K>),
    /// An operation of `G`.
    Right(G::Op<K>),
}

impl<F, G, K> Clone for SumOp<F, G, K>
where
    F: Signature,
    G: Signature,
    K: 'static,
    F::Op<K>: Clone,
    G::Op<K>: Clone,
{
    fn clone(&self) -> Self {
        match self {
            SumOp::Left(op) => SumOp::Left(op.clone()),
            SumOp::Right(op) => SumOp::Right(op.clone()),
        }
    }
}

impl<F: Signature, G: Signature> Signature for Sum<F, G> {
    const NAME: &'static str = "Sum";

    type Op<K: 'static> = SumOp<F, G, K>;

    fn map_op<K, L, M>(op: SumOp<F, G, K>, f: M) -> SumOp<F, G, L>
    where
        K: 'static,
        L: 'static,
        M: Fn(K) -> L + 'static,
    {
        match op {
            SumOp::Left(op) => SumOp::Left(F::map_op(op, f)),
            SumOp::Right(op) => SumOp::Right(G::map_op(op, f)),
        }
    }

    fn op_name<K: 'static>(op: &SumOp<F, G, K>) -> &'static str {
        match op {
            SumOp::Left(op) => F::op_name(op),
            SumOp::Right(op) => G::op_name(op),
        }
    }

    fn effect_name<K: 'static>(op: &SumOp<F, G, K>) -> &'static str {
        match op {
            SumOp::Left(op) => F::effect_name(op),
            SumOp::Right(op) => G::effect_name(op),
        }
    }
}

/// Embeds `F` as the left side of `Sum<F, G>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InjectLeft;

impl<F: Signature, G: Signature> Transform<F, Sum<F, G>> for InjectLeft {
    fn transform<K: 'static>(&self, op: F::Op<K>) -> SumOp<F, G, K> {
        SumOp::Left(op)
    }
}

/// Embeds `G` as the right side of `Sum<F, G>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InjectRight;

impl<F: Signature, G: Signature> Transform<G, Sum<F, G>> for InjectRight {
    fn transform<K: 'static>(&self, op: G::Op<K>) -> SumOp<F, G, K> {
        SumOp::Right(op)
    }
}

impl<F: Signature, A: 'static> Program<F, A> {
    /// View this program as the left side of a sum.
    pub fn embed_left<G: Signature>(self) -> Program<Sum<F, G>, A> {
        self.hoist(InjectLeft)
    }

    /// View this program as the right side of a sum.
    pub fn embed_right<E: Signature>(self) -> Program<Sum<E, F>, A> {
        self.hoist(InjectRight)
    }
}

/// Lift a single `F` operation into a sum.
pub fn left<F, G, A>(op: F::Op<A>) -> Program<Sum<F, G>, A>
where
    F: Signature,
    G: Signature,
    A: 'static,
{
    Program::op(SumOp::Left(op))
}

/// Lift a single `G` operation into a sum.
pub fn right<F, G, A>(op: G::Op<A>) -> Program<Sum<F, G>, A>
where
    F: Signature,
    G: Signature,
    A: 'static,
{
    Program::op(SumOp::Right(op))
}

impl<E: 'static, G: Signature> Throws<E> for Sum<Exception<E>, G> {
    fn throw_op<K: 'static>(error: E) -> SumOp<Exception<E>, G, K> {
        SumOp::Left(Throw::new(error))
    }

    fn as_throw<K: 'static>(op: SumOp<Exception<E>, G, K>) -> Result<E, SumOp<Exception<E>, G, K>> {
        match op {
            SumOp::Left(throw) => Ok(throw.into_error()),
            other => Err(other),
        }
    }
}

/// Handler of `Sum<F, G>` from a handler of each side. Both must share a
/// target; lift one of them with [`crate::compose::lift_handler`] first if
/// they do not.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumHandler<HF, HG> {
    left: HF,
    right: HG,
}

impl<HF, HG> SumHandler<HF, HG> {
    /// Combine two handlers.
    pub fn new(left: HF, right: HG) -> Self {
        Self { left, right }
    }
}

impl<F, G, HF, HG> Handler<Sum<F, G>> for SumHandler<HF, HG>
where
    F: Signature,
    G: Signature,
    HF: Handler<F>,
    HG: Handler<G, Target = HF::Target>,
{
    type Target = HF::Target;

    fn handle_op<K: 'static>(&self, op: SumOp<F, G, K>) -> Of<HF::Target, K> {
        match op {
            SumOp::Left(op) => self.left.handle_op(op),
            SumOp::Right(op) => self.right.handle_op(op),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::exception::{self, ExceptionHandler};
    use crate::effects::state::{self, State, StateHandler, StateOp};
    use crate::effects::writer::{self, Writer, WriterHandler, WriterOp};
    use crate::fusion::{fuse, LiftError, LiftState, LogInto};
    use crate::monad::{StateFn, StateOr};

    type Log = Writer<Vec<&'static str>>;
    type Counter = State<Vec<&'static str>>;

    fn log_then_count() -> impl Handler<Sum<Log, Counter>, Target = StateFn<Vec<&'static str>>> {
        SumHandler::new(
            fuse(WriterHandler::<Vec<&'static str>>::new(), LogInto::<Vec<&'static str>>::new()),
            StateHandler::<Vec<&'static str>>::new(),
        )
    }

    #[test]
    fn dispatches_each_side_to_its_handler() {
        // Writer output and State share `Vec<&str>` as the State's cell.
        let program = writer::tell(vec!["w"])
            .embed_left::<Counter>()
            .then(|| {
                state::modify(|mut s: Vec<&'static str>| {
                    s.push("s");
                    s
                })
                .embed_right::<Log>()
            })
            .then(|| right::<Log, Counter, _>(StateOp::get()));
        let handler = log_then_count();
        assert_eq!(handler.handle(program).run(vec![]), (vec!["w", "s"], vec!["w", "s"]));
    }

    #[test]
    fn raw_operations_inject_on_either_side() {
        let program = left::<Log, Counter, _>(WriterOp::tell(vec!["a"]))
            .then(|| right::<Log, Counter, _>(StateOp::put(vec!["b"])));
        let handler = log_then_count();
        assert_eq!(handler.handle(program).exec(vec!["x"]), vec!["b"]);
    }

    type Guarded = Sum<Exception<String>, State<u32>>;

    fn guarded_handler() -> impl Handler<Guarded, Target = StateOr<u32, String>> {
        SumHandler::new(
            fuse(ExceptionHandler::<String>::new(), LiftError::<u32, String>::new()),
            fuse(StateHandler::<u32>::new(), LiftState::<u32, String>::new()),
        )
    }

    fn bump_below(limit: u32) -> Program<Guarded, u32> {
        state::get::<u32>().embed_right().bind(move |n| {
            if n >= limit {
                exception::raise(format!("{n} reached {limit}"))
            } else {
                state::put(n + 1).embed_right().map(move |()| n + 1)
            }
        })
    }

    #[test]
    fn state_with_exception() {
        let handler = guarded_handler();
        assert_eq!(handler.handle(bump_below(10)).run(3), Ok((4, 4)));
        assert_eq!(handler.handle(bump_below(3)).run(3), Err("3 reached 3".to_string()));
    }

    #[test]
    fn catch_inside_a_sum_keeps_earlier_state() {
        let program = exception::catch(
            bump_below(5).then(|| bump_below(5)),
            |_: String| Program::pure(0),
        );
        assert_eq!(guarded_handler().handle(program).run(4), Ok((0, 5)));
    }

    #[test]
    fn names_come_from_the_component() {
        let op: SumOp<Log, Counter, ()> = SumOp::Right(StateOp::put(vec![]));
        assert_eq!(Sum::<Log, Counter>::op_name(&op), "put");
        assert_eq!(Sum::<Log, Counter>::effect_name(&op), "State");
    }
}
