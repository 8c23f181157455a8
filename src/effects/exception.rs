// Exception effect: `throw` aborts the rest of the program; `catch` recovers.

use std::marker::PhantomData;
use std::rc::Rc;

use crate::handler::Handler;
use crate::monad::Either;
use crate::program::{Program, Resumed, Signature};

/// Signature of the Exception effect over error `E`.
pub struct Exception<E>(PhantomData<fn() -> E>);

/// The only operation of [`Exception`]. It has no continuation: whatever
/// follows a throw is never run.
pub struct Throw<E, K> {
    error: E,
    _resume: PhantomData<fn() -> K>,
}

impl<E, K> Throw<E, K> {
    /// `throw`, yielding any type.
    pub fn new(error: E) -> Self {
        Self {
            error,
            _resume: PhantomData,
        }
    }

    /// The error being thrown.
    pub fn error(&self) -> &E {
        &self.error
    }

    /// Take the error out.
    pub fn into_error(self) -> E {
        self.error
    }
}

impl<E: Clone, K> Clone for Throw<E, K> {
    fn clone(&self) -> Self {
        Self::new(self.error.clone())
    }
}

impl<E: 'static> Signature for Exception<E> {
    const NAME: &'static str = "Exception";

    type Op<K: 'static> = Throw<E, K>;

    fn map_op<K, L, M>(op: Throw<E, K>, _f: M) -> Throw<E, L>
    where
        K: 'static,
        L: 'static,
        M: Fn(K) -> L + 'static,
    {
        Throw::new(op.error)
    }

    fn op_name<K: 'static>(_op: &Throw<E, K>) -> &'static str {
        "throw"
    }
}

/// Signatures that contain the Exception effect for `E`.
///
/// Implemented for `Exception<E>` and for `Sum<Exception<E>, G>`: in a sum,
/// Exception must be the left component. A second impl for
/// `Sum<G, Exception<E>>` would overlap with the first when `G` is
/// `Exception<E>`, so put Exception on the left and nest other effects on the
/// right, as in `Sum<Exception<E>, Sum<State<S>, Reader<R>>>`.
pub trait Throws<E: 'static>: Signature {
    /// Build a throw in this signature.
    fn throw_op<K: 'static>(error: E) -> Self::Op<K>;

    /// Split a throw from every other operation.
    fn as_throw<K: 'static>(op: Self::Op<K>) -> Result<E, Self::Op<K>>;
}

impl<E: 'static> Throws<E> for Exception<E> {
    fn throw_op<K: 'static>(error: E) -> Throw<E, K> {
        Throw::new(error)
    }

    fn as_throw<K: 'static>(op: Throw<E, K>) -> Result<E, Throw<E, K>> {
        Ok(op.into_error())
    }
}

/// Canonical handler: Exception into `Result<A, E>`.
pub struct ExceptionHandler<E>(PhantomData<fn() -> E>);

impl<E> ExceptionHandler<E> {
    /// Create the handler.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E> Default for ExceptionHandler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for ExceptionHandler<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for ExceptionHandler<E> {}

impl<E: 'static> Handler<Exception<E>> for ExceptionHandler<E> {
    type Target = Either<E>;

    fn handle_op<K: 'static>(&self, op: Throw<E, K>) -> Result<K, E> {
        Err(op.into_error())
    }
}

/// Abort with `error`.
pub fn throw<E: 'static, A: 'static>(error: E) -> Program<Exception<E>, A> {
    raise(error)
}

/// Abort with `error` in any signature containing Exception.
pub fn raise<F, E, A>(error: E) -> Program<F, A>
where
    F: Throws<E>,
    E: 'static,
    A: 'static,
{
    Program::step(F::throw_op(error))
}

/// Lift a `Result`: `Ok` returns, `Err` throws.
pub fn from_result<E: 'static, A: 'static>(result: Result<A, E>) -> Program<Exception<E>, A> {
    match result {
        Ok(value) => Program::pure(value),
        Err(error) => throw(error),
    }
}

/// Run `program`; if it throws, continue with `handler` applied to the error.
///
/// The handler takes over at the point of the throw. Operations of other
/// effects performed before the throw are kept.
pub fn catch<F, E, A, H>(program: Program<F, A>, handler: H) -> Program<F, A>
where
    F: Throws<E>,
    E: 'static,
    A: 'static,
    H: Fn(E) -> Program<F, A> + 'static,
{
    catch_shared(program, Rc::new(handler))
}

fn catch_shared<F, E, A>(
    program: Program<F, A>,
    handler: Rc<dyn Fn(E) -> Program<F, A>>,
) -> Program<F, A>
where
    F: Throws<E>,
    E: 'static,
    A: 'static,
{
    Program::defer(move || match program.resume() {
        Resumed::Done(value) => Program::pure(value),
        Resumed::Step(op) => match F::as_throw(op) {
            Ok(error) => handler(error),
            Err(op) => Program::step(F::map_op(op, move |rest: Program<F, A>| {
                catch_shared(rest, Rc::clone(&handler))
            })),
        },
    })
}

/// Run, returning the value or the error that aborted the program.
pub fn run_exception<E: 'static, A: 'static>(program: Program<Exception<E>, A>) -> Result<A, E> {
    ExceptionHandler::new().handle(program)
}
