// Free programs over an effect signature
//
// A program is a tree of primitive operations and continuations. Nothing here
// inspects what an operation means; `bind` only rewires continuation slots, so
// the monad laws hold for every signature.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

/// The primitive operations of one effect vocabulary.
///
/// `Op<K>` is the signature applied to a continuation slot: each variant carries
/// the operation's arguments and a `K` (or a function producing `K` from the
/// operation's result). An operation "yielding `R`" is an `Op<R>` whose slot is
/// the identity.
pub trait Signature: 'static {
    /// Name of the vocabulary, used for logging and recording.
    const NAME: &'static str;

    /// One operation with its continuation slot holding `K`.
    type Op<K: 'static>: 'static;

    /// Map over the continuation slot. This is the covariance requirement on
    /// signatures; implementations must not reorder or duplicate arguments.
    fn map_op<K, L, M>(op: Self::Op<K>, f: M) -> Self::Op<L>
    where
        K: 'static,
        L: 'static,
        M: Fn(K) -> L + 'static;

    /// Name of the operation, e.g. `"get"`.
    fn op_name<K: 'static>(op: &Self::Op<K>) -> &'static str;

    /// Name of the vocabulary `op` comes from. Composite signatures report the
    /// component's name.
    fn effect_name<K: 'static>(_op: &Self::Op<K>) -> &'static str {
        Self::NAME
    }
}

/// A natural transformation between two signatures.
pub trait Transform<F: Signature, G: Signature>: Clone + 'static {
    /// Rewrite one operation, keeping its continuation slot.
    fn transform<K: 'static>(&self, op: F::Op<K>) -> G::Op<K>;
}

/// A value whose type is known only to the continuation that receives it.
type Erased = Box<dyn Any>;

/// A continuation over erased values.
type Kont<F> = Rc<dyn Fn(Erased) -> Free<F>>;

/// An effectful computation over signature `F` producing an `A`.
///
/// Programs are owned values consumed by interpretation. To run the same
/// computation twice, build it twice; continuations are pure, so both runs
/// observe the same result.
pub struct Program<F: Signature, A: 'static> {
    free: Free<F>,
    marker: PhantomData<fn() -> A>,
}

// The untyped tree behind `Program`. A `Program<F, A>` only ever wraps a tree
// whose result is an `A`, and every continuation is built by `bind` for the
// type its program produces, so erased values always have the expected type.
enum Free<F: Signature> {
    Done(Erased),
    Step(Box<F::Op<Free<F>>>),
    /// Remainder built on demand; forced by `resume`.
    Defer(Box<dyn FnOnce() -> Free<F>>),
    /// `inner` followed by `kont`. Left-nested binds are reassociated by
    /// `resume`, one node at a time.
    Bind(Box<Free<F>>, Kont<F>),
}

enum Forced<F: Signature> {
    Done(Erased),
    Step(F::Op<Free<F>>),
}

impl<F: Signature> Free<F> {
    // Loops until the tree is done or blocked on an operation. Each iteration
    // does constant work and no iteration recurses into the tree, so neither
    // the depth nor the nesting direction of binds grows the stack.
    fn force(self) -> Forced<F> {
        let mut free = self;
        loop {
            free = match free {
                Free::Done(value) => return Forced::Done(value),
                Free::Step(op) => return Forced::Step(*op),
                Free::Defer(thunk) => thunk(),
                Free::Bind(inner, kont) => match *inner {
                    Free::Done(value) => kont(value),
                    Free::Step(op) => {
                        return Forced::Step(F::map_op(*op, move |rest: Free<F>| {
                            Free::Bind(Box::new(rest), Rc::clone(&kont))
                        }))
                    }
                    Free::Defer(thunk) => Free::Bind(Box::new(thunk()), kont),
                    // (m >>= f) >>= g  ~>  m >>= (x -> f(x) >>= g)
                    Free::Bind(innermost, first) => Free::Bind(
                        innermost,
                        Rc::new(move |value: Erased| {
                            Free::Bind(Box::new(first(value)), Rc::clone(&kont))
                        }),
                    ),
                },
            }
        }
    }
}

fn unerase<A: 'static>(value: Erased) -> A {
    match value.downcast::<A>() {
        Ok(value) => *value,
        Err(_) => unreachable!("continuation received a value of another type"),
    }
}

/// The observable shape of a program after pending work has been forced.
pub enum Resumed<F: Signature, A: 'static> {
    /// Finished with a value.
    Done(A),
    /// One operation whose continuation slot holds the rest of the program.
    Step(F::Op<Program<F, A>>),
}

impl<F: Signature, A: 'static> Program<F, A> {
    fn from_free(free: Free<F>) -> Self {
        Self {
            free,
            marker: PhantomData,
        }
    }

    /// Wrap a value as a finished program.
    pub fn pure(value: A) -> Self {
        Self::from_free(Free::Done(Box::new(value)))
    }

    /// Build an unfinished program from an operation whose continuation slot
    /// already holds the rest of the program.
    pub fn step(op: F::Op<Program<F, A>>) -> Self {
        let op = F::map_op(op, |rest: Program<F, A>| rest.free);
        Self::from_free(Free::Step(Box::new(op)))
    }

    /// Delay building a program until an interpreter reaches it.
    pub fn defer<T>(thunk: T) -> Self
    where
        T: FnOnce() -> Program<F, A> + 'static,
    {
        Self::from_free(Free::Defer(Box::new(move || thunk().free)))
    }

    /// Lift a single operation into a one-step program that returns its result.
    pub fn op(fx: F::Op<A>) -> Self {
        let op = F::map_op(fx, |value: A| Free::Done(Box::new(value)));
        Self::from_free(Free::Step(Box::new(op)))
    }

    /// `true` if the program is already `Done`, without forcing deferred work.
    pub fn is_done(&self) -> bool {
        matches!(self.free, Free::Done(_))
    }

    /// Force deferred work until the program is either done or blocked on an
    /// operation. Runs in constant stack however the program's binds nest.
    pub fn resume(self) -> Resumed<F, A> {
        match self.free.force() {
            Forced::Done(value) => Resumed::Done(unerase(value)),
            Forced::Step(op) => Resumed::Step(F::map_op(op, Program::from_free)),
        }
    }

    /// Sequence `f` after this program.
    ///
    /// `f` may be called more than once when an interpreter explores several
    /// branches (nondeterminism), so it is `Fn`. Binding never walks the
    /// program: it adds one node, whichever way the chain nests.
    pub fn bind<B, K>(self, f: K) -> Program<F, B>
    where
        B: 'static,
        K: Fn(A) -> Program<F, B> + 'static,
    {
        match self.free {
            Free::Done(value) => f(unerase(value)),
            free => {
                let kont: Kont<F> = Rc::new(move |value: Erased| f(unerase(value)).free);
                Program::from_free(Free::Bind(Box::new(free), kont))
            }
        }
    }

    /// Apply `f` to the result.
    pub fn map<B, M>(self, f: M) -> Program<F, B>
    where
        B: 'static,
        M: Fn(A) -> B + 'static,
    {
        self.bind(move |value| Program::pure(f(value)))
    }

    /// Run this program, discard its result, then run the program built by `next`.
    pub fn then<B, N>(self, next: N) -> Program<F, B>
    where
        B: 'static,
        N: Fn() -> Program<F, B> + 'static,
    {
        self.bind(move |_| next())
    }

    /// Discard the result.
    pub fn void(self) -> Program<F, ()> {
        self.map(|_| ())
    }

    /// Rewrite every operation through a natural transformation. Lazy: each
    /// layer is rewritten when an interpreter reaches it.
    pub fn hoist<G, T>(self, nat: T) -> Program<G, A>
    where
        G: Signature,
        T: Transform<F, G>,
    {
        Program::defer(move || match self.resume() {
            Resumed::Done(value) => Program::pure(value),
            Resumed::Step(op) => {
                let inner = nat.clone();
                let op = F::map_op(op, move |rest: Program<F, A>| rest.hoist(inner.clone()));
                Program::step(nat.transform(op))
            }
        })
    }

    /// Thread an accumulator through `f` for every item, left to right.
    ///
    /// The chain is built right-nested, so long inputs do not grow the stack.
    pub fn fold<T, I, M>(items: I, init: A, f: M) -> Self
    where
        T: Clone + 'static,
        I: IntoIterator<Item = T>,
        M: Fn(A, T) -> Program<F, A> + 'static,
    {
        let items: Rc<[T]> = items.into_iter().collect();
        fold_from(items, 0, init, Rc::new(f))
    }

    /// Run `f` for every item, left to right, collecting the results.
    pub fn traverse<T, I, M>(items: I, f: M) -> Program<F, Vec<A>>
    where
        A: Clone,
        T: Clone + 'static,
        I: IntoIterator<Item = T>,
        M: Fn(T) -> Program<F, A> + 'static,
    {
        Program::fold(items, Collected::empty(), move |collected: Collected<A>, item| {
            f(item).map(move |value| collected.push(value))
        })
        .map(|collected| collected.to_vec())
    }

    /// Run the program built by `f` `count` times.
    pub fn replicate<M>(count: usize, f: M) -> Program<F, Vec<A>>
    where
        A: Clone,
        M: Fn() -> Program<F, A> + 'static,
    {
        Self::traverse(0..count, move |_| f())
    }
}

impl<F: Signature> Program<F, ()> {
    /// Run `f` for every item, left to right.
    pub fn for_each<T, I, M>(items: I, f: M) -> Self
    where
        T: Clone + 'static,
        I: IntoIterator<Item = T>,
        M: Fn(T) -> Program<F, ()> + 'static,
    {
        Self::fold(items, (), move |(), item| f(item))
    }
}

fn fold_from<F, A, T>(
    items: Rc<[T]>,
    index: usize,
    acc: A,
    f: Rc<dyn Fn(A, T) -> Program<F, A>>,
) -> Program<F, A>
where
    F: Signature,
    A: 'static,
    T: Clone + 'static,
{
    let Some(item) = items.get(index).cloned() else {
        return Program::pure(acc);
    };
    f(acc, item).bind(move |acc| {
        let items = Rc::clone(&items);
        let f = Rc::clone(&f);
        Program::defer(move || fold_from(items, index + 1, acc, f))
    })
}

/// Results gathered by `traverse`, newest first.
///
/// Continuations may run more than once, so pushing shares the tail instead
/// of copying it.
struct Collected<A> {
    newest: Option<Rc<Link<A>>>,
}

struct Link<A> {
    value: A,
    next: Option<Rc<Link<A>>>,
}

impl<A: Clone> Collected<A> {
    fn empty() -> Self {
        Self { newest: None }
    }

    fn push(&self, value: A) -> Self {
        Self {
            newest: Some(Rc::new(Link {
                value,
                next: self.newest.clone(),
            })),
        }
    }

    fn to_vec(&self) -> Vec<A> {
        let mut values = Vec::new();
        let mut link = self.newest.as_deref();
        while let Some(current) = link {
            values.push(current.value.clone());
            link = current.next.as_deref();
        }
        values.reverse();
        values
    }
}

// Unlink iteratively; the default drop recurses once per link.
impl<A> Drop for Link<A> {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(link) = next {
            next = match Rc::try_unwrap(link) {
                Ok(mut link) => link.next.take(),
                Err(_) => None,
            };
        }
    }
}

impl<F: Signature, A: fmt::Debug + 'static> fmt::Debug for Program<F, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.free {
            Free::Done(value) => match value.downcast_ref::<A>() {
                Some(value) => f.debug_tuple("Done").field(value).finish(),
                None => f.write_str("Done"),
            },
            Free::Step(op) => write!(f, "Step({}::{})", F::effect_name(&**op), F::op_name(&**op)),
            Free::Defer(_) => f.write_str("Deferred"),
            Free::Bind(..) => f.write_str("Bind"),
        }
    }
}
