// Product of two signatures: one operation performs an F operation and a G
// operation together and yields both results. F is always handled first.

use std::marker::PhantomData;
use std::rc::Rc;

use crate::handler::Handler;
use crate::monad::{Monad, Of};
use crate::program::{Program, Signature};

/// Signature whose operations pair an `F` operation with a `G` operation.
pub struct Product<F, G>(PhantomData<fn() -> (F, G)>);

/// An operation of [`Product`]: an `F` operation whose continuation slot holds
/// the `G` operation, whose own slot holds `K`.
pub struct ProductOp<F: Signature, G: Signature, K: 'static> {
    both: F::Op<G::Op<K>>,
}

impl<F: Signature, G: Signature, K: 'static> ProductOp<F, G, K> {
    // Only `both` and `map_op` build these: a public constructor would let the
    // `G` operation depend on the `F` result.
    pub(crate) fn new(both: F::Op<G::Op<K>>) -> Self {
        Self { both }
    }

    /// The nested operations, `F` outside.
    pub fn into_inner(self) -> F::Op<G::Op<K>> {
        self.both
    }
}

impl<F, G, K> Clone for ProductOp<F, G, K>
where
    F: Signature,
    G: Signature,
    K: 'static,
    F::Op<G::Op<K>>: Clone,
{
    fn clone(&self) -> Self {
        Self::new(self.both.clone())
    }
}

impl<F: Signature, G: Signature> Signature for Product<F, G> {
    const NAME: &'static str = "Product";

    type Op<K: 'static> = ProductOp<F, G, K>;

    fn map_op<K, L, M>(op: ProductOp<F, G, K>, f: M) -> ProductOp<F, G, L>
    where
        K: 'static,
        L: 'static,
        M: Fn(K) -> L + 'static,
    {
        let f = Rc::new(f);
        ProductOp::new(F::map_op(op.both, move |inner: G::Op<K>| {
            let f = Rc::clone(&f);
            G::map_op(inner, move |k| f(k))
        }))
    }

    fn op_name<K: 'static>(op: &ProductOp<F, G, K>) -> &'static str {
        F::op_name(&op.both)
    }

    fn effect_name<K: 'static>(op: &ProductOp<F, G, K>) -> &'static str {
        F::effect_name(&op.both)
    }
}

/// Perform `fx` and `gy` together, yielding both results.
///
/// `gy` is cloned once for every result `fx` yields.
pub fn both<F, G, X, Y>(fx: F::Op<X>, gy: G::Op<Y>) -> Program<Product<F, G>, (X, Y)>
where
    F: Signature,
    G: Signature,
    X: Clone + 'static,
    Y: 'static,
    G::Op<Y>: Clone,
{
    let paired = F::map_op(fx, move |x: X| G::map_op(gy.clone(), move |y| (x.clone(), y)));
    Program::op(ProductOp::new(paired))
}

/// Handler of `Product<F, G>`: runs `HF` on the outer operation, then `HG` on
/// the operation it yields. Both must share a target.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductHandler<HF, HG> {
    first: HF,
    second: HG,
}

impl<HF, HG> ProductHandler<HF, HG> {
    /// Combine two handlers; `first` handles the `F` side.
    pub fn new(first: HF, second: HG) -> Self {
        Self { first, second }
    }
}

impl<F, G, HF, HG> Handler<Product<F, G>> for ProductHandler<HF, HG>
where
    F: Signature,
    G: Signature,
    HF: Handler<F>,
    HG: Handler<G, Target = HF::Target>,
{
    type Target = HF::Target;

    fn handle_op<K: 'static>(&self, op: ProductOp<F, G, K>) -> Of<HF::Target, K> {
        let second = self.second.clone();
        <HF::Target as Monad>::bind(self.first.handle_op(op.both), move |inner| {
            second.handle_op(inner)
        })
    }
}
