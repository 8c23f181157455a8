// Composition of effect signatures
//
// `Sum` offers the operations of two signatures side by side; `Product` pairs
// one operation of each. Their handlers are built from one handler per side,
// which must agree on a target. `lift_handler` moves a handler to another
// target along a monad morphism so that they can.

pub mod product;
pub mod sum;

pub use product::{Product, ProductHandler, ProductOp};
pub use sum::{InjectLeft, InjectRight, Sum, SumHandler, SumOp};

use crate::fusion::{fuse, Fused};

/// Move `handler` to the target of `morphism`.
///
/// The result handles every operation as `handler` does and maps the outcome
/// through `morphism`, so it is a lawful handler whenever `morphism` is a
/// monad morphism.
pub fn lift_handler<H, T>(handler: H, morphism: T) -> Fused<H, T> {
    fuse(handler, morphism)
}

/// Handler of `Sum<F, G>` from one handler per side.
pub fn sum<HF, HG>(left: HF, right: HG) -> SumHandler<HF, HG> {
    SumHandler::new(left, right)
}

/// Handler of `Product<F, G>` from one handler per side; `first` runs first.
pub fn product<HF, HG>(first: HF, second: HG) -> ProductHandler<HF, HG> {
    ProductHandler::new(first, second)
}
