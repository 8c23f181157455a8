// Standard effect library
//
// Each effect is a signature with its raw operations, a canonical handler into
// a small target monad, derived operations, and `run` entry points that
// discharge the target to a plain value.

pub mod exception;
pub mod nondet;
pub mod pure;
pub mod reader;
pub mod state;
pub mod writer;

pub use exception::{Exception, ExceptionHandler, Throw, Throws};
pub use nondet::{Nondet, NondetHandler, NondetOp};
pub use pure::{Never, Pure, PureHandler};
pub use reader::{Reader, ReaderHandler, ReaderOp};
pub use state::{State, StateHandler, StateOp};
pub use writer::{Writer, WriterHandler, WriterOp};
