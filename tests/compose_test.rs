// Integration tests for composed signatures and middleware
//
// Recording handlers make the order in which component handlers run
// observable, which is part of the Product contract.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use anyhow::{ensure, Result};
use common::{build_guarded, ExceptionStep, Guarded};
use freehand::compose::{self, lift_handler, product, sum, Sum};
use freehand::effects::exception::{self, Exception, ExceptionHandler};
use freehand::effects::reader::{self, Reader, ReaderHandler, ReaderOp};
use freehand::effects::state::{self, State, StateHandler, StateOp};
use freehand::effects::writer::{self, Writer, WriterHandler, WriterOp};
use freehand::fusion::{fuse, AskState, LiftError, LiftState, LogInto, Morphism};
use freehand::laws;
use freehand::middleware::{EventLog, Metrics, RecordedEvent, Recording, Trace};
use freehand::monad::StatefulResult;
use freehand::{Handler, Program};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn event(effect: &'static str, op: &'static str) -> RecordedEvent {
    RecordedEvent { effect, op }
}

type Log = Writer<String>;
type Cell = State<String>;

#[test]
fn product_runs_first_handler_first() {
    let log = EventLog::default();
    let handler = compose::product(
        Recording::with_log(fuse(WriterHandler::<String>::new(), LogInto::<String>::new()), log.clone()),
        Recording::with_log(StateHandler::<String>::new(), log.clone()),
    );
    let program = product::both::<Log, Cell, _, _>(WriterOp::tell("w".to_string()), StateOp::get());
    let ((), seen) = handler.handle(program).eval(">".to_string());

    // The state side observes the writer's output already appended.
    assert_eq!(seen, ">w");
    let events = log.lock().unwrap().clone();
    assert_eq!(events, vec![event("Writer", "tell"), event("State", "get")]);
}

#[test]
fn product_of_writers_orders_output() {
    let handler =
        compose::product(WriterHandler::<Vec<u8>>::new(), WriterHandler::<Vec<u8>>::new());
    let program = Program::for_each(0..3u8, |n| {
        product::both::<Writer<Vec<u8>>, Writer<Vec<u8>>, _, _>(
            WriterOp::tell(vec![n]),
            WriterOp::tell(vec![n + 10]),
        )
        .void()
    });
    assert_eq!(handler.handle(program), ((), vec![0, 10, 1, 11, 2, 12]));
}

#[test]
fn sum_dispatches_and_records_each_side() {
    let recorded = Recording::new(compose::sum(
        fuse(ReaderHandler::<String>::new(), AskState::<String>::new()),
        StateHandler::<String>::new(),
    ));
    let program = reader::ask::<String>()
        .embed_left::<Cell>()
        .bind(|env| state::put(env + "!").embed_right::<Reader<String>>())
        .then(|| reader::asks(|env: &String| env.len()).embed_left());
    assert_eq!(recorded.handle(program).run("hi".to_string()), (3, "hi!".to_string()));
    assert_eq!(
        recorded.events(),
        vec![event("Reader", "ask"), event("State", "put"), event("Reader", "ask")]
    );
}

#[test]
fn lifted_handlers_share_a_target() -> Result<()> {
    let handler: sum::SumHandler<_, _> = compose::sum(
        lift_handler(ExceptionHandler::<String>::new(), LiftError::<i64, String>::new()),
        lift_handler(StateHandler::<i64>::new(), LiftState::<i64, String>::new()),
    );
    let program: Program<Sum<Exception<String>, State<i64>>, i64> = state::get::<i64>()
        .embed_right()
        .bind(|balance| {
            if balance < 100 {
                exception::raise(format!("balance {balance} too low"))
            } else {
                state::put(balance - 100).embed_right().then(|| state::get().embed_right())
            }
        });
    ensure!(handler.handle(program).run(250) == Ok((150, 150)));

    let overdrawn: Program<Sum<Exception<String>, State<i64>>, i64> =
        state::get::<i64>().embed_right().bind(|balance| {
            if balance < 100 {
                exception::raise(format!("balance {balance} too low"))
            } else {
                Program::pure(balance)
            }
        });
    ensure!(handler.handle(overdrawn).run(20) == Err("balance 20 too low".to_string()));
    Ok(())
}

#[test]
fn fusion_law_holds_through_lifting() -> Result<()> {
    let script = vec![
        ExceptionStep::Add(3),
        ExceptionStep::Add(-1),
        ExceptionStep::Throw("stop".to_string()),
        ExceptionStep::Add(40),
    ];
    laws::fusion(
        &ExceptionHandler::<String>::new(),
        &LiftError::<i32, String>::new(),
        || {
            exception::from_result::<String, i32>(Ok(2)).bind(|x| {
                exception::catch(exception::throw(x.to_string()), |e: String| {
                    Program::pure(e.len() as i32)
                })
            })
        },
        |m: StatefulResult<i32, String, i32>| m.run(0),
    )?;

    let handler = compose::sum(
        lift_handler(ExceptionHandler::<String>::new(), LiftError::<i32, String>::new()),
        lift_handler(StateHandler::<i32>::new(), LiftState::<i32, String>::new()),
    );
    // The state reached before the throw is discarded with it.
    ensure!(handler.handle(build_guarded(&script)).run(0) == Err("stop".to_string()));
    let caught: Program<Guarded, i32> =
        exception::catch(build_guarded(&script), |_: String| state::get().embed_right());
    ensure!(handler.handle(caught).run(0) == Ok((2, 2)));
    Ok(())
}

#[test]
fn middleware_stacks() {
    init_tracing();
    let metrics = Metrics::new(StateHandler::<u32>::new());
    let handler = Trace::with_prefix(Recording::new(metrics.clone()), "stack");
    let program = state::modify(|n: u32| n * 2).then(|| state::modify(|n: u32| n + 1)).then(state::get);
    assert_eq!(handler.handle(program).run(5), (11, 11));
    assert_eq!(handler.inner().events().len(), 5);
    assert_eq!(metrics.op_count(), 5);
    // `handle` on the outer layer drives the inner layers through `handle_op`.
    assert_eq!(metrics.program_count(), 0);
}

#[test]
fn writer_program_into_shared_state_cell() {
    let handler: Trace<_> = Trace::new(compose::sum(
        fuse(WriterHandler::<String>::new(), LogInto::<String>::new()),
        StateHandler::<String>::new(),
    ));
    let program = writer::tell("a".to_string())
        .embed_left::<Cell>()
        .then(|| state::put("reset".to_string()).embed_right::<Log>())
        .then(|| writer::tell("b".to_string()).embed_left::<Cell>());
    let final_state = handler.handle(program).exec(String::new());
    assert_eq!(final_state, "resetb");
}

#[test]
fn product_names_come_from_first_side() {
    let recorded = Recording::new(compose::product(
        StateHandler::<u8>::new(),
        fuse(ReaderHandler::<u8>::new(), AskState::<u8>::new()),
    ));
    let program = product::both::<State<u8>, Reader<u8>, _, _>(StateOp::put(4), ReaderOp::ask());
    let (((), env), state) = recorded.handle(program).run(1);
    assert_eq!((env, state), (4, 4));
    assert_eq!(recorded.events(), vec![event("State", "put")]);
}

type Nested = Sum<Exception<String>, Sum<State<i32>, Reader<i32>>>;

#[test]
fn catch_with_exception_outside_a_nested_sum() -> Result<()> {
    let handler = compose::sum(
        lift_handler(ExceptionHandler::<String>::new(), LiftError::<i32, String>::new()),
        compose::sum(
            lift_handler(StateHandler::<i32>::new(), LiftState::<i32, String>::new()),
            lift_handler(
                ReaderHandler::<i32>::new(),
                AskState::<i32>::new().then(LiftState::<i32, String>::new()),
            ),
        ),
    );
    let body: Program<Nested, i32> = reader::ask::<i32>()
        .embed_right::<State<i32>>()
        .embed_right::<Exception<String>>()
        .bind(|limit| {
            state::put(limit * 2)
                .embed_left::<Reader<i32>>()
                .embed_right()
                .then(|| exception::raise("over".to_string()))
        });
    let program = exception::catch(body, |e: String| {
        state::get::<i32>()
            .embed_left::<Reader<i32>>()
            .embed_right()
            .map(move |s: i32| s + e.len() as i32)
    });
    ensure!(handler.handle(program).run(5) == Ok((14, 10)));
    Ok(())
}
