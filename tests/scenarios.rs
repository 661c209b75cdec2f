//! Black-box scenarios exercising parse, execute, and suggest end to end.

use std::sync::{Arc, Mutex};

use command_dispatch::arguments::{ArgumentParseError, ArgumentType};
use command_dispatch::arguments::integer::IntegerArgumentType;
use command_dispatch::arguments::string::{GreedyStringArgumentType, StringArgumentType};
use command_dispatch::builder::{argument, literal, ArgumentBuilder};
use command_dispatch::context::CommandContext;
use command_dispatch::dispatcher::CommandDispatcher;
use command_dispatch::errors::BuiltInError;
use command_dispatch::reader::StringReader;
use command_dispatch::result_consumer::ResultConsumer;

/// Collects every `on_command_complete` notification for later assertions.
#[derive(Clone, Default)]
struct RecordingConsumer {
    calls: Arc<Mutex<Vec<(bool, i32)>>>,
}

impl ResultConsumer<i32> for RecordingConsumer {
    fn on_command_complete(&self, _context: &CommandContext<i32>, success: bool, result: i32) {
        self.calls.lock().unwrap().push((success, result));
    }
}

#[test]
fn simple_literal() {
    let mut dispatcher = CommandDispatcher::<()>::new();
    dispatcher.register(literal("foo").executes(|_ctx| Ok(42)));

    assert_eq!(dispatcher.execute("foo", ()).unwrap(), 42);
    assert_eq!(
        dispatcher.execute("fo", ()).unwrap_err().kind,
        BuiltInError::DispatcherUnknownCommand
    );
    assert_eq!(
        dispatcher.execute("foo bar", ()).unwrap_err().kind,
        BuiltInError::DispatcherUnknownArgument
    );
}

#[test]
fn nested_literal_with_bounded_int() {
    let mut dispatcher = CommandDispatcher::<()>::new();
    dispatcher.register(literal("kick").then(
        argument("id", IntegerArgumentType::bounded(0, 100))
            .executes(|ctx| Ok(*ctx.get::<i32>("id").unwrap())),
    ));

    assert_eq!(dispatcher.execute("kick 5", ()).unwrap(), 5);
    assert!(matches!(
        dispatcher.execute("kick 200", ()).unwrap_err().kind,
        BuiltInError::IntegerTooHigh { .. }
    ));
    assert_eq!(
        dispatcher.execute("kick abc", ()).unwrap_err().kind,
        BuiltInError::ReaderExpectedInt
    );
}

#[tokio::test]
async fn kick_argument_offers_no_suggestions_without_examples_hook() {
    let mut dispatcher = CommandDispatcher::<()>::new();
    dispatcher.register(
        literal("kick").then(argument("id", IntegerArgumentType::bounded(0, 100)).executes(|_ctx| Ok(0))),
    );

    let parse = dispatcher.parse("kick ", ());
    let suggestions = dispatcher.get_completion_suggestions(parse).await;
    assert!(suggestions.is_empty());
}

#[test]
fn greedy_string_consumes_everything_without_unquoting() {
    let mut dispatcher = CommandDispatcher::<()>::new();
    dispatcher.register(literal("say").then(
        argument("msg", GreedyStringArgumentType).executes(|ctx| {
            Ok(ctx.get::<String>("msg").unwrap().len() as i32)
        }),
    ));

    assert_eq!(dispatcher.execute("say hello world", ()).unwrap(), 11);
    assert_eq!(dispatcher.execute(r#"say "a\"b""#, ()).unwrap(), 6);
}

#[test]
fn quotable_phrase_unescapes_valid_sequences_and_rejects_invalid_ones() {
    let arg = StringArgumentType;

    let mut good = StringReader::new(r#""a\\b""#);
    let value = ArgumentType::<()>::parse(&arg, &mut good, &()).unwrap();
    assert_eq!(value, r"a\b");

    let mut bad = StringReader::new(r#""a\b""#);
    let ArgumentParseError::Syntax(err) = ArgumentType::<()>::parse(&arg, &mut bad, &()).unwrap_err() else {
        unreachable!("quoted-string parsing only raises syntax errors")
    };
    assert!(matches!(
        err.kind,
        BuiltInError::ReaderInvalidEscape { character: 'b' }
    ));
}

#[test]
fn redirection_runs_the_target_with_the_original_source() {
    let mut dispatcher = CommandDispatcher::<()>::new();
    dispatcher.register(literal("foo").executes(|_ctx| Ok(42)));
    let root = dispatcher.root().clone();
    dispatcher.register(literal("alias").redirect(root));

    assert_eq!(dispatcher.execute("alias foo", ()).unwrap(), 42);
}

#[test]
fn fork_with_modifier_runs_every_produced_source() {
    let mut dispatcher = CommandDispatcher::<i32>::new();
    dispatcher.register(literal("echo").executes(|_ctx| Ok(1)));
    let root = dispatcher.root().clone();
    dispatcher.register(literal("each").fork(
        root,
        Arc::new(|ctx| Ok(vec![*ctx.source(), *ctx.source()])),
    ));

    let consumer = RecordingConsumer::default();
    dispatcher.set_result_consumer(consumer.clone());

    assert_eq!(dispatcher.execute("each echo", 7).unwrap(), 2);
    assert_eq!(*consumer.calls.lock().unwrap(), vec![(true, 1), (true, 1)]);
}

#[tokio::test]
async fn suggestions_merge_siblings_into_one_expanded_range() {
    let mut dispatcher = CommandDispatcher::<()>::new();
    dispatcher.register(literal("foo").executes(|_ctx| Ok(0)));
    dispatcher.register(literal("foobar").executes(|_ctx| Ok(0)));
    dispatcher.register(literal("bar").executes(|_ctx| Ok(0)));

    let parse = dispatcher.parse("f", ());
    let suggestions = dispatcher.get_completion_suggestions(parse).await;

    let texts: Vec<&str> = suggestions.list.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["foo", "foobar"]);
    assert_eq!(suggestions.range, command_dispatch::range::StringRange::new(0, 1));
}
