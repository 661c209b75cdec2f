//! A reusable command-tree parser and dispatcher for textual command
//! interfaces.
//!
//! Build a tree of literal keywords and typed arguments with
//! [`builder::literal`]/[`builder::argument`], register it on a
//! [`dispatcher::CommandDispatcher`], and hand it strings to execute or
//! complete. The dispatcher is generic over a source type `S` — the
//! principal a command runs as — threaded through every requirement
//! predicate, handler, and redirect modifier.
//!
//! ```
//! use command_dispatch::builder::{argument, literal, ArgumentBuilder};
//! use command_dispatch::dispatcher::CommandDispatcher;
//! use command_dispatch::arguments::integer::IntegerArgumentType;
//!
//! let mut dispatcher = CommandDispatcher::<()>::new();
//! dispatcher.register(
//!     literal("kick").then(
//!         argument("id", IntegerArgumentType::bounded(0, 100))
//!             .executes(|ctx| Ok(*ctx.get::<i32>("id").unwrap())),
//!     ),
//! );
//! assert_eq!(dispatcher.execute("kick 5", ()).unwrap(), 5);
//! ```

pub mod arguments;
pub mod builder;
pub mod context;
pub mod dispatcher;
pub mod errors;
pub mod parse_results;
pub mod range;
pub mod reader;
pub mod result_consumer;
pub mod suggestion;
pub mod tree;

/// The common entry points, in one `use`.
pub mod prelude {
    pub use crate::arguments::boolean::BoolArgumentType;
    pub use crate::arguments::double::DoubleArgumentType;
    pub use crate::arguments::float::FloatArgumentType;
    pub use crate::arguments::integer::IntegerArgumentType;
    pub use crate::arguments::long::LongArgumentType;
    pub use crate::arguments::string::{GreedyStringArgumentType, StringArgumentType, WordArgumentType};
    pub use crate::arguments::{ArgumentParseError, ArgumentType};
    pub use crate::builder::{argument, literal, ArgumentBuilder};
    pub use crate::context::CommandContext;
    pub use crate::dispatcher::CommandDispatcher;
    pub use crate::errors::{BuiltInError, CommandSyntaxError};
    pub use crate::result_consumer::{NoopResultConsumer, ResultConsumer};
    pub use crate::suggestion::{Suggestion, Suggestions, SuggestionsBuilder};
}
