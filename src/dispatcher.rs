//! The command dispatcher (spec.md §4.3 "parse", §4.4 "execute", §4.5
//! "suggestion engine", §6 "External interfaces").
//!
//! The tree-walk in [`CommandDispatcher::parse_nodes`] is the heart of
//! the whole crate: it tries every relevant child of a node, keeps every
//! branch that didn't fail, and ranks the survivors when more than one
//! remains. Grounded directly on the reference dispatcher this crate's
//! design was checked against (see DESIGN.md).

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::RwLock;

use crate::builder::ArgumentBuilder;
use crate::context::{CommandContextBuilder, ContextChain, ParsedArgument, unmatched_error};
use crate::errors::{BuiltInError, CommandSyntaxError};
use crate::parse_results::ParseResults;
use crate::range::StringRange;
use crate::reader::StringReader;
use crate::result_consumer::{NoopResultConsumer, ResultConsumer};
use crate::suggestion::{Suggestions, SuggestionsBuilder};
use crate::tree::{CommandNode, NodeRef};

/// The root of a command tree and the entry point for parsing,
/// executing, and completing input against it.
///
/// ```
/// # use command_dispatch::dispatcher::CommandDispatcher;
/// # use command_dispatch::builder::{literal, ArgumentBuilder};
/// let mut dispatcher = CommandDispatcher::<()>::new();
/// dispatcher.register(literal("foo").executes(|_ctx| Ok(42)));
/// assert_eq!(dispatcher.execute("foo", ()).unwrap(), 42);
/// ```
pub struct CommandDispatcher<S> {
    root: NodeRef<S>,
    consumer: Box<dyn ResultConsumer<S>>,
}

impl<S> CommandDispatcher<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// An empty dispatcher with a no-op result consumer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Arc::new(RwLock::new(CommandNode::new_root())),
            consumer: Box::new(NoopResultConsumer),
        }
    }

    /// The root node. Used as the default target for usage/path queries.
    #[must_use]
    pub fn root(&self) -> &NodeRef<S> {
        &self.root
    }

    /// Builds `builder` and attaches it under the root.
    ///
    /// ```
    /// # use command_dispatch::dispatcher::CommandDispatcher;
    /// # use command_dispatch::builder::{literal, ArgumentBuilder};
    /// let mut dispatcher = CommandDispatcher::<()>::new();
    /// dispatcher.register(literal("foo").executes(|_ctx| Ok(42)));
    /// ```
    pub fn register(&mut self, builder: impl ArgumentBuilder<S>) -> NodeRef<S> {
        let node = builder.build();
        self.root.write().add_child(node.clone());
        node
    }

    /// Replaces the result consumer (spec.md §6 `set-result-consumer`).
    pub fn set_result_consumer(&mut self, consumer: impl ResultConsumer<S> + 'static) {
        self.consumer = Box::new(consumer);
    }

    /// Parses `input` against the tree. Never fails outright — a failed
    /// or partial parse is reported via the returned [`ParseResults`].
    #[must_use]
    pub fn parse(&self, input: impl Into<StringReader>, source: S) -> ParseResults<S> {
        let reader = input.into();
        let context = CommandContextBuilder::new(self.root.clone(), source, reader.cursor());
        self.parse_nodes(&self.root, &reader, context)
    }

    /// The recursive-descent tree walk of spec.md §4.3.
    fn parse_nodes(
        &self,
        node: &NodeRef<S>,
        original_reader: &StringReader,
        context_so_far: CommandContextBuilder<S>,
    ) -> ParseResults<S> {
        let source = context_so_far.source().clone();
        let mut errors: Vec<(NodeRef<S>, CommandSyntaxError)> = Vec::new();
        let mut potentials: Vec<ParseResults<S>> = Vec::new();
        let cursor_start = original_reader.cursor();

        for child in node.read().relevant_nodes(original_reader) {
            if !child.read().can_use(&source) {
                continue;
            }

            let mut context = context_so_far.clone();
            let mut reader = original_reader.clone();

            match child.read().parse_self(&mut reader, &source) {
                Ok(binding) => {
                    if let Some((name, value)) = binding {
                        context.with_argument(
                            name,
                            ParsedArgument::new(StringRange::new(cursor_start, reader.cursor()), value),
                        );
                    }
                    context.with_node(child.clone(), StringRange::new(cursor_start, reader.cursor()));
                }
                Err(err) => {
                    // A non-syntax error from a host `ArgumentType` is folded into the
                    // closed error taxonomy here, at the point it crosses into the tree walk.
                    errors.push((child.clone(), err.into_syntax_error(&reader)));
                    reader.set_cursor(cursor_start);
                    continue;
                }
            }

            if reader.can_read() && reader.peek() != ' ' {
                errors.push((
                    child.clone(),
                    CommandSyntaxError::with_context(
                        BuiltInError::DispatcherExpectedArgumentSeparator,
                        &reader,
                    ),
                ));
                reader.set_cursor(cursor_start);
                continue;
            }

            let child_guard = child.read();
            context.with_command(child_guard.command.clone());
            context.with_modifier(child_guard.modifier.clone());
            context.with_forks(child_guard.forks);
            let redirect = child_guard.redirect.clone();
            let needs = if redirect.is_some() { 1 } else { 2 };
            drop(child_guard);

            if reader.can_read_length(needs) {
                reader.skip();
                if let Some(target) = redirect {
                    let child_context =
                        CommandContextBuilder::new(target.clone(), source.clone(), reader.cursor());
                    let parsed = self.parse_nodes(&target, &reader, child_context);
                    context.with_child(parsed.context);
                    return ParseResults::new(context, parsed.reader, parsed.exceptions);
                }
                potentials.push(self.parse_nodes(&child, &reader, context));
            } else {
                potentials.push(ParseResults::new(context, reader, Vec::new()));
            }
        }

        if !potentials.is_empty() {
            if potentials.len() > 1 {
                potentials.sort_by(|a, b| {
                    match (a.reader.can_read(), b.reader.can_read()) {
                        (false, true) => return Ordering::Less,
                        (true, false) => return Ordering::Greater,
                        _ => {}
                    }
                    match (a.exceptions.is_empty(), b.exceptions.is_empty()) {
                        (true, false) => Ordering::Less,
                        (false, true) => Ordering::Greater,
                        _ => Ordering::Equal,
                    }
                });
            }
            return potentials.into_iter().next().unwrap();
        }

        ParseResults::new(context_so_far, original_reader.clone(), errors)
    }

    /// Parses and executes `input` in one step.
    pub fn execute(&self, input: impl Into<StringReader>, source: S) -> Result<i32, CommandSyntaxError> {
        let parse = self.parse(input, source);
        self.execute_parsed(parse)
    }

    /// Executes an already-parsed result (spec.md §4.3 "Post-parse error
    /// surfacing", §4.4).
    pub fn execute_parsed(&self, parse: ParseResults<S>) -> Result<i32, CommandSyntaxError> {
        if parse.reader.can_read() {
            return Err(if parse.exceptions.len() == 1 {
                parse.exceptions.into_iter().next().unwrap().1
            } else {
                let kind = unmatched_error(parse.context.range().is_empty());
                CommandSyntaxError::with_context(kind, &parse.reader)
            });
        }

        let source = parse.context.source().clone();
        let command = parse.reader.string().to_owned();
        let context = parse.context.build(command);

        let Some(chain) = ContextChain::try_flatten(context) else {
            return Err(CommandSyntaxError::with_context(
                BuiltInError::DispatcherUnknownCommand,
                &parse.reader,
            ));
        };

        chain.execute_all(source, self.consumer.as_ref())
    }

    /// Completion suggestions for the end of `parse`'s input.
    pub async fn get_completion_suggestions(&self, parse: ParseResults<S>) -> Suggestions {
        let cursor = parse.reader.total_length();
        self.get_completion_suggestions_with_cursor(parse, cursor).await
    }

    /// Completion suggestions for an arbitrary cursor position within
    /// the originally-parsed input (spec.md §4.5).
    pub async fn get_completion_suggestions_with_cursor(
        &self,
        parse: ParseResults<S>,
        cursor: usize,
    ) -> Suggestions {
        let full_input = parse.reader.string().to_owned();
        let suggestion_context = parse.context.find_suggestion_context(cursor);
        let start = suggestion_context.start_pos.min(cursor);

        let truncated_input = full_input[..cursor].to_owned();
        let truncated_input_lowercase = truncated_input.to_lowercase();
        let built_context = parse.context.build(truncated_input.clone());

        let children: Vec<NodeRef<S>> = suggestion_context
            .parent
            .read()
            .children()
            .cloned()
            .collect();

        let futures = children.into_iter().map(|node| {
            let built_context = &built_context;
            let truncated_input = truncated_input.clone();
            let truncated_input_lowercase = truncated_input_lowercase.clone();
            async move {
                let mut builder = SuggestionsBuilder::new_with_lowercase(
                    truncated_input,
                    truncated_input_lowercase,
                    start,
                );
                node.read().list_suggestions(built_context, &mut builder)
            }
        });

        let all: Vec<Suggestions> = join_all(futures).await;
        Suggestions::merge(&full_input, &all)
    }

    /// Every name from root to `target`, or an empty vec if `target`
    /// isn't reachable (compared by node identity).
    #[must_use]
    pub fn get_path(&self, target: &NodeRef<S>) -> Vec<String> {
        let mut raw = Vec::new();
        Self::add_paths(&self.root, &mut raw, Vec::new());
        for path in &raw {
            if let Some(last) = path.last()
                && Arc::ptr_eq(last, target)
            {
                return self.names_excluding_root(path);
            }
        }
        Vec::new()
    }

    /// The reverse of [`Self::get_path`]: walks `path` from root, one
    /// child lookup per name.
    #[must_use]
    pub fn find_node(&self, path: &[&str]) -> Option<NodeRef<S>> {
        let mut node = self.root.clone();
        for name in path {
            let next = node.read().child(name)?;
            node = next;
        }
        Some(node)
    }

    /// Every root-to-node path under `node` (defaulting to root).
    #[must_use]
    pub fn get_all_paths(&self, node: Option<&NodeRef<S>>) -> Vec<Vec<String>> {
        let start = node.cloned().unwrap_or_else(|| self.root.clone());
        let mut raw = Vec::new();
        Self::add_paths(&start, &mut raw, Vec::new());
        raw.iter().map(|path| self.names_excluding_root(path)).collect()
    }

    fn names_excluding_root(&self, path: &[NodeRef<S>]) -> Vec<String> {
        path.iter()
            .filter(|n| !Arc::ptr_eq(n, &self.root))
            .map(|n| n.read().name().to_owned())
            .collect()
    }

    fn add_paths(node: &NodeRef<S>, result: &mut Vec<Vec<NodeRef<S>>>, parents: Vec<NodeRef<S>>) {
        let mut current = parents;
        current.push(node.clone());
        result.push(current.clone());
        for child in node.read().children() {
            Self::add_paths(child, result, current.clone());
        }
    }

    /// Author-time ambiguity diagnostic (spec.md §4.2). `source` is
    /// passed through to argument types' `parse` during the validity
    /// check, since user types may consult it.
    pub fn find_ambiguities(
        &self,
        source: &S,
        node: Option<&NodeRef<S>>,
        consumer: &mut dyn FnMut(&NodeRef<S>, &NodeRef<S>, &NodeRef<S>, HashSet<String>),
    ) {
        let start = node.cloned().unwrap_or_else(|| self.root.clone());
        Self::find_ambiguities_recursive(&start, source, consumer);
    }

    fn find_ambiguities_recursive(
        parent: &NodeRef<S>,
        source: &S,
        consumer: &mut dyn FnMut(&NodeRef<S>, &NodeRef<S>, &NodeRef<S>, HashSet<String>),
    ) {
        let children: Vec<NodeRef<S>> = parent.read().children().cloned().collect();
        for (i, child) in children.iter().enumerate() {
            let mut matches = HashSet::new();
            for sibling in children.iter().skip(i + 1) {
                matches.clear();
                for example in child.read().examples() {
                    if sibling.read().is_valid_input(&example, source) {
                        matches.insert(example);
                    }
                }
                if !matches.is_empty() {
                    log::debug!(
                        "ambiguity between '{}' and '{}' under '{}': {:?}",
                        child.read().name(),
                        sibling.read().name(),
                        parent.read().name(),
                        matches
                    );
                    consumer(parent, child, sibling, matches.clone());
                }
            }
            Self::find_ambiguities_recursive(child, source, consumer);
        }
    }

    /// Every reachable usage string under `node`, restricted to sources
    /// satisfying each node's requirement when `restricted` is set.
    #[must_use]
    pub fn get_all_usage(&self, node: &NodeRef<S>, source: &S, restricted: bool) -> Vec<String> {
        let mut result = Vec::new();
        self.get_all_usage_recursive(node, source, &mut result, "", restricted);
        result
    }

    fn get_all_usage_recursive(
        &self,
        node: &NodeRef<S>,
        source: &S,
        result: &mut Vec<String>,
        prefix: &str,
        restricted: bool,
    ) {
        let node = node.read();
        if restricted && !node.can_use(source) {
            return;
        }
        if node.command.is_some() {
            result.push(prefix.to_owned());
        }
        if let Some(redirect) = &node.redirect {
            let target = if Arc::ptr_eq(redirect, &self.root) {
                "...".to_owned()
            } else {
                format!("-> {}", redirect.read().usage_text())
            };
            if prefix.is_empty() {
                result.push(format!("{} {target}", node.usage_text()));
            } else {
                result.push(format!("{prefix} {target}"));
            }
            return;
        }
        for child in node.children() {
            let child_prefix = if prefix.is_empty() {
                child.read().usage_text()
            } else {
                format!("{prefix} {}", child.read().usage_text())
            };
            self.get_all_usage_recursive(child, source, result, &child_prefix, restricted);
        }
    }

    /// The compact `<required> [optional] (a|b) -> target` usage form
    /// for each immediate child of `node`.
    #[must_use]
    pub fn get_smart_usage(&self, node: &NodeRef<S>, source: &S) -> Vec<(NodeRef<S>, String)> {
        let node_guard = node.read();
        let optional = node_guard.command.is_some();
        let mut result = Vec::new();
        for child in node_guard.children() {
            if let Some(usage) = self.get_smart_usage_recursive(child, source, optional, false) {
                result.push((child.clone(), usage));
            }
        }
        result
    }

    fn get_smart_usage_recursive(
        &self,
        node: &NodeRef<S>,
        source: &S,
        optional: bool,
        deep: bool,
    ) -> Option<String> {
        let node_guard = node.read();
        if !node_guard.can_use(source) {
            return None;
        }

        let this = if optional {
            format!("[{}]", node_guard.usage_text())
        } else {
            node_guard.usage_text()
        };
        let child_optional = node_guard.command.is_some();
        let open = if child_optional { "[" } else { "(" };
        let close = if child_optional { "]" } else { ")" };

        if deep {
            return Some(this);
        }

        if let Some(redirect) = &node_guard.redirect {
            let target = if Arc::ptr_eq(redirect, &self.root) {
                "...".to_owned()
            } else {
                format!("-> {}", redirect.read().usage_text())
            };
            return Some(format!("{this} {target}"));
        }

        let children: Vec<NodeRef<S>> = node_guard
            .children()
            .filter(|c| c.read().can_use(source))
            .cloned()
            .collect();
        drop(node_guard);

        match children.len().cmp(&1) {
            Ordering::Less => {}
            Ordering::Equal => {
                if let Some(usage) =
                    self.get_smart_usage_recursive(&children[0], source, child_optional, child_optional)
                {
                    return Some(format!("{this} {usage}"));
                }
            }
            Ordering::Greater => {
                let mut child_usages = HashSet::new();
                for child in &children {
                    if let Some(usage) = self.get_smart_usage_recursive(child, source, child_optional, true) {
                        child_usages.insert(usage);
                    }
                }
                match child_usages.len().cmp(&1) {
                    Ordering::Less => {}
                    Ordering::Equal => {
                        let usage = child_usages.into_iter().next().unwrap();
                        let usage = if child_optional {
                            format!("[{usage}]")
                        } else {
                            usage
                        };
                        return Some(format!("{this} {usage}"));
                    }
                    Ordering::Greater => {
                        let mut rendered = String::new();
                        rendered.push_str(open);
                        for (i, child) in children.iter().enumerate() {
                            if i > 0 {
                                rendered.push('|');
                            }
                            rendered.push_str(&child.read().usage_text());
                        }
                        rendered.push_str(close);
                        return Some(format!("{this} {rendered}"));
                    }
                }
            }
        }

        Some(this)
    }
}

impl<S> Default for CommandDispatcher<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::CommandDispatcher;
    use crate::arguments::integer::IntegerArgumentType;
    use crate::builder::{argument, literal, ArgumentBuilder};
    use crate::errors::BuiltInError;

    #[test]
    fn simple_literal_executes() {
        let mut dispatcher = CommandDispatcher::<()>::new();
        dispatcher.register(literal("foo").executes(|_ctx| Ok(42)));
        assert_eq!(dispatcher.execute("foo", ()).unwrap(), 42);
    }

    #[test]
    fn partial_literal_is_unknown_command() {
        let mut dispatcher = CommandDispatcher::<()>::new();
        dispatcher.register(literal("foo").executes(|_ctx| Ok(42)));
        let err = dispatcher.execute("fo", ()).unwrap_err();
        assert_eq!(err.kind, BuiltInError::DispatcherUnknownCommand);
    }

    #[test]
    fn trailing_garbage_is_unknown_argument() {
        let mut dispatcher = CommandDispatcher::<()>::new();
        dispatcher.register(literal("foo").executes(|_ctx| Ok(42)));
        let err = dispatcher.execute("foo bar", ()).unwrap_err();
        assert_eq!(err.kind, BuiltInError::DispatcherUnknownArgument);
    }

    #[test]
    fn nested_bounded_integer_argument() {
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
        assert!(matches!(
            dispatcher.execute("kick abc", ()).unwrap_err().kind,
            BuiltInError::ReaderExpectedInt
        ));
    }

    #[test]
    fn redirect_routes_to_the_target() {
        let mut dispatcher = CommandDispatcher::<()>::new();
        dispatcher.register(literal("foo").executes(|_ctx| Ok(42)));
        let root = dispatcher.root().clone();
        dispatcher.register(literal("alias").redirect(root));
        assert_eq!(dispatcher.execute("alias foo", ()).unwrap(), 42);
    }

    #[test]
    fn fork_runs_every_produced_source() {
        let mut dispatcher = CommandDispatcher::<i32>::new();
        dispatcher.register(literal("echo").executes(|_ctx| Ok(1)));
        let root = dispatcher.root().clone();
        dispatcher.register(literal("each").fork(
            root,
            std::sync::Arc::new(|ctx: &crate::context::CommandContext<i32>| Ok(vec![*ctx.source(), *ctx.source()])),
        ));
        assert_eq!(dispatcher.execute("each echo", 0).unwrap(), 2);
    }

    #[test]
    fn get_path_and_find_node_round_trip() {
        let mut dispatcher = CommandDispatcher::<()>::new();
        dispatcher.register(literal("foo").then(literal("bar").executes(|_ctx| Ok(0))));

        let bar = dispatcher.find_node(&["foo", "bar"]).unwrap();
        assert_eq!(dispatcher.get_path(&bar), vec!["foo", "bar"]);
    }

    #[test]
    fn get_all_usage_lists_every_executable_path() {
        let mut dispatcher = CommandDispatcher::<()>::new();
        dispatcher.register(
            literal("foo")
                .then(literal("bar").executes(|_ctx| Ok(0)))
                .executes(|_ctx| Ok(0)),
        );

        let root = dispatcher.root().clone();
        let mut usages = dispatcher.get_all_usage(&root, &(), false);
        usages.sort();
        assert_eq!(usages, vec!["foo", "foo bar"]);
    }

    #[test]
    fn find_ambiguities_reports_overlapping_examples() {
        let mut dispatcher = CommandDispatcher::<()>::new();
        dispatcher.register(
            literal("cmd")
                .then(literal("1").executes(|_ctx| Ok(0)))
                .then(argument("id", IntegerArgumentType::new()).executes(|_ctx| Ok(0))),
        );

        let mut found = Vec::new();
        dispatcher.find_ambiguities(&(), None, &mut |_parent, a, b, matches| {
            found.push((a.read().name().to_owned(), b.read().name().to_owned(), matches));
        });

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "1");
        assert_eq!(found[0].1, "id");
        assert!(found[0].2.contains("1"));
    }
}
