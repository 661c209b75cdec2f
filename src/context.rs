//! Parse context accumulation (spec.md §3 "CommandContext", §4.4, §4.5).
//!
//! [`CommandContextBuilder`] is the mutable accumulator a parse threads
//! through the tree walk; [`CommandContext`] is the immutable snapshot it
//! freezes into. Redirection links a chain of contexts together —
//! [`ContextChain`] is what `execute` flattens that chain into.

use indexmap::IndexMap;

use crate::arguments::ParsedValue;
use crate::errors::{BuiltInError, CommandSyntaxError};
use crate::range::StringRange;
use crate::result_consumer::ResultConsumer;
use crate::tree::{Command, NodeRef, RedirectModifier};

/// A single bound argument: the input range it came from and its
/// type-erased value.
#[derive(Debug, Clone)]
pub struct ParsedArgument {
    pub range: StringRange,
    pub value: ParsedValue,
}

impl ParsedArgument {
    #[must_use]
    pub const fn new(range: StringRange, value: ParsedValue) -> Self {
        Self { range, value }
    }
}

/// A node visited during a successful parse, and the range of input it
/// consumed.
pub struct ParsedCommandNode<S> {
    pub node: NodeRef<S>,
    pub range: StringRange,
}

impl<S> Clone for ParsedCommandNode<S> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            range: self.range,
        }
    }
}

/// Where the suggestion engine should resume (spec.md §4.5 step 1).
pub struct SuggestionContext<S> {
    pub parent: NodeRef<S>,
    pub start_pos: usize,
}

/// An immutable snapshot of one successful parse (or one link in a
/// redirect chain).
pub struct CommandContext<S> {
    source: S,
    input: String,
    arguments: IndexMap<String, ParsedArgument>,
    nodes: Vec<ParsedCommandNode<S>>,
    range: StringRange,
    command: Option<Command<S>>,
    child: Option<Box<CommandContext<S>>>,
    modifier: Option<RedirectModifier<S>>,
    forks: bool,
}

impl<S> CommandContext<S> {
    /// The caller-supplied principal this context was parsed against.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// The full input string this context was parsed from.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The range of input this context (not its children) covers.
    #[must_use]
    pub const fn range(&self) -> StringRange {
        self.range
    }

    /// The nodes visited while building this context, in traversal order.
    #[must_use]
    pub fn nodes(&self) -> &[ParsedCommandNode<S>] {
        &self.nodes
    }

    /// The next context in a redirect chain, if any.
    #[must_use]
    pub fn child(&self) -> Option<&Self> {
        self.child.as_deref()
    }

    /// The handler attached to this context's terminal node, if any.
    #[must_use]
    pub fn command(&self) -> Option<&Command<S>> {
        self.command.as_ref()
    }

    /// `true` if this context's node forks execution.
    #[must_use]
    pub const fn forks(&self) -> bool {
        self.forks
    }

    /// Retrieves a bound argument by name and downcasts it to `T`.
    ///
    /// Returns `None` if no argument was bound under `name`, or if it was
    /// bound with a different concrete type.
    #[must_use]
    pub fn get<T: 'static>(&self, name: &str) -> Option<&T> {
        self.arguments.get(name)?.value.downcast_ref()
    }

    /// As [`Self::get`], cloning the value out.
    #[must_use]
    pub fn get_owned<T: Clone + 'static>(&self, name: &str) -> Option<T> {
        self.get(name).cloned()
    }

    /// Builds a context identical to this one but against `source`, used
    /// when executing a forked or redirected branch against a different
    /// principal (spec.md §4.4 `copyFor`).
    #[must_use]
    pub fn copy_for(&self, source: S) -> Self
    where
        S: Clone,
    {
        Self {
            source,
            input: self.input.clone(),
            arguments: self.arguments.clone(),
            nodes: self.nodes.clone(),
            range: self.range,
            command: self.command.clone(),
            child: self
                .child
                .as_ref()
                .map(|c| Box::new(c.copy_for(c.source.clone()))),
            modifier: self.modifier.clone(),
            forks: self.forks,
        }
    }
}

impl<S> Clone for CommandContext<S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        self.copy_for(self.source.clone())
    }
}

/// The mutable accumulator threaded through a tree walk (spec.md §3).
pub struct CommandContextBuilder<S> {
    arguments: IndexMap<String, ParsedArgument>,
    root: NodeRef<S>,
    nodes: Vec<ParsedCommandNode<S>>,
    source: S,
    command: Option<Command<S>>,
    child: Option<Box<CommandContextBuilder<S>>>,
    range: StringRange,
    modifier: Option<RedirectModifier<S>>,
    forks: bool,
}

impl<S> CommandContextBuilder<S> {
    /// Starts a new builder rooted at `root`, with `source` as the
    /// principal and a zero-length range anchored at `start`.
    #[must_use]
    pub fn new(root: NodeRef<S>, source: S, start: usize) -> Self {
        Self {
            arguments: IndexMap::new(),
            root,
            nodes: Vec::new(),
            source,
            command: None,
            child: None,
            range: StringRange::at(start),
            modifier: None,
            forks: false,
        }
    }

    /// The root this builder was started from.
    #[must_use]
    pub fn root(&self) -> &NodeRef<S> {
        &self.root
    }

    /// The source this builder is parsing against.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// The range covered so far.
    #[must_use]
    pub const fn range(&self) -> StringRange {
        self.range
    }

    /// The nodes matched so far.
    #[must_use]
    pub fn nodes(&self) -> &[ParsedCommandNode<S>] {
        &self.nodes
    }

    /// Records an argument binding under `name`.
    pub fn with_argument(&mut self, name: impl Into<String>, argument: ParsedArgument) -> &mut Self {
        self.arguments.insert(name.into(), argument);
        self
    }

    /// Sets the handler this builder's context will expose (the last
    /// matched node with a command wins, per spec.md §4.3 step 3e).
    pub fn with_command(&mut self, command: Option<Command<S>>) -> &mut Self {
        self.command = command;
        self
    }

    /// Records a visited node and widens the covered range to include
    /// its span.
    pub fn with_node(&mut self, node: NodeRef<S>, range: StringRange) -> &mut Self {
        self.nodes.push(ParsedCommandNode { node, range });
        self.range = StringRange::encompassing(self.range, range);
        self
    }

    /// Attaches the next link in a redirect chain.
    pub fn with_child(&mut self, child: CommandContextBuilder<S>) -> &mut Self {
        self.child = Some(Box::new(child));
        self
    }

    /// The deepest builder in the redirect chain so far.
    #[must_use]
    pub fn last_child(&mut self) -> &mut Self {
        let mut current = self;
        while current.child.is_some() {
            current = current.child.as_deref_mut().unwrap();
        }
        current
    }

    /// Sets the redirect modifier the last matched node carried.
    pub fn with_modifier(&mut self, modifier: Option<RedirectModifier<S>>) -> &mut Self {
        self.modifier = modifier;
        self
    }

    /// Sets the fork flag the last matched node carried.
    pub fn with_forks(&mut self, forks: bool) -> &mut Self {
        self.forks = forks;
        self
    }

    /// Freezes this builder (and its chain) into an immutable
    /// [`CommandContext`].
    #[must_use]
    pub fn build(self, input: impl Into<String>) -> CommandContext<S> {
        let input = input.into();
        self.build_inner(input)
    }

    fn build_inner(self, input: String) -> CommandContext<S> {
        let child = self
            .child
            .map(|c| Box::new(c.build_inner(input.clone())));
        CommandContext {
            source: self.source,
            input,
            arguments: self.arguments,
            nodes: self.nodes,
            range: self.range,
            command: self.command,
            child,
            modifier: self.modifier,
            forks: self.forks,
        }
    }

    /// The suggestion-context descent from spec.md §4.5 step 1: follow
    /// `child` links while the child's range starts at or before
    /// `cursor`, then resolve the parent/start-offset within the
    /// deepest builder reached.
    #[must_use]
    pub fn find_suggestion_context(&self, cursor: usize) -> SuggestionContext<S> {
        if let Some(child) = &self.child
            && child.range.start <= cursor
        {
            return child.find_suggestion_context(cursor);
        }

        if self.range.end <= cursor {
            return match self.nodes.last() {
                Some(last) => SuggestionContext {
                    parent: last.node.clone(),
                    start_pos: last.range.end + 1,
                },
                None => SuggestionContext {
                    parent: self.root.clone(),
                    start_pos: self.range.start,
                },
            };
        }

        let mut prev = self.root.clone();
        for node in &self.nodes {
            if node.range.start <= cursor && cursor <= node.range.end {
                return SuggestionContext {
                    parent: prev,
                    start_pos: node.range.start,
                };
            }
            prev = node.node.clone();
        }
        SuggestionContext {
            parent: self.root.clone(),
            start_pos: self.range.start,
        }
    }
}

impl<S> Clone for CommandContextBuilder<S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            arguments: self.arguments.clone(),
            root: self.root.clone(),
            nodes: self.nodes.clone(),
            source: self.source.clone(),
            command: self.command.clone(),
            child: self.child.clone(),
            range: self.range,
            modifier: self.modifier.clone(),
            forks: self.forks,
        }
    }
}

/// The flattened form of a redirect chain (spec.md §4.4): every context
/// but the last becomes a modifier application; the last must be
/// executable.
pub struct ContextChain<S> {
    modifiers: Vec<CommandContext<S>>,
    executable: CommandContext<S>,
}

impl<S> ContextChain<S> {
    /// Flattens `context`'s redirect chain, or returns `None` if the
    /// terminal link has no handler (spec.md §4.4: surfaced by the
    /// caller as *dispatcher-unknown-command*).
    #[must_use]
    pub fn try_flatten(context: CommandContext<S>) -> Option<Self> {
        let mut modifiers = Vec::new();
        let mut current = context;
        loop {
            match current.child.take() {
                None => {
                    current.command.as_ref()?;
                    return Some(Self {
                        modifiers,
                        executable: current,
                    });
                }
                Some(child) => {
                    modifiers.push(current);
                    current = *child;
                }
            }
        }
    }

    /// Runs the chain's redirect modifiers in order, then the terminal
    /// handler, against `source` — the execution algorithm of spec.md
    /// §4.4 steps 1–4.
    pub fn execute_all(
        &self,
        source: S,
        consumer: &dyn ResultConsumer<S>,
    ) -> Result<i32, CommandSyntaxError>
    where
        S: Clone,
    {
        let mut sources = vec![source];
        let mut forked_mode = false;

        for modifier_ctx in &self.modifiers {
            forked_mode |= modifier_ctx.forks;
            let mut next_sources = Vec::new();
            for s in sources {
                let ctx = modifier_ctx.copy_for(s.clone());
                let outcome = match &modifier_ctx.modifier {
                    Some(modifier) => modifier(&ctx),
                    None => Ok(vec![s]),
                };
                match outcome {
                    Ok(produced) => next_sources.extend(produced),
                    Err(err) => {
                        consumer.on_command_complete(&ctx, false, 0);
                        if forked_mode {
                            continue;
                        }
                        return Err(err);
                    }
                }
            }
            if next_sources.is_empty() {
                return Ok(0);
            }
            sources = next_sources;
        }

        let mut result = 0;
        for s in sources {
            let ctx = self.executable.copy_for(s);
            let Some(command) = &self.executable.command else {
                continue;
            };
            match command(&ctx) {
                Ok(r) => {
                    consumer.on_command_complete(&ctx, true, r);
                    result = if forked_mode { result + 1 } else { r };
                }
                Err(err) => {
                    consumer.on_command_complete(&ctx, false, 0);
                    if !forked_mode {
                        return Err(err);
                    }
                }
            }
        }
        Ok(result)
    }
}

/// The post-parse error precedence from spec.md §4.3: a single recorded
/// branch error wins; otherwise the coverage of `range` distinguishes
/// "no command matched" from "command matched, argument didn't".
/// Callers re-throw `errors[0]` directly when `errors.len() == 1`
/// instead of calling this.
#[must_use]
pub const fn unmatched_error(range_is_empty: bool) -> BuiltInError {
    if range_is_empty {
        BuiltInError::DispatcherUnknownCommand
    } else {
        BuiltInError::DispatcherUnknownArgument
    }
}
