//! The command tree data model (spec.md §3 "Command node", §9
//! "Polymorphism over node kinds").
//!
//! [`CommandNode`] is a closed, three-variant tagged sum (root / literal /
//! argument) sharing one set of base fields — ownership of children is
//! direct, while redirect targets are non-owning `Arc` back-references so
//! a node may point at an ancestor (including root) without creating a
//! structural cycle in the child graph (spec.md §9 "Cyclic graphs via
//! redirection").

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::arguments::{ArgumentParseError, ArgumentTypeDyn, ParsedValue};
use crate::context::CommandContext;
use crate::errors::{BuiltInError, CommandSyntaxError};
use crate::reader::StringReader;
use crate::suggestion::{Suggestions, SuggestionsBuilder};

/// A handle to a node, shared between the tree, redirect edges, and
/// whatever paths the dispatcher hands back to callers.
pub type NodeRef<S> = Arc<RwLock<CommandNode<S>>>;

/// `source -> bool`. Gates a node's visibility during parse (spec.md
/// "Requirement predicate").
pub type Requirement<S> = Arc<dyn Fn(&S) -> bool + Send + Sync>;

/// A leaf handler. Returns the result the dispatcher ultimately yields
/// from [`crate::dispatcher::CommandDispatcher::execute`].
pub type Command<S> = Arc<dyn Fn(&CommandContext<S>) -> Result<i32, CommandSyntaxError> + Send + Sync>;

/// `Context<S> -> Result<sources>` (spec.md §4.4). Applied when crossing
/// a redirect edge; `None` on a node means "identity: return the
/// singleton of the input source".
pub type RedirectModifier<S> =
    Arc<dyn Fn(&CommandContext<S>) -> Result<Vec<S>, CommandSyntaxError> + Send + Sync>;

/// A custom completion provider for an argument node, used instead of
/// the argument type's own `list_suggestions` when present.
pub type SuggestionProvider<S> =
    Arc<dyn Fn(&CommandContext<S>, &mut SuggestionsBuilder) -> Suggestions + Send + Sync>;

pub(crate) struct LiteralNode {
    pub(crate) name: String,
}

pub(crate) struct ArgumentNode<S> {
    pub(crate) name: String,
    pub(crate) argument_type: Box<dyn ArgumentTypeDyn<S>>,
    pub(crate) suggestion_provider: Option<SuggestionProvider<S>>,
}

/// The tagged sum distinguishing root / literal / argument nodes.
pub(crate) enum NodeValue<S> {
    Root,
    Literal(LiteralNode),
    Argument(ArgumentNode<S>),
}

/// One node of the command tree.
pub struct CommandNode<S> {
    pub(crate) value: NodeValue<S>,
    pub(crate) children: IndexMap<String, NodeRef<S>>,
    pub(crate) literals: IndexMap<String, NodeRef<S>>,
    pub(crate) arguments: IndexMap<String, NodeRef<S>>,
    /// The handler, if this node is a valid command terminus.
    pub command: Option<Command<S>>,
    pub(crate) requirement: Requirement<S>,
    /// The node parsing continues at instead of this node's children.
    /// Invariant I4: a node with `redirect.is_some()` has no children.
    pub redirect: Option<NodeRef<S>>,
    pub(crate) modifier: Option<RedirectModifier<S>>,
    pub(crate) forks: bool,
}

impl<S> CommandNode<S> {
    pub(crate) fn new_root() -> Self {
        Self {
            value: NodeValue::Root,
            children: IndexMap::new(),
            literals: IndexMap::new(),
            arguments: IndexMap::new(),
            command: None,
            requirement: Arc::new(|_| true),
            redirect: None,
            modifier: None,
            forks: false,
        }
    }

    pub(crate) fn new_literal(name: String) -> Self {
        Self {
            value: NodeValue::Literal(LiteralNode { name }),
            children: IndexMap::new(),
            literals: IndexMap::new(),
            arguments: IndexMap::new(),
            command: None,
            requirement: Arc::new(|_| true),
            redirect: None,
            modifier: None,
            forks: false,
        }
    }

    pub(crate) fn new_argument(
        name: String,
        argument_type: Box<dyn ArgumentTypeDyn<S>>,
        suggestion_provider: Option<SuggestionProvider<S>>,
    ) -> Self {
        Self {
            value: NodeValue::Argument(ArgumentNode {
                name,
                argument_type,
                suggestion_provider,
            }),
            children: IndexMap::new(),
            literals: IndexMap::new(),
            arguments: IndexMap::new(),
            command: None,
            requirement: Arc::new(|_| true),
            redirect: None,
            modifier: None,
            forks: false,
        }
    }

    /// The name used for path addressing: the literal text, the argument
    /// name, or `""` for root.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.value {
            NodeValue::Root => "",
            NodeValue::Literal(l) => &l.name,
            NodeValue::Argument(a) => &a.name,
        }
    }

    /// `true` if this is the root node.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        matches!(self.value, NodeValue::Root)
    }

    /// `true` if this is a literal node.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self.value, NodeValue::Literal(_))
    }

    /// The rendered form used in usage strings: the bare literal text, or
    /// `<name>` for an argument.
    #[must_use]
    pub fn usage_text(&self) -> String {
        match &self.value {
            NodeValue::Root => String::new(),
            NodeValue::Literal(l) => l.name.clone(),
            NodeValue::Argument(a) => format!("<{}>", a.name),
        }
    }

    /// `(kind-rank, name)` — literals sort before arguments; within a
    /// group, by name (spec.md §4.2 "Sorted key").
    #[must_use]
    pub(crate) fn sorted_key(&self) -> (u8, &str) {
        match &self.value {
            NodeValue::Root => (0, ""),
            NodeValue::Literal(l) => (0, &l.name),
            NodeValue::Argument(a) => (1, &a.name),
        }
    }

    /// `source -> bool` gate consulted during parse.
    #[must_use]
    pub fn can_use(&self, source: &S) -> bool {
        (self.requirement)(source)
    }

    /// Example strings for ambiguity detection (spec.md §4.2).
    #[must_use]
    pub fn examples(&self) -> Vec<String> {
        match &self.value {
            NodeValue::Root => Vec::new(),
            NodeValue::Literal(l) => vec![l.name.clone()],
            NodeValue::Argument(a) => a.argument_type.examples_dyn(),
        }
    }

    /// The validity check from spec.md §4.2 (used by ambiguity detection):
    /// does `word` fully satisfy this node on its own — a literal match
    /// followed by a boundary, or an argument parse that consumes the
    /// whole word? Argument types are always invoked against a concrete
    /// `source`, since a user `ArgumentType` may consult it while parsing.
    #[must_use]
    pub fn is_valid_input(&self, word: &str, source: &S) -> bool {
        match &self.value {
            NodeValue::Root => false,
            NodeValue::Literal(l) => word == l.name,
            NodeValue::Argument(a) => {
                let mut reader = StringReader::new(format!("{word} "));
                match a.argument_type.parse_dyn(&mut reader, source) {
                    Ok(_) => !reader.can_read() || reader.peek() == ' ',
                    Err(_) => false,
                }
            }
        }
    }

    /// The relevance filter (spec.md §4.2): which children are worth
    /// trying against the next token under `reader`.
    #[must_use]
    pub(crate) fn relevant_nodes(&self, reader: &StringReader) -> Vec<NodeRef<S>> {
        let mut probe = reader.clone();
        let word_start = probe.cursor();
        while probe.can_read() && probe.peek() != ' ' {
            probe.skip();
        }
        let word = &probe.string()[word_start..probe.cursor()];

        if !self.literals.is_empty()
            && let Some(exact) = self.literals.get(word)
        {
            return vec![exact.clone()];
        }
        self.arguments.values().cloned().collect()
    }

    /// Parses this node's own token from `reader`, returning the
    /// argument binding (if any) for the caller to push into the
    /// context builder. Literal nodes also check the word-boundary rule.
    pub(crate) fn parse_self(
        &self,
        reader: &mut StringReader,
        source: &S,
    ) -> Result<Option<(String, ParsedValue)>, ArgumentParseError> {
        match &self.value {
            NodeValue::Root => Ok(None),
            NodeValue::Literal(l) => {
                let start = reader.cursor();
                let end = start + l.name.len();
                if reader.string().len() >= end && &reader.string()[start..end] == l.name {
                    let ok_boundary = reader.string().len() == end
                        || reader.string().as_bytes()[end] == b' ';
                    if ok_boundary {
                        reader.set_cursor(end);
                        return Ok(None);
                    }
                }
                Err(CommandSyntaxError::with_context(
                    BuiltInError::LiteralIncorrect {
                        expected: l.name.clone(),
                    },
                    reader,
                )
                .into())
            }
            NodeValue::Argument(a) => {
                let value = a.argument_type.parse_dyn(reader, source)?;
                Ok(Some((a.name.clone(), value)))
            }
        }
    }

    /// Suggestions this node contributes at the given builder position
    /// (spec.md §4.5 "Literal-node suggestions" / "Argument-node
    /// suggestions").
    pub(crate) fn list_suggestions(
        &self,
        context: &CommandContext<S>,
        builder: &mut SuggestionsBuilder,
    ) -> Suggestions {
        match &self.value {
            NodeValue::Root => builder.build(),
            NodeValue::Literal(l) => {
                let remaining = builder.remaining_lowercase();
                if l.name.to_lowercase().starts_with(remaining) {
                    builder.suggest(l.name.clone());
                }
                builder.build()
            }
            NodeValue::Argument(a) => {
                if let Some(provider) = &a.suggestion_provider {
                    provider(context, builder)
                } else {
                    a.argument_type.list_suggestions_dyn(context, builder)
                }
            }
        }
    }

    /// Adds `child` under this node, merging into an existing
    /// same-named child per invariant I2 instead of replacing it.
    ///
    /// # Panics
    ///
    /// Panics (debug-asserted) if called on a node whose `value` is
    /// `Argument` and an attempt is made to add a `Literal`-incompatible
    /// structure is not itself checked here — callers (the root, via
    /// [`CommandNode::new_root`], and the builder machinery) are
    /// responsible for invariant I3 (root accepts only literals).
    pub fn add_child(&mut self, child: NodeRef<S>) {
        let name = child.read().name().to_owned();

        if let Some(existing) = self.children.get(&name).cloned() {
            log::warn!("duplicate node registered under name '{name}', merging into the existing node");
            let child_guard = child.read();
            let mut existing_guard = existing.write();
            if child_guard.command.is_some() {
                existing_guard.command = child_guard.command.clone();
            }
            let grandchildren: Vec<NodeRef<S>> = child_guard.children.values().cloned().collect();
            drop(child_guard);
            for grandchild in grandchildren {
                existing_guard.add_child(grandchild);
            }
            return;
        }

        let is_literal = matches!(child.read().value, NodeValue::Literal(_));
        self.children.insert(name.clone(), child.clone());
        if is_literal {
            self.literals.insert(name, child);
        } else {
            self.arguments.insert(name, child);
        }
        self.resort_children();
    }

    fn resort_children(&mut self) {
        self.children
            .sort_by(|_, a, _, b| a.read().sorted_key().cmp(&b.read().sorted_key()));
    }

    /// Looks up an immediate child by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<NodeRef<S>> {
        self.children.get(name).cloned()
    }

    /// Immediate children, in insertion (now sorted-key) order.
    pub fn children(&self) -> impl Iterator<Item = &NodeRef<S>> {
        self.children.values()
    }

    /// Number of immediate children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

impl<S> fmt::Debug for CommandNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name())
            .field("children", &self.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::RwLock;

    use super::{CommandNode, LiteralNode, NodeValue};

    fn literal<S>(name: &str) -> Arc<RwLock<CommandNode<S>>> {
        Arc::new(RwLock::new(CommandNode {
            value: NodeValue::Literal(LiteralNode {
                name: name.to_owned(),
            }),
            children: indexmap::IndexMap::new(),
            literals: indexmap::IndexMap::new(),
            arguments: indexmap::IndexMap::new(),
            command: None,
            requirement: Arc::new(|_: &S| true),
            redirect: None,
            modifier: None,
            forks: false,
        }))
    }

    #[test]
    fn adding_a_duplicate_name_merges_instead_of_growing() {
        let mut root: CommandNode<()> = CommandNode::new_root();
        root.add_child(literal("foo"));
        assert_eq!(root.child_count(), 1);

        let second = literal::<()>("foo");
        second.write().command = Some(Arc::new(|_| Ok(1)));
        root.add_child(second);

        assert_eq!(root.child_count(), 1);
        assert!(root.child("foo").unwrap().read().command.is_some());
    }

    #[test]
    fn literals_sort_before_arguments_by_name() {
        let mut root: CommandNode<()> = CommandNode::new_root();
        root.add_child(literal("zzz"));
        root.add_child(literal("aaa"));
        let names: Vec<String> = root.children().map(|c| c.read().name().to_owned()).collect();
        assert_eq!(names, vec!["aaa", "zzz"]);
    }
}
