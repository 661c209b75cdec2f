//! Fluent tree construction (spec.md §2 "Builders (\"crafters\")").
//!
//! ```
//! # use command_dispatch::builder::{literal, argument, ArgumentBuilder};
//! # use command_dispatch::arguments::integer::IntegerArgumentType;
//! let _tree = literal::<()>("kick")
//!     .then(argument("id", IntegerArgumentType::bounded(0, 100)).executes(|ctx| {
//!         Ok(*ctx.get::<i32>("id").unwrap())
//!     }));
//! ```

use std::sync::Arc;

use parking_lot::RwLock;

use crate::arguments::ArgumentType;
use crate::context::CommandContext;
use crate::errors::CommandSyntaxError;
use crate::tree::{Command, CommandNode, NodeRef, RedirectModifier, Requirement, SuggestionProvider};

/// Shared chain methods over the two concrete builder kinds
/// ([`LiteralArgumentBuilder`], [`RequiredArgumentBuilder`]).
///
/// Each method consumes and returns `Self`, matching the teacher's
/// builder-chaining idiom elsewhere in this crate's ancestry.
pub trait ArgumentBuilder<S>: Sized {
    #[doc(hidden)]
    fn children_mut(&mut self) -> &mut Vec<NodeRef<S>>;
    #[doc(hidden)]
    fn command_mut(&mut self) -> &mut Option<Command<S>>;
    #[doc(hidden)]
    fn requirement_mut(&mut self) -> &mut Requirement<S>;
    #[doc(hidden)]
    fn redirect_mut(&mut self) -> &mut Option<NodeRef<S>>;
    #[doc(hidden)]
    fn modifier_mut(&mut self) -> &mut Option<RedirectModifier<S>>;
    #[doc(hidden)]
    fn forks_mut(&mut self) -> &mut bool;

    /// Finalizes this builder into a tree node.
    fn build(self) -> NodeRef<S>;

    /// Attaches `child` as a subtree under this node.
    ///
    /// # Panics
    ///
    /// Panics if this builder already has a redirect target set
    /// (invariant I4: a redirecting node has no children).
    fn then(mut self, child: impl ArgumentBuilder<S>) -> Self {
        assert!(
            self.redirect_mut().is_none(),
            "cannot add children to a node that redirects"
        );
        let node = child.build();
        self.children_mut().push(node);
        self
    }

    /// Attaches a leaf handler.
    fn executes(
        mut self,
        command: impl Fn(&CommandContext<S>) -> Result<i32, CommandSyntaxError> + Send + Sync + 'static,
    ) -> Self {
        *self.command_mut() = Some(Arc::new(command));
        self
    }

    /// Gates this node behind a `source -> bool` predicate.
    fn requires(mut self, requirement: impl Fn(&S) -> bool + Send + Sync + 'static) -> Self {
        *self.requirement_mut() = Arc::new(requirement);
        self
    }

    /// Redirects parsing to `target` instead of descending into children.
    ///
    /// # Panics
    ///
    /// Panics if this builder already has children attached.
    fn redirect(self, target: NodeRef<S>) -> Self {
        self.redirect_with_modifier(target, None)
    }

    /// As [`Self::redirect`], additionally transforming the source set
    /// via `modifier` (spec.md §4.4).
    ///
    /// # Panics
    ///
    /// Panics if this builder already has children attached.
    fn redirect_with_modifier(mut self, target: NodeRef<S>, modifier: Option<RedirectModifier<S>>) -> Self {
        assert!(
            self.children_mut().is_empty(),
            "cannot both redirect and add children"
        );
        *self.redirect_mut() = Some(target);
        *self.modifier_mut() = modifier;
        self
    }

    /// As [`Self::redirect_with_modifier`], additionally marking this
    /// node as forking: `modifier` may return any number of sources,
    /// each executed independently with errors suppressed.
    ///
    /// # Panics
    ///
    /// Panics if this builder already has children attached.
    fn fork(self, target: NodeRef<S>, modifier: RedirectModifier<S>) -> Self {
        let mut built = self.redirect_with_modifier(target, Some(modifier));
        *built.forks_mut() = true;
        built
    }
}

/// Builds a literal (fixed-keyword) node.
pub struct LiteralArgumentBuilder<S> {
    literal: String,
    children: Vec<NodeRef<S>>,
    command: Option<Command<S>>,
    requirement: Requirement<S>,
    redirect: Option<NodeRef<S>>,
    modifier: Option<RedirectModifier<S>>,
    forks: bool,
}

impl<S> LiteralArgumentBuilder<S> {
    /// Starts building a literal node matching exactly `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            literal: name.into(),
            children: Vec::new(),
            command: None,
            requirement: Arc::new(|_| true),
            redirect: None,
            modifier: None,
            forks: false,
        }
    }

    /// The literal text this builder matches.
    #[must_use]
    pub fn literal_text(&self) -> &str {
        &self.literal
    }
}

impl<S: 'static> ArgumentBuilder<S> for LiteralArgumentBuilder<S> {
    fn children_mut(&mut self) -> &mut Vec<NodeRef<S>> {
        &mut self.children
    }

    fn command_mut(&mut self) -> &mut Option<Command<S>> {
        &mut self.command
    }

    fn requirement_mut(&mut self) -> &mut Requirement<S> {
        &mut self.requirement
    }

    fn redirect_mut(&mut self) -> &mut Option<NodeRef<S>> {
        &mut self.redirect
    }

    fn modifier_mut(&mut self) -> &mut Option<RedirectModifier<S>> {
        &mut self.modifier
    }

    fn forks_mut(&mut self) -> &mut bool {
        &mut self.forks
    }

    fn build(self) -> NodeRef<S> {
        let mut node = CommandNode::new_literal(self.literal);
        node.command = self.command;
        node.requirement = self.requirement;
        node.redirect = self.redirect;
        node.modifier = self.modifier;
        node.forks = self.forks;
        let node_ref: NodeRef<S> = Arc::new(RwLock::new(node));
        for child in self.children {
            node_ref.write().add_child(child);
        }
        node_ref
    }
}

/// Builds a typed-argument node.
pub struct RequiredArgumentBuilder<S, A> {
    name: String,
    argument_type: A,
    suggestion_provider: Option<SuggestionProvider<S>>,
    children: Vec<NodeRef<S>>,
    command: Option<Command<S>>,
    requirement: Requirement<S>,
    redirect: Option<NodeRef<S>>,
    modifier: Option<RedirectModifier<S>>,
    forks: bool,
}

impl<S, A> RequiredArgumentBuilder<S, A>
where
    A: ArgumentType<S>,
{
    /// Starts building an argument node named `name`, parsed by
    /// `argument_type`.
    #[must_use]
    pub fn new(name: impl Into<String>, argument_type: A) -> Self {
        Self {
            name: name.into(),
            argument_type,
            suggestion_provider: None,
            children: Vec::new(),
            command: None,
            requirement: Arc::new(|_| true),
            redirect: None,
            modifier: None,
            forks: false,
        }
    }

    /// Overrides completion behavior with a custom provider instead of
    /// the argument type's own `list_suggestions`.
    #[must_use]
    pub fn suggests(mut self, provider: SuggestionProvider<S>) -> Self {
        self.suggestion_provider = Some(provider);
        self
    }
}

impl<S: 'static, A: ArgumentType<S>> ArgumentBuilder<S> for RequiredArgumentBuilder<S, A> {
    fn children_mut(&mut self) -> &mut Vec<NodeRef<S>> {
        &mut self.children
    }

    fn command_mut(&mut self) -> &mut Option<Command<S>> {
        &mut self.command
    }

    fn requirement_mut(&mut self) -> &mut Requirement<S> {
        &mut self.requirement
    }

    fn redirect_mut(&mut self) -> &mut Option<NodeRef<S>> {
        &mut self.redirect
    }

    fn modifier_mut(&mut self) -> &mut Option<RedirectModifier<S>> {
        &mut self.modifier
    }

    fn forks_mut(&mut self) -> &mut bool {
        &mut self.forks
    }

    fn build(self) -> NodeRef<S> {
        let mut node = CommandNode::new_argument(
            self.name,
            Box::new(self.argument_type),
            self.suggestion_provider,
        );
        node.command = self.command;
        node.requirement = self.requirement;
        node.redirect = self.redirect;
        node.modifier = self.modifier;
        node.forks = self.forks;
        let node_ref: NodeRef<S> = Arc::new(RwLock::new(node));
        for child in self.children {
            node_ref.write().add_child(child);
        }
        node_ref
    }
}

/// Starts a literal-node builder. The usual entry point for a command
/// tree's root-level keywords.
#[must_use]
pub fn literal<S>(name: impl Into<String>) -> LiteralArgumentBuilder<S> {
    LiteralArgumentBuilder::new(name)
}

/// Starts an argument-node builder for a typed slot named `name`.
#[must_use]
pub fn argument<S, A: ArgumentType<S>>(name: impl Into<String>, argument_type: A) -> RequiredArgumentBuilder<S, A> {
    RequiredArgumentBuilder::new(name, argument_type)
}

#[cfg(test)]
mod tests {
    use super::{argument, literal, ArgumentBuilder};
    use crate::arguments::integer::IntegerArgumentType;

    #[test]
    fn then_attaches_a_child_in_insertion_order() {
        let node = literal::<()>("root")
            .then(literal("a"))
            .then(literal("b"))
            .build();
        let names: Vec<String> = node.read().children().map(|c| c.read().name().to_owned()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn executes_attaches_a_handler() {
        let node = literal::<()>("ping").executes(|_ctx| Ok(7)).build();
        assert!(node.read().command.is_some());
    }

    #[test]
    #[should_panic(expected = "redirects")]
    fn then_after_redirect_panics() {
        let target = literal::<()>("root").build();
        let _ = literal::<()>("alias").redirect(target).then(literal("x"));
    }

    #[test]
    fn argument_builder_builds_a_typed_node() {
        let node = argument::<(), _>("id", IntegerArgumentType::bounded(0, 10)).build();
        assert_eq!(node.read().name(), "id");
        assert_eq!(node.read().usage_text(), "<id>");
    }
}
