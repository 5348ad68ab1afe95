//! Named pipeline steps.

use crate::error::Result;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Future returned by a step body, borrowing the context for its lifetime
pub type StepFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + 'a>>;

/// Step body
pub type StepAction<C> = for<'a> fn(&'a mut C) -> StepFuture<'a>;

/// Predicate evaluated just before a step would run; `true` skips it
pub type SkipPredicate<C> = fn(&C) -> bool;

/// A unit of the pipeline
pub struct Step<C> {
    /// Unique name
    pub name: &'static str,
    /// One line shown by the step catalogue
    pub description: &'static str,
    /// Steps that must complete (or be skipped) first
    pub after: Vec<&'static str>,
    /// Body
    pub action: StepAction<C>,
    /// Optional skip predicate
    pub skip_if: Option<SkipPredicate<C>>,
}

impl<C> Step<C> {
    /// Create a step with no ordering constraints
    pub fn new(name: &'static str, description: &'static str, action: StepAction<C>) -> Self {
        Self {
            name,
            description,
            after: Vec::new(),
            action,
            skip_if: None,
        }
    }

    /// Run after each of `names`
    pub fn after(mut self, names: &[&'static str]) -> Self {
        self.after.extend_from_slice(names);
        self
    }

    /// Skip when `predicate` holds at execution time
    pub fn skip_if(mut self, predicate: SkipPredicate<C>) -> Self {
        self.skip_if = Some(predicate);
        self
    }

    /// Whether the step should be skipped against `ctx`
    pub fn should_skip(&self, ctx: &C) -> bool {
        self.skip_if.is_some_and(|skip| skip(ctx))
    }
}

impl<C> Clone for Step<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            description: self.description,
            after: self.after.clone(),
            action: self.action,
            skip_if: self.skip_if,
        }
    }
}

impl<C> fmt::Debug for Step<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("after", &self.after)
            .field("conditional", &self.skip_if.is_some())
            .finish()
    }
}
