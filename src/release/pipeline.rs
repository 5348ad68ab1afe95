//! Step ordering and sequential execution.
//!
//! Steps form a graph of "must run after" edges. Construction rejects
//! duplicate names, unknown predecessors and cycles, then fixes a total
//! order: a topological order that keeps declaration order wherever the
//! constraints allow it.

use super::step::Step;
use crate::error::{ConfigError, PipelineError, ReleaseError, Result};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Receives progress notifications while a pipeline runs
pub trait StepObserver {
    /// A step is about to run
    fn started(&mut self, _name: &str, _description: &str) {}
    /// A step's skip predicate held
    fn skipped(&mut self, _name: &str) {}
    /// A step completed
    fn finished(&mut self, _name: &str) {}
    /// A step failed; the pipeline stops after this call
    fn failed(&mut self, _name: &str, _error: &ReleaseError) {}
}

/// Observer that ignores every notification
#[derive(Debug, Default)]
pub struct SilentObserver;

impl StepObserver for SilentObserver {}

/// Validated, totally ordered list of steps
#[derive(Debug)]
pub struct Pipeline<C> {
    steps: Vec<Step<C>>,
}

impl<C> Clone for Pipeline<C> {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps.clone(),
        }
    }
}

impl<C> Pipeline<C> {
    /// Validate `steps` and fix their execution order
    pub fn new(steps: Vec<Step<C>>) -> Result<Self> {
        let mut graph = DiGraph::<usize, ()>::new();
        let mut index: HashMap<&'static str, NodeIndex> = HashMap::new();

        for (position, step) in steps.iter().enumerate() {
            let node = graph.add_node(position);
            if index.insert(step.name, node).is_some() {
                return Err(PipelineError::DuplicateStep {
                    name: step.name.to_string(),
                }
                .into());
            }
        }

        for step in &steps {
            let node = index[step.name];
            for predecessor in &step.after {
                let from = index.get(predecessor).ok_or_else(|| {
                    PipelineError::UnknownPredecessor {
                        step: step.name.to_string(),
                        predecessor: predecessor.to_string(),
                    }
                })?;
                graph.add_edge(*from, node, ());
            }
        }

        toposort(&graph, None).map_err(|cycle| PipelineError::Cycle {
            step: steps[graph[cycle.node_id()]].name.to_string(),
        })?;

        // Kahn's algorithm, always releasing the earliest declared ready step
        let mut in_degree: Vec<usize> = graph
            .node_indices()
            .map(|n| graph.neighbors_directed(n, petgraph::Direction::Incoming).count())
            .collect();
        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(position, _)| Reverse(position))
            .collect();

        let mut order = Vec::with_capacity(steps.len());
        while let Some(Reverse(position)) = ready.pop() {
            order.push(position);
            for next in graph.neighbors_directed(NodeIndex::new(position), petgraph::Direction::Outgoing) {
                let target = graph[next];
                in_degree[target] -= 1;
                if in_degree[target] == 0 {
                    ready.push(Reverse(target));
                }
            }
        }

        let mut slots: Vec<Option<Step<C>>> = steps.into_iter().map(Some).collect();
        let steps = order
            .into_iter()
            .filter_map(|position| slots[position].take())
            .collect();
        Ok(Self { steps })
    }

    /// Steps in execution order
    pub fn steps(&self) -> &[Step<C>] {
        &self.steps
    }

    /// Keep only the named steps, preserving execution order
    pub fn select(self, names: &[&str]) -> Result<Self> {
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.steps.iter().any(|s| s.name == **name))
        {
            return Err(ConfigError::Invalid {
                reason: format!("unknown step '{unknown}'"),
            }
            .into());
        }
        let steps = self
            .steps
            .into_iter()
            .filter(|s| names.contains(&s.name))
            .collect();
        Ok(Self { steps })
    }

    /// Run every step in order, stopping at the first failure
    pub async fn run(&self, ctx: &mut C, observer: &mut dyn StepObserver) -> Result<()> {
        for step in &self.steps {
            if step.should_skip(ctx) {
                log::debug!("Skipping step {}", step.name);
                observer.skipped(step.name);
                continue;
            }

            log::debug!("Running step {}", step.name);
            observer.started(step.name, step.description);
            if let Err(error) = (step.action)(ctx).await {
                observer.failed(step.name, &error);
                return Err(PipelineError::StepFailed {
                    step: step.name.to_string(),
                    source: Box::new(error),
                }
                .into());
            }
            observer.finished(step.name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::step::StepFuture;
    use super::*;
    use crate::error::GitError;

    #[derive(Debug, Default)]
    struct Trace {
        ran: Vec<&'static str>,
        skip_b: bool,
    }

    fn record_a(ctx: &mut Trace) -> StepFuture<'_> {
        Box::pin(async move {
            ctx.ran.push("a");
            Ok(())
        })
    }

    fn record_b(ctx: &mut Trace) -> StepFuture<'_> {
        Box::pin(async move {
            ctx.ran.push("b");
            Ok(())
        })
    }

    fn record_c(ctx: &mut Trace) -> StepFuture<'_> {
        Box::pin(async move {
            ctx.ran.push("c");
            Ok(())
        })
    }

    fn fail(_ctx: &mut Trace) -> StepFuture<'_> {
        Box::pin(async move { Err(ReleaseError::from(GitError::EmptyRepository)) })
    }

    fn names(pipeline: &Pipeline<Trace>) -> Vec<&'static str> {
        pipeline.steps().iter().map(|s| s.name).collect()
    }

    #[test]
    fn ordering_respects_constraints_then_declaration() {
        let pipeline = Pipeline::new(vec![
            Step::new("c", "", record_c).after(&["b"]),
            Step::new("a", "", record_a),
            Step::new("b", "", record_b).after(&["a"]),
        ])
        .unwrap();
        assert_eq!(names(&pipeline), vec!["a", "b", "c"]);

        let unconstrained = Pipeline::new(vec![
            Step::new("c", "", record_c),
            Step::new("a", "", record_a),
        ])
        .unwrap();
        assert_eq!(names(&unconstrained), vec!["c", "a"]);
    }

    #[test]
    fn invalid_graphs_are_rejected() {
        let duplicate = Pipeline::new(vec![Step::new("a", "", record_a), Step::new("a", "", record_b)]);
        assert!(duplicate.unwrap_err().to_string().contains("Duplicate step name 'a'"));

        let unknown = Pipeline::new(vec![Step::new("a", "", record_a).after(&["zz"])]);
        assert!(unknown.unwrap_err().to_string().contains("unknown step 'zz'"));

        let cycle = Pipeline::new(vec![
            Step::new("a", "", record_a).after(&["b"]),
            Step::new("b", "", record_b).after(&["a"]),
        ]);
        assert!(cycle.unwrap_err().to_string().contains("cycle"));
    }

    #[tokio::test]
    async fn skipped_steps_keep_later_steps_running() {
        let pipeline = Pipeline::new(vec![
            Step::new("a", "", record_a),
            Step::new("b", "", record_b)
                .after(&["a"])
                .skip_if(|t: &Trace| t.skip_b),
            Step::new("c", "", record_c).after(&["b"]),
        ])
        .unwrap();
        let mut trace = Trace {
            skip_b: true,
            ..Trace::default()
        };
        pipeline.run(&mut trace, &mut SilentObserver).await.unwrap();
        assert_eq!(trace.ran, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn failure_stops_the_pipeline_and_names_the_step() {
        let pipeline = Pipeline::new(vec![
            Step::new("a", "", record_a),
            Step::new("boom", "", fail).after(&["a"]),
            Step::new("c", "", record_c).after(&["boom"]),
        ])
        .unwrap();
        let mut trace = Trace::default();
        let err = pipeline.run(&mut trace, &mut SilentObserver).await.unwrap_err();
        assert_eq!(trace.ran, vec!["a"]);
        assert!(matches!(
            err,
            ReleaseError::Pipeline(PipelineError::StepFailed { ref step, .. }) if step == "boom"
        ));
    }

    #[test]
    fn select_keeps_order_and_rejects_unknown_names() {
        let pipeline = Pipeline::new(vec![
            Step::new("a", "", record_a),
            Step::new("b", "", record_b).after(&["a"]),
            Step::new("c", "", record_c).after(&["b"]),
        ])
        .unwrap();
        let subset = pipeline.clone().select(&["c", "a"]).unwrap();
        assert_eq!(names(&subset), vec!["a", "c"]);
        assert!(pipeline.select(&["nope"]).is_err());
    }
}
