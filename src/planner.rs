//! Chain planning and plan explanation.
//!
//! A [`Stream`](crate::Stream) handle only knows its terminal node. The planner
//! walks the edges back to the source, producing the linear chain the
//! [`cursor`](crate::cursor) interpreter evaluates. Planning for a terminal
//! operation is also where single consumption is enforced: every node on the
//! chain must be fresh, the terminal node must not feed another stage, and on
//! success the whole chain is marked consumed.
//!
//! [`explain`] performs the same walk without consuming anything and reports
//! each step with its characteristics.

use crate::characteristics::Characteristics;
use crate::error::StreamError;
use crate::node::Node;
use crate::pipeline::{Pipeline, PipelineInner};
use crate::runner::ExecMode;
use crate::NodeId;
use anyhow::{Result, anyhow};
use std::fmt::{Display, Formatter, Result as FormatResult};
use tracing::debug;

/// A linearized chain ready for evaluation.
pub(crate) struct Plan {
    /// Source first, terminal node last.
    pub nodes: Vec<Node>,
    /// Characteristics of the terminal node.
    pub characteristics: Characteristics,
    pub mode: ExecMode,
}

/// Linear backwalk: terminal -> ... -> source, returned source first.
fn backwalk(g: &PipelineInner, terminal: NodeId) -> Result<Vec<NodeId>> {
    let mut ids = Vec::new();
    let mut cur = terminal;
    loop {
        if !g.nodes.contains_key(&cur) {
            return Err(anyhow!("missing node {cur:?}"));
        }
        ids.push(cur);
        match g.edges.iter().find(|(_, to)| *to == cur) {
            Some((from, _)) => cur = *from,
            None => break,
        }
    }
    ids.reverse();
    Ok(ids)
}

/// Plan the chain ending at `terminal` for evaluation, consuming it.
pub(crate) fn plan(p: &Pipeline, terminal: NodeId) -> Result<Plan> {
    let mut g = p.lock();
    let ids = backwalk(&g, terminal)?;

    let reused = g.linked.contains(&terminal)
        || ids
            .iter()
            .any(|id| g.consumed.contains(id) || g.poisoned.contains(id));
    if reused {
        debug!(%terminal, "terminal operation on a consumed stream");
        return Err(StreamError::AlreadyConsumed.into());
    }

    let mut nodes = Vec::with_capacity(ids.len());
    for id in &ids {
        let n = g.nodes.get(id).ok_or_else(|| anyhow!("missing node {id:?}"))?;
        nodes.push(n.node.clone());
    }
    let characteristics = g
        .nodes
        .get(&terminal)
        .map_or_else(Characteristics::unknown, |n| n.characteristics);

    g.consumed.extend(ids.iter().copied());
    g.linked.insert(terminal);

    Ok(Plan {
        nodes,
        characteristics,
        mode: g.mode,
    })
}

/// One step of a [`PlanExplanation`].
#[derive(Debug, Clone)]
pub struct ExplainStep {
    /// Node id within the pipeline.
    pub id: NodeId,
    /// Operation name (`values`, `map`, `sorted`, ...).
    pub operation: &'static str,
    /// Characteristics of the sequence this step produces.
    pub characteristics: Characteristics,
    /// Whether parallel evaluation must finish all upstream work before this step.
    pub barrier: bool,
}

/// Description of a stream's plan, produced by [`Stream::explain`](crate::Stream::explain).
#[derive(Debug, Clone)]
pub struct PlanExplanation {
    /// Steps from source to terminal node.
    pub steps: Vec<ExplainStep>,
    /// Execution mode a terminal operation would use.
    pub mode: ExecMode,
    /// Whether a terminal operation has already consumed this stream.
    pub consumed: bool,
}

impl PlanExplanation {
    /// Characteristics of the last step.
    #[must_use]
    pub fn characteristics(&self) -> Characteristics {
        self.steps
            .last()
            .map_or_else(Characteristics::unknown, |s| s.characteristics)
    }
}

impl Display for PlanExplanation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        let mode = match self.mode {
            ExecMode::Sequential => "sequential".to_string(),
            ExecMode::Parallel {
                threads,
                partitions,
            } => format!(
                "parallel (threads={}, partitions={})",
                threads.map_or_else(|| "default".to_string(), |t| t.to_string()),
                partitions.map_or_else(|| "default".to_string(), |p| p.to_string()),
            ),
        };
        writeln!(f, "plan: {} step(s), {mode}", self.steps.len())?;
        for (i, step) in self.steps.iter().enumerate() {
            let marker = if step.barrier { "*" } else { " " };
            writeln!(
                f,
                "  {i:>2}{marker} {:<12} {:<6} {}",
                step.operation,
                step.id.to_string(),
                step.characteristics
            )?;
        }
        if self.consumed {
            writeln!(f, "  (consumed)")?;
        }
        Ok(())
    }
}

/// Describe the chain ending at `terminal` without consuming it.
pub(crate) fn explain(p: &Pipeline, terminal: NodeId) -> Result<PlanExplanation> {
    let g = p.lock();
    let ids = backwalk(&g, terminal)?;
    let mut steps = Vec::with_capacity(ids.len());
    for id in &ids {
        let n = g.nodes.get(id).ok_or_else(|| anyhow!("missing node {id:?}"))?;
        steps.push(ExplainStep {
            id: *id,
            operation: n.node.label(),
            characteristics: n.characteristics,
            barrier: n.node.is_barrier() && !n.node.is_source(),
        });
    }
    let consumed = g.linked.contains(&terminal)
        || ids
            .iter()
            .any(|id| g.consumed.contains(id) || g.poisoned.contains(id));
    Ok(PlanExplanation {
        steps,
        mode: g.mode,
        consumed,
    })
}
