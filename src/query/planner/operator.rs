// Operator Pipeline
//
// The compiled pipeline is a chain of operator nodes ending in exactly one
// Terminal. Projection is deferred: a Project node only records which
// projection is pending and the Terminal applies it when it writes the row,
// so every node reads the original row.

use std::fmt;

use log::trace;

use super::predicate::Predicate;
use super::projection::Projection;
use crate::query::executor::runtime::QueryRuntime;

/// A node of the compiled pipeline
pub enum OperatorNode<R> {
    /// Forward rows that satisfy the predicate
    Filter {
        predicate: Predicate<R>,
        next: Box<OperatorNode<R>>,
    },
    /// Reshape forwarded rows
    Project {
        projection: Projection<R>,
        next: Box<OperatorNode<R>>,
    },
    /// Fused filter and projection
    FilterProject {
        predicate: Predicate<R>,
        projection: Projection<R>,
        next: Box<OperatorNode<R>>,
    },
    /// Append to the result buffer
    Terminal,
}

impl<R> OperatorNode<R> {
    pub fn filter(predicate: Predicate<R>, next: OperatorNode<R>) -> Self {
        OperatorNode::Filter {
            predicate,
            next: Box::new(next),
        }
    }

    pub fn project(projection: Projection<R>, next: OperatorNode<R>) -> Self {
        OperatorNode::Project {
            projection,
            next: Box::new(next),
        }
    }

    pub fn filter_project(predicate: Predicate<R>, projection: Projection<R>, next: OperatorNode<R>) -> Self {
        OperatorNode::FilterProject {
            predicate,
            projection,
            next: Box::new(next),
        }
    }

    /// Successor node, `None` for the Terminal
    pub fn next(&self) -> Option<&OperatorNode<R>> {
        match self {
            OperatorNode::Filter { next, .. }
            | OperatorNode::Project { next, .. }
            | OperatorNode::FilterProject { next, .. } => Some(next.as_ref()),
            OperatorNode::Terminal => None,
        }
    }

    /// Short node name
    pub fn name(&self) -> &'static str {
        match self {
            OperatorNode::Filter { .. } => "Filter",
            OperatorNode::Project { .. } => "Project",
            OperatorNode::FilterProject { .. } => "FilterProject",
            OperatorNode::Terminal => "Terminal",
        }
    }

    /// Node names from the root to the Terminal
    pub fn node_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut node = Some(self);
        while let Some(current) = node {
            names.push(current.name());
            node = current.next();
        }
        names
    }

    /// The projection in effect when rows reach the Terminal; `None` writes whole rows
    pub fn terminal_projection(&self) -> Option<&Projection<R>> {
        let mut pending = None;
        let mut node = Some(self);
        while let Some(current) = node {
            match current {
                OperatorNode::Project { projection, .. }
                | OperatorNode::FilterProject { projection, .. } => pending = Some(projection),
                _ => {}
            }
            node = current.next();
        }
        pending
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            OperatorNode::Filter { predicate, .. } => {
                writeln!(f, "{}Filter: {}", indent, predicate)?;
                write_constants(f, &indent, predicate)?;
            }
            OperatorNode::Project { projection, .. } => {
                writeln!(f, "{}Project: {}", indent, projection)?;
            }
            OperatorNode::FilterProject { predicate, projection, .. } => {
                writeln!(f, "{}FilterProject: {} -> {}", indent, predicate, projection)?;
                write_constants(f, &indent, predicate)?;
            }
            OperatorNode::Terminal => {
                writeln!(f, "{}Terminal", indent)?;
            }
        }

        match self.next() {
            Some(next) => next.write_tree(f, depth + 1),
            None => Ok(()),
        }
    }
}

fn write_constants<R>(f: &mut fmt::Formatter<'_>, indent: &str, predicate: &Predicate<R>) -> fmt::Result {
    for unit in predicate.units() {
        writeln!(
            f,
            "{}  | {} {} {}: {}",
            indent,
            unit.column().name(),
            unit.operator(),
            unit.constant().data_type(),
            unit.constant()
        )?;
    }
    Ok(())
}

impl<R: Clone> OperatorNode<R> {
    /// Push one row through the chain
    #[inline]
    pub fn process<'a>(&'a self, row: &R, pending: Option<&'a Projection<R>>, runtime: &mut QueryRuntime<R>) {
        match self {
            OperatorNode::Filter { predicate, next } => {
                if predicate.evaluate(row) {
                    next.process(row, pending, runtime);
                }
            }
            OperatorNode::Project { projection, next } => next.process(row, Some(projection), runtime),
            OperatorNode::FilterProject { predicate, projection, next } => {
                if predicate.evaluate(row) {
                    next.process(row, Some(projection), runtime);
                }
            }
            OperatorNode::Terminal => runtime.emit(row, pending),
        }
    }

    /// Run the chain over a slice of rows.
    ///
    /// With `batch_shortcut`, chains without a predicate hand the whole slice
    /// to the runtime instead of dispatching row by row.
    pub fn run(&self, rows: &[R], runtime: &mut QueryRuntime<R>, batch_shortcut: bool) {
        if batch_shortcut {
            match self {
                OperatorNode::Terminal => {
                    trace!("Batch copy of {} rows", rows.len());
                    runtime.emit_all(rows, None);
                    return;
                }
                OperatorNode::Project { projection, next } if matches!(**next, OperatorNode::Terminal) => {
                    trace!("Batch projection of {} rows", rows.len());
                    runtime.emit_all(rows, Some(projection));
                    return;
                }
                _ => {}
            }
        }

        for row in rows {
            self.process(row, None, runtime);
        }
    }
}

/// Multi-line plan tree with the specialized constants of every comparison
impl<R> fmt::Display for OperatorNode<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}
