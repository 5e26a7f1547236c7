//! Execution profiling for the op-stream executor
//!
//! Counts how often each op kind runs and records the op sequence of every
//! completed innermost loop iteration, so hot loop shapes that the
//! specializer does not recognize yet show up in the report.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use bytecode_system::{Op, OpKind};

/// Per-run execution statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionProfile {
    op_counts: BTreeMap<OpKind, u64>,
    loop_traces: HashMap<String, u64>,
    current_trace: String,
}

impl ExecutionProfile {
    /// Create an empty profile
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one executed op
    pub fn record(&mut self, op: &Op) {
        *self.op_counts.entry(op.kind()).or_insert(0) += 1;

        match op {
            Op::JumpIfZero(_) => self.current_trace.clear(),
            Op::JumpIfNotZero(_) => {
                let trace = std::mem::take(&mut self.current_trace);
                *self.loop_traces.entry(trace).or_insert(0) += 1;
            }
            _ => {
                self.current_trace.push(op.kind().symbol());
                self.current_trace.push_str(&op.argument().to_string());
            }
        }
    }

    /// Executions of ops of `kind`
    pub fn op_count(&self, kind: OpKind) -> u64 {
        self.op_counts.get(&kind).copied().unwrap_or(0)
    }

    /// Total executed ops
    pub fn total(&self) -> u64 {
        self.op_counts.values().sum()
    }

    /// Loop body traces with their iteration counts, most frequent first
    pub fn loop_traces(&self) -> Vec<(&str, u64)> {
        let mut traces: Vec<(&str, u64)> = self
            .loop_traces
            .iter()
            .map(|(trace, count)| (trace.as_str(), *count))
            .collect();
        traces.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        traces
    }
}

impl fmt::Display for ExecutionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "* Tracing:")?;
        for (kind, count) in &self.op_counts {
            writeln!(f, "{}\t--> {}", kind, count)?;
        }
        writeln!(f, ".. Total: {}", self.total())?;
        for (trace, count) in self.loop_traces() {
            writeln!(f, "{:<15} --> {}", trace, count)?;
        }
        Ok(())
    }
}
