//! Trigger expressions and the step dependency graph.
//!
//! Grammar (whitespace around tokens is ignored):
//!
//! ```text
//! event:<type>             root step, started by the named event
//! step:N[,M...]:complete   runs after every listed step has completed
//! step:N[,M...]:approved   as above, then needs approval from the gate
//! parallel:N               runs after step N, alongside its siblings
//! ```
//!
//! A step without a trigger is a root step.

use std::collections::HashMap;

use nexus_contracts::error::{NexusError, NexusResult};

use crate::config::ExecutionMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Complete,
    Approved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Event(String),
    Steps { steps: Vec<u32>, gate: Gate },
    Parallel(u32),
}

impl Trigger {
    /// Parse a trigger expression. The error string explains what is wrong.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        let (kind, rest) = raw
            .split_once(':')
            .ok_or_else(|| "expected '<kind>:<argument>'".to_string())?;

        match kind.trim() {
            "event" => {
                let event_type = rest.trim();
                if event_type.is_empty() {
                    return Err("missing event type".to_string());
                }
                Ok(Self::Event(event_type.to_string()))
            }
            "parallel" => parse_step_number(rest).map(Self::Parallel),
            "step" => {
                let (numbers, gate) = rest
                    .rsplit_once(':')
                    .ok_or_else(|| "expected 'step:<numbers>:<complete|approved>'".to_string())?;
                let gate = match gate.trim() {
                    "complete" => Gate::Complete,
                    "approved" => Gate::Approved,
                    other => return Err(format!("unknown gate '{other}'")),
                };
                let steps = numbers
                    .split(',')
                    .map(parse_step_number)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::Steps { steps, gate })
            }
            other => Err(format!("unknown trigger kind '{other}'")),
        }
    }

    /// Step numbers this trigger waits on.
    pub fn dependencies(&self) -> &[u32] {
        match self {
            Self::Event(_) => &[],
            Self::Steps { steps, .. } => steps,
            Self::Parallel(step) => std::slice::from_ref(step),
        }
    }

    pub fn requires_approval(&self) -> bool {
        matches!(self, Self::Steps { gate: Gate::Approved, .. })
    }
}

fn parse_step_number(s: &str) -> Result<u32, String> {
    let s = s.trim();
    s.parse::<u32>()
        .map_err(|_| format!("'{s}' is not a step number"))
}

// ── Dependency graph ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Node {
    number: u32,
    /// Indices of predecessor nodes.
    deps: Vec<usize>,
    gated: bool,
}

/// Validated dependency graph over a workflow's steps, in declaration order.
#[derive(Debug, Clone)]
pub struct StepGraph {
    nodes: Vec<Node>,
    /// Dependency waves; every node appears in exactly one.
    layers: Vec<Vec<usize>>,
}

impl StepGraph {
    /// Validate `(step number, trigger)` pairs and build the graph.
    ///
    /// Fails on duplicate step numbers, unparseable triggers, dependencies on
    /// undeclared steps, self-dependencies, and cycles.
    pub fn build<'a, I>(steps: I) -> NexusResult<Self>
    where
        I: IntoIterator<Item = (u32, Option<&'a str>)>,
    {
        let declared: Vec<(u32, Option<&str>)> = steps.into_iter().collect();

        let mut index_of: HashMap<u32, usize> = HashMap::with_capacity(declared.len());
        for (idx, (number, _)) in declared.iter().enumerate() {
            if index_of.insert(*number, idx).is_some() {
                return Err(NexusError::InvalidWorkflow {
                    reason: format!("step number {number} is declared more than once"),
                });
            }
        }

        let mut nodes = Vec::with_capacity(declared.len());
        for (number, trigger) in &declared {
            let trigger = match trigger {
                Some(raw) => Some(Trigger::parse(raw).map_err(|reason| {
                    NexusError::InvalidTrigger {
                        step: *number,
                        trigger: raw.to_string(),
                        reason,
                    }
                })?),
                None => None,
            };

            let mut deps = Vec::new();
            for dep in trigger.as_ref().map_or(&[][..], Trigger::dependencies) {
                if dep == number {
                    return Err(NexusError::InvalidWorkflow {
                        reason: format!("step {number} depends on itself"),
                    });
                }
                let idx = *index_of.get(dep).ok_or_else(|| NexusError::InvalidWorkflow {
                    reason: format!("step {number} depends on undeclared step {dep}"),
                })?;
                if !deps.contains(&idx) {
                    deps.push(idx);
                }
            }

            nodes.push(Node {
                number: *number,
                deps,
                gated: trigger.as_ref().is_some_and(Trigger::requires_approval),
            });
        }

        let layers = layer(&nodes)?;
        Ok(Self { nodes, layers })
    }

    pub fn is_gated(&self, idx: usize) -> bool {
        self.nodes[idx].gated
    }

    /// Groups of node indices to run together, in order.
    ///
    /// `Dependency` yields the topological waves, each in declaration order.
    /// `Sequential` yields one node per wave in declaration order.
    pub fn waves(&self, mode: ExecutionMode) -> Vec<Vec<usize>> {
        match mode {
            ExecutionMode::Dependency => self.layers.clone(),
            ExecutionMode::Sequential => (0..self.nodes.len()).map(|i| vec![i]).collect(),
        }
    }
}

/// Kahn layering with declaration-order tie-breaking.
fn layer(nodes: &[Node]) -> NexusResult<Vec<Vec<usize>>> {
    let mut done = vec![false; nodes.len()];
    let mut remaining = nodes.len();
    let mut layers = Vec::new();

    while remaining > 0 {
        let ready: Vec<usize> = (0..nodes.len())
            .filter(|&i| !done[i] && nodes[i].deps.iter().all(|&d| done[d]))
            .collect();

        if ready.is_empty() {
            let stuck: Vec<String> = (0..nodes.len())
                .filter(|&i| !done[i])
                .map(|i| nodes[i].number.to_string())
                .collect();
            return Err(NexusError::InvalidWorkflow {
                reason: format!("dependency cycle among steps {}", stuck.join(", ")),
            });
        }

        for &i in &ready {
            done[i] = true;
        }
        remaining -= ready.len();
        layers.push(ready);
    }

    Ok(layers)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use nexus_contracts::error::NexusError;

    use super::{Gate, StepGraph, Trigger};
    use crate::config::ExecutionMode;

    fn graph(steps: &[(u32, Option<&'static str>)]) -> Result<StepGraph, NexusError> {
        StepGraph::build(steps.iter().copied())
    }

    #[test]
    fn parses_every_trigger_kind() {
        assert_eq!(
            Trigger::parse("event:lead.discovered").unwrap(),
            Trigger::Event("lead.discovered".to_string())
        );
        assert_eq!(
            Trigger::parse("step:1:complete").unwrap(),
            Trigger::Steps { steps: vec![1], gate: Gate::Complete }
        );
        assert_eq!(
            Trigger::parse("step:2, 3 ,4:complete").unwrap(),
            Trigger::Steps { steps: vec![2, 3, 4], gate: Gate::Complete }
        );
        assert_eq!(
            Trigger::parse("step:5:approved").unwrap(),
            Trigger::Steps { steps: vec![5], gate: Gate::Approved }
        );
        assert_eq!(Trigger::parse("parallel:1").unwrap(), Trigger::Parallel(1));
    }

    #[test]
    fn rejects_malformed_triggers() {
        for raw in ["", "step", "step:1", "step:x:complete", "step:1:done", "parallel:", "cron:5", "event:"] {
            assert!(Trigger::parse(raw).is_err(), "'{raw}' should not parse");
        }
    }

    #[test]
    fn approval_gate_is_reported() {
        assert!(Trigger::parse("step:5:approved").unwrap().requires_approval());
        assert!(!Trigger::parse("step:5:complete").unwrap().requires_approval());
        assert!(!Trigger::parse("parallel:1").unwrap().requires_approval());
    }

    #[test]
    fn fan_out_and_join_form_three_waves() {
        // Stress-to-healing shape: 1 → {2,3,4} → 5.
        let g = graph(&[
            (1, Some("event:stress.detected")),
            (2, Some("parallel:1")),
            (3, Some("parallel:1")),
            (4, Some("parallel:1")),
            (5, Some("step:2,3,4:complete")),
        ])
        .unwrap();

        assert_eq!(g.waves(ExecutionMode::Dependency), vec![vec![0], vec![1, 2, 3], vec![4]]);
    }

    #[test]
    fn sequential_mode_ignores_dependencies() {
        let g = graph(&[(1, None), (2, Some("parallel:1")), (3, Some("parallel:1"))]).unwrap();
        assert_eq!(g.waves(ExecutionMode::Sequential), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn step_numbers_need_not_follow_declaration_order() {
        let g = graph(&[(10, Some("step:20:complete")), (20, None)]).unwrap();
        assert_eq!(g.waves(ExecutionMode::Dependency), vec![vec![1], vec![0]]);
    }

    #[test]
    fn duplicate_step_numbers_are_rejected() {
        let err = graph(&[(1, None), (1, None)]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn undeclared_dependency_is_rejected() {
        let err = graph(&[(1, None), (2, Some("step:9:complete"))]).unwrap_err();
        assert!(err.to_string().contains("undeclared step 9"));
    }

    #[test]
    fn self_dependency_is_rejected() {
        let err = graph(&[(1, Some("step:1:complete"))]).unwrap_err();
        assert!(err.to_string().contains("depends on itself"));
    }

    #[test]
    fn cycles_are_rejected() {
        let err = graph(&[
            (1, None),
            (2, Some("step:3:complete")),
            (3, Some("step:2:complete")),
        ])
        .unwrap_err();
        match err {
            NexusError::InvalidWorkflow { reason } => {
                assert!(reason.contains("cycle"));
                assert!(reason.contains('2') && reason.contains('3'));
            }
            other => panic!("expected InvalidWorkflow, got {:?}", other),
        }
    }

    #[test]
    fn bad_trigger_names_the_step() {
        match graph(&[(1, None), (2, Some("after:1"))]).unwrap_err() {
            NexusError::InvalidTrigger { step, trigger, .. } => {
                assert_eq!(step, 2);
                assert_eq!(trigger, "after:1");
            }
            other => panic!("expected InvalidTrigger, got {:?}", other),
        }
    }
}
