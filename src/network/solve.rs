//! Linear program description and timed solve.
//!
//! The model builder produces a plain [`LinearProgram`] (owned numbers
//! only), which is moved onto a short-lived worker thread and solved with
//! `good_lp`'s pure-Rust `microlp` backend. The caller waits at most the
//! timeout; a solve that runs longer is abandoned and its thread finishes
//! on its own. At most [`MAX_ABANDONED_WORKERS`] such threads may run
//! before further solves are refused.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use good_lp::{
    Expression, ResolutionError, Solution, SolverModel, Variable, constraint, default_solver,
    variable, variables,
};

use crate::error::SolveError;

/// One decision variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
    /// Integrality.
    pub integer: bool,
    /// Objective coefficient.
    pub cost: f64,
}

/// Row sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// `Σ = rhs`
    Eq,
    /// `Σ ≥ rhs`
    Ge,
    /// `Σ ≤ rhs`
    Le,
}

/// One linear constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// `(variable index, coefficient)` pairs.
    pub terms: Vec<(usize, f64)>,
    /// Sense.
    pub sense: Sense,
    /// Right-hand side.
    pub rhs: f64,
}

/// Minimisation program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearProgram {
    /// Variables.
    pub vars: Vec<VarDef>,
    /// Constraints.
    pub rows: Vec<Row>,
}

impl LinearProgram {
    /// Adds a variable and returns its index.
    pub fn add_var(&mut self, lower: f64, upper: f64, integer: bool, cost: f64) -> usize {
        self.vars.push(VarDef {
            lower,
            upper,
            integer,
            cost,
        });
        self.vars.len() - 1
    }

    /// Adds a constraint.
    pub fn add_row(&mut self, terms: Vec<(usize, f64)>, sense: Sense, rhs: f64) {
        self.rows.push(Row { terms, sense, rhs });
    }

    /// Largest absolute objective coefficient.
    pub fn max_cost(&self) -> f64 {
        self.vars.iter().map(|v| v.cost.abs()).fold(0.0, f64::max)
    }

    /// Divides every objective coefficient by `factor`.
    pub fn scale_costs(&mut self, factor: f64) {
        if factor > 0.0 {
            for v in &mut self.vars {
                v.cost /= factor;
            }
        }
    }

    /// Objective value of an assignment.
    pub fn objective(&self, values: &[f64]) -> f64 {
        self.vars.iter().zip(values).map(|(v, x)| v.cost * x).sum()
    }
}

/// Solves `program` on the calling thread.
pub fn solve(program: &LinearProgram) -> Result<Vec<f64>, SolveError> {
    let mut vars = variables!();
    let handles: Vec<Variable> = program
        .vars
        .iter()
        .map(|v| {
            let def = variable().min(v.lower).max(v.upper);
            vars.add(if v.integer { def.integer() } else { def })
        })
        .collect();

    let objective = program
        .vars
        .iter()
        .zip(&handles)
        .fold(Expression::from(0.0), |acc, (v, &x)| acc + v.cost * x);

    let mut model = vars.minimise(objective).using(default_solver);
    for row in &program.rows {
        let lhs = row
            .terms
            .iter()
            .fold(Expression::from(0.0), |acc, &(i, c)| acc + c * handles[i]);
        model.add_constraint(match row.sense {
            Sense::Eq => constraint::eq(lhs, row.rhs),
            Sense::Ge => constraint::geq(lhs, row.rhs),
            Sense::Le => constraint::leq(lhs, row.rhs),
        });
    }

    let solution = model.solve().map_err(|err| match err {
        ResolutionError::Infeasible => SolveError::Infeasible,
        ResolutionError::Unbounded => SolveError::Unbounded,
        other => SolveError::Solver(other.to_string()),
    })?;

    Ok(handles.iter().map(|&x| solution.value(x)).collect())
}

/// Most abandoned solver threads allowed to run at once.
pub const MAX_ABANDONED_WORKERS: usize = 4;

const RUNNING: u8 = 0;
const DONE: u8 = 1;
const ABANDONED: u8 = 2;

/// Counts solver threads whose caller timed out but which are still running.
///
/// A timed-out solve cannot be cancelled, so its thread keeps a core busy
/// until `microlp` returns. Once `limit` such threads exist, new solves
/// are refused with [`SolveError::Saturated`] until some finish.
#[derive(Debug)]
pub struct WorkerGate {
    abandoned: AtomicUsize,
    limit: usize,
}

impl WorkerGate {
    /// Gate admitting solves while fewer than `limit` workers are abandoned.
    pub const fn new(limit: usize) -> Self {
        Self {
            abandoned: AtomicUsize::new(0),
            limit,
        }
    }

    /// Abandoned workers still running.
    pub fn abandoned(&self) -> usize {
        self.abandoned.load(Ordering::Acquire)
    }
}

static SOLVER_GATE: WorkerGate = WorkerGate::new(MAX_ABANDONED_WORKERS);

/// Solves `program` on a worker thread, waiting at most `timeout`.
///
/// A zero timeout fails immediately without starting a solve. Threads
/// left running after a timeout are tracked process-wide; see
/// [`WorkerGate`].
pub fn solve_with_timeout(
    program: LinearProgram,
    timeout: Duration,
) -> Result<Vec<f64>, SolveError> {
    solve_gated(program, timeout, &SOLVER_GATE)
}

/// [`solve_with_timeout`] against an explicit gate.
pub fn solve_gated(
    program: LinearProgram,
    timeout: Duration,
    gate: &'static WorkerGate,
) -> Result<Vec<f64>, SolveError> {
    if timeout.is_zero() {
        return Err(SolveError::Timeout(timeout));
    }
    let abandoned = gate.abandoned();
    if abandoned >= gate.limit {
        return Err(SolveError::Saturated(abandoned));
    }

    let state = Arc::new(AtomicU8::new(RUNNING));
    let worker_state = Arc::clone(&state);
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("kitplan-milp".into())
        .spawn(move || {
            let result = catch_unwind(AssertUnwindSafe(|| solve(&program)))
                .unwrap_or_else(|_| Err(SolveError::Solver("solver panicked".into())));
            let finished = worker_state
                .compare_exchange(RUNNING, DONE, Ordering::AcqRel, Ordering::Acquire)
                .is_ok();
            if finished {
                let _ = tx.send(result);
            } else {
                gate.abandoned.fetch_sub(1, Ordering::AcqRel);
            }
        })
        .map_err(|err| SolveError::Solver(err.to_string()))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            gate.abandoned.fetch_add(1, Ordering::AcqRel);
            let abandoned = state
                .compare_exchange(RUNNING, ABANDONED, Ordering::AcqRel, Ordering::Acquire)
                .is_ok();
            if abandoned {
                Err(SolveError::Timeout(timeout))
            } else {
                // The worker finished between the timeout and the hand-off.
                gate.abandoned.fetch_sub(1, Ordering::AcqRel);
                rx.recv().unwrap_or(Err(SolveError::WorkerLost))
            }
        }
        Err(RecvTimeoutError::Disconnected) => Err(SolveError::WorkerLost),
    }
}
