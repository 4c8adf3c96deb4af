//! Interpreter state and execution.
//!
//! The interpreter owns every piece of state a run touches: the global
//! scope, the frame stack, the captured stdout buffer, and the trace.
//! Nothing lives in process globals, so a fresh interpreter always
//! starts clean and concurrent runs cannot observe each other.
//!
//! Trace contract: one step event is recorded immediately before each
//! statement executes, carrying the executing frame's variables in
//! creation order. A `while` header records an extra event before
//! every re-check, so the trace follows the dynamic path through the
//! script. When a statement fails, [`Interpreter::run`] removes the
//! event recorded for that statement, leaving only the events of
//! statements that completed. The failing event is not always the
//! trailing one: a call that completes inside the failing statement's
//! expression appends its callee events afterwards, and those stay.

use std::rc::Rc;

use indexmap::IndexMap;

use steptrace_core::ast::{BinOp, Expr, FnDecl, Program, Stmt, Target};
use steptrace_core::repr::{display, repr};
use steptrace_core::trace::TraceEvent;
use steptrace_core::value::{Args, Builtin, Value};

use super::builtins;
use super::error::RuntimeError;
use super::eval::{binary_op, index_value, resolve_index, unary_op};

/// One variable scope: name to value, in creation order.
pub(crate) type Scope = IndexMap<String, Value>;

/// Limits applied to a run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Maximum number of nested calls before the run fails.
    pub max_call_depth: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            max_call_depth: 256,
        }
    }
}

/// Control-flow signal produced by executing a statement.
#[derive(Debug)]
enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// One function invocation's scope.
#[derive(Debug)]
struct Frame {
    locals: Scope,
}

/// Tree-walking interpreter for a single run of one program.
pub struct Interpreter<'p> {
    program: &'p Program,
    /// Top-level variables.
    globals: Scope,
    /// Active function frames, innermost last. Empty at top level.
    frames: Vec<Frame>,
    /// Everything the script printed so far.
    stdout: String,
    /// Step events recorded so far.
    trace: Vec<TraceEvent>,
    /// Index of the event recorded for the statement that raised.
    /// Claimed by the innermost failing statement as the error
    /// unwinds; enclosing statements leave it untouched.
    failed_event: Option<usize>,
    config: RunConfig,
}

impl<'p> Interpreter<'p> {
    /// Creates an interpreter for one run of `program`.
    pub fn new(program: &'p Program, config: RunConfig) -> Self {
        Interpreter {
            program,
            globals: Scope::new(),
            frames: Vec::new(),
            stdout: String::new(),
            trace: Vec::new(),
            failed_event: None,
            config,
        }
    }

    /// Executes the program from its first statement.
    ///
    /// On failure, the event recorded for the statement that raised is
    /// removed: the trace keeps only statements that completed, and a
    /// call finishing inside the failing expression leaves its callee
    /// events in place after the removal point.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        let program = self.program;
        match self.exec_block(&program.stmts) {
            Ok(_) => Ok(()),
            Err(err) => {
                if let Some(idx) = self.failed_event.take() {
                    self.trace.remove(idx);
                }
                Err(err)
            }
        }
    }

    /// Captured stdout so far.
    pub fn captured_stdout(&self) -> &str {
        &self.stdout
    }

    /// Recorded trace so far.
    pub fn trace(&self) -> &[TraceEvent] {
        &self.trace
    }

    /// Number of active function frames.
    pub fn call_depth(&self) -> usize {
        self.frames.len()
    }

    /// The limits this interpreter was created with.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Consumes the interpreter, yielding captured stdout and trace.
    pub fn into_parts(self) -> (String, Vec<TraceEvent>) {
        (self.stdout, self.trace)
    }

    // ------------------------------------------------------------------
    // Statement execution
    // ------------------------------------------------------------------

    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<Flow, RuntimeError> {
        for stmt in stmts {
            let step = self.record_step(stmt.line());
            match self.exec_stmt(stmt) {
                Ok(Flow::Normal) => {}
                Ok(flow) => return Ok(flow),
                Err(err) => {
                    // the innermost failing statement claims the
                    // cleanup; enclosing statements keep their events
                    self.failed_event.get_or_insert(step);
                    return Err(err);
                }
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Assign {
                target,
                value,
                line,
            } => {
                let value = self.eval_expr(value, *line)?;
                match target {
                    Target::Name(name) => self.bind(name.clone(), value),
                    indexed => {
                        let (name, path) = self.resolve_place(indexed, *line)?;
                        self.write_place(&name, &path, value, *line)?;
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::AugAssign {
                target,
                op,
                value,
                line,
            } => {
                // the place is resolved once, so index expressions in
                // the target evaluate a single time
                let (name, path) = self.resolve_place(target, *line)?;
                let current = self.read_place(&name, &path, *line)?;
                let rhs = self.eval_expr(value, *line)?;
                let result = binary_op(*op, current, rhs, *line)?;
                self.write_place(&name, &path, result, *line)?;
                Ok(Flow::Normal)
            }
            Stmt::Expr { expr, line } => {
                self.eval_expr(expr, *line)?;
                Ok(Flow::Normal)
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
                line,
            } => {
                if self.eval_condition(cond, *line)? {
                    self.exec_block(then_body)
                } else if let Some(else_body) = else_body {
                    self.exec_block(else_body)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While { cond, body, line } => {
                // the enclosing block recorded the event for the first
                // check; each re-check records its own and claims any
                // failure raised while re-evaluating the condition
                let mut step = None;
                loop {
                    match self.eval_condition(cond, *line) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(err) => {
                            if let Some(idx) = step {
                                self.failed_event.get_or_insert(idx);
                            }
                            return Err(err);
                        }
                    }
                    match self.exec_block(body)? {
                        Flow::Normal | Flow::Continue => {}
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                    // the header is observed again before re-checking
                    step = Some(self.record_step(*line));
                }
                Ok(Flow::Normal)
            }
            Stmt::FnDef { decl } => {
                self.bind(decl.name.clone(), Value::Fn(Rc::clone(decl)));
                Ok(Flow::Normal)
            }
            Stmt::Return { value, line } => {
                let result = match value {
                    Some(expr) => self.eval_expr(expr, *line)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(result))
            }
            Stmt::Raise { message, line } => {
                let value = self.eval_expr(message, *line)?;
                Err(RuntimeError::Raised {
                    message: display(&value),
                })
            }
            Stmt::Break { .. } => Ok(Flow::Break),
            Stmt::Continue { .. } => Ok(Flow::Continue),
        }
    }

    /// Snapshots the executing frame's variables into a step event and
    /// returns the event's index in the trace.
    fn record_step(&mut self, line: u32) -> usize {
        let scope = match self.frames.last() {
            Some(frame) => &frame.locals,
            None => &self.globals,
        };
        let locals = scope
            .iter()
            .map(|(name, value)| (name.clone(), repr(value)))
            .collect();
        self.trace.push(TraceEvent::step(line, locals));
        self.trace.len() - 1
    }

    // ------------------------------------------------------------------
    // Expression evaluation
    // ------------------------------------------------------------------

    fn eval_expr(&mut self, expr: &Expr, line: u32) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Float(x) => Ok(Value::Float(*x)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Nil => Ok(Value::Nil),
            Expr::Name(name) => self.lookup(name, line),
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item, line)?);
                }
                Ok(Value::List(values))
            }
            Expr::Binary {
                op: BinOp::And,
                lhs,
                rhs,
            } => {
                if !self.eval_logic_operand(lhs, BinOp::And, line)? {
                    return Ok(Value::Bool(false));
                }
                let rhs = self.eval_logic_operand(rhs, BinOp::And, line)?;
                Ok(Value::Bool(rhs))
            }
            Expr::Binary {
                op: BinOp::Or,
                lhs,
                rhs,
            } => {
                if self.eval_logic_operand(lhs, BinOp::Or, line)? {
                    return Ok(Value::Bool(true));
                }
                let rhs = self.eval_logic_operand(rhs, BinOp::Or, line)?;
                Ok(Value::Bool(rhs))
            }
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval_expr(lhs, line)?;
                let rhs = self.eval_expr(rhs, line)?;
                binary_op(*op, lhs, rhs, line)
            }
            Expr::Unary { op, operand } => {
                let operand = self.eval_expr(operand, line)?;
                unary_op(*op, operand, line)
            }
            Expr::Index { base, index } => {
                let base = self.eval_expr(base, line)?;
                let index = self.eval_expr(index, line)?;
                index_value(base, index, line)
            }
            Expr::Call { callee, args } => {
                let callee = self.eval_expr(callee, line)?;
                let mut values = Args::new();
                for arg in args {
                    values.push(self.eval_expr(arg, line)?);
                }
                self.call_value(callee, values, line)
            }
        }
    }

    fn eval_condition(&mut self, cond: &Expr, line: u32) -> Result<bool, RuntimeError> {
        match self.eval_expr(cond, line)? {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::ConditionNotBool {
                got: other.type_name(),
                line,
            }),
        }
    }

    fn eval_logic_operand(
        &mut self,
        expr: &Expr,
        op: BinOp,
        line: u32,
    ) -> Result<bool, RuntimeError> {
        match self.eval_expr(expr, line)? {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::LogicNotBool {
                op,
                got: other.type_name(),
                line,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------

    fn call_value(&mut self, callee: Value, args: Args, line: u32) -> Result<Value, RuntimeError> {
        match callee {
            Value::Fn(decl) => self.call_function(&decl, args, line),
            Value::Builtin(builtin) => {
                let outcome = builtins::call_builtin(builtin, &args, line)?;
                if let Some(text) = outcome.printed {
                    self.stdout.push_str(&text);
                }
                Ok(outcome.value)
            }
            other => Err(RuntimeError::NotCallable {
                type_name: other.type_name(),
                line,
            }),
        }
    }

    fn call_function(
        &mut self,
        decl: &Rc<FnDecl>,
        args: Args,
        line: u32,
    ) -> Result<Value, RuntimeError> {
        if args.len() != decl.params.len() {
            return Err(RuntimeError::WrongArity {
                name: decl.name.clone(),
                expected: decl.params.len(),
                got: args.len(),
                line,
            });
        }
        if self.frames.len() >= self.config.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.config.max_call_depth,
                line,
            });
        }
        let mut locals = Scope::new();
        for (param, arg) in decl.params.iter().zip(args) {
            locals.insert(param.clone(), arg);
        }
        self.frames.push(Frame { locals });
        let result = self.exec_block(&decl.body);
        self.frames.pop();
        match result? {
            Flow::Return(value) => Ok(value),
            _ => Ok(Value::Nil),
        }
    }

    // ------------------------------------------------------------------
    // Scopes and places
    // ------------------------------------------------------------------

    /// Resolves a name: innermost frame first, then globals, then the
    /// builtins. There are no closures; a function body sees its own
    /// frame and the globals only.
    fn lookup(&self, name: &str, line: u32) -> Result<Value, RuntimeError> {
        if let Some(frame) = self.frames.last() {
            if let Some(value) = frame.locals.get(name) {
                return Ok(value.clone());
            }
        }
        if let Some(value) = self.globals.get(name) {
            return Ok(value.clone());
        }
        if let Some(builtin) = Builtin::lookup(name) {
            return Ok(Value::Builtin(builtin));
        }
        Err(RuntimeError::UndefinedVariable {
            name: name.to_string(),
            line,
        })
    }

    /// Binds a name in the executing scope. Re-binding keeps the
    /// name's original position in the scope's creation order.
    fn bind(&mut self, name: String, value: Value) {
        let scope = match self.frames.last_mut() {
            Some(frame) => &mut frame.locals,
            None => &mut self.globals,
        };
        scope.insert(name, value);
    }

    /// Resolves an assignment target to its variable name plus the
    /// index path inside it, evaluating and bounds-checking each index
    /// expression exactly once.
    fn resolve_place(
        &mut self,
        target: &Target,
        line: u32,
    ) -> Result<(String, Vec<usize>), RuntimeError> {
        match target {
            Target::Name(name) => Ok((name.clone(), Vec::new())),
            Target::Index { base, index } => {
                let (name, mut path) = self.resolve_place(base, line)?;
                let container = self.read_place(&name, &path, line)?;
                let index_val = self.eval_expr(index, line)?;
                let idx = match index_val {
                    Value::Int(n) => n,
                    other => {
                        return Err(RuntimeError::IndexNotInt {
                            got: other.type_name(),
                            line,
                        })
                    }
                };
                let resolved = match &container {
                    Value::List(items) => resolve_index(idx, items.len(), line)?,
                    other => {
                        return Err(RuntimeError::NotAssignable {
                            base: other.type_name(),
                            line,
                        })
                    }
                };
                path.push(resolved);
                Ok((name, path))
            }
        }
    }

    /// Reads the value at a resolved place.
    fn read_place(&self, name: &str, path: &[usize], line: u32) -> Result<Value, RuntimeError> {
        let mut value = self.lookup(name, line)?;
        for &idx in path {
            value = index_value(value, Value::Int(idx as i64), line)?;
        }
        Ok(value)
    }

    /// Writes a value through a resolved place. A plain name binds in
    /// the executing scope; an element write mutates the list where
    /// the name already lives, frame or global.
    fn write_place(
        &mut self,
        name: &str,
        path: &[usize],
        value: Value,
        line: u32,
    ) -> Result<(), RuntimeError> {
        if path.is_empty() {
            self.bind(name.to_string(), value);
            return Ok(());
        }
        let mut slot = self.lookup_slot_mut(name, line)?;
        for &idx in path {
            slot = match slot {
                Value::List(items) => {
                    let len = items.len();
                    items.get_mut(idx).ok_or(RuntimeError::IndexOutOfRange {
                        index: idx as i64,
                        len,
                        line,
                    })?
                }
                other => {
                    return Err(RuntimeError::NotAssignable {
                        base: other.type_name(),
                        line,
                    })
                }
            };
        }
        *slot = value;
        Ok(())
    }

    fn lookup_slot_mut(&mut self, name: &str, line: u32) -> Result<&mut Value, RuntimeError> {
        let in_frame = self
            .frames
            .last()
            .is_some_and(|frame| frame.locals.contains_key(name));
        let slot = if in_frame {
            self.frames
                .last_mut()
                .and_then(|frame| frame.locals.get_mut(name))
        } else {
            self.globals.get_mut(name)
        };
        slot.ok_or_else(|| RuntimeError::UndefinedVariable {
            name: name.to_string(),
            line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn run_program(source: &str) -> (Result<(), RuntimeError>, String, Vec<TraceEvent>) {
        let program = parse(source).unwrap();
        let mut interpreter = Interpreter::new(&program, RunConfig::default());
        let outcome = interpreter.run();
        let (stdout, trace) = interpreter.into_parts();
        (outcome, stdout, trace)
    }

    #[test]
    fn config_default_values() {
        let config = RunConfig::default();
        assert_eq!(config.max_call_depth, 256);
    }

    #[test]
    fn run_records_one_event_per_statement() {
        let (outcome, stdout, trace) = run_program("x = 1\nprint(x)\nx = x + 1\n");
        assert!(outcome.is_ok());
        assert_eq!(stdout, "1\n");
        assert_eq!(trace.len(), 3);
    }

    #[test]
    fn failed_run_removes_the_failing_statements_event() {
        let (outcome, _, trace) = run_program("x = 1\ny = x / 0\n");
        assert!(outcome.is_err());
        let lines: Vec<u32> = trace.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![1]);
    }

    #[test]
    fn callee_events_after_the_failing_event_are_kept() {
        let (outcome, _, trace) =
            run_program("fn one() {\n    return 1\n}\nx = one() + [1][5]\n");
        assert!(outcome.is_err());
        let lines: Vec<u32> = trace.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![1, 2]);
    }

    #[test]
    fn call_depth_returns_to_zero_after_calls() {
        let source = "fn f() {\n    return 1\n}\nf()\n";
        let program = parse(source).unwrap();
        let mut interpreter = Interpreter::new(&program, RunConfig::default());
        interpreter.run().unwrap();
        assert_eq!(interpreter.call_depth(), 0);
    }

    #[test]
    fn accessors_expose_captured_state() {
        let program = parse("print(\"hi\")\n").unwrap();
        let mut interpreter = Interpreter::new(&program, RunConfig::default());
        interpreter.run().unwrap();
        assert_eq!(interpreter.captured_stdout(), "hi\n");
        assert_eq!(interpreter.trace().len(), 1);
        assert_eq!(interpreter.config().max_call_depth, 256);
    }
}
