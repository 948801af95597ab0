//! Sandboxed condition-expression evaluation
//!
//! Decision conditions are CEL expressions over a single bound variable named
//! `data`, the instance context. Evaluation can only see that variable; a
//! failing expression evaluates to `false` rather than surfacing an error, so
//! one malformed rule cannot take down a running instance.

use cel_interpreter::{Context, Program, Value as CelValue};
use lru::LruCache;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Default capacity of the compiled-program cache
pub const DEFAULT_PROGRAM_CACHE_SIZE: usize = 500;

/// Evaluates condition expressions against instance context data
///
/// Compiled programs are cached per expression string; re-evaluating the same
/// rule across transitions only pays the compile cost once.
pub struct ConditionEvaluator {
    programs: Mutex<LruCache<String, Arc<Program>>>,
}

impl ConditionEvaluator {
    /// Create an evaluator with the default cache capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_PROGRAM_CACHE_SIZE)
    }

    /// Create an evaluator with a custom cache capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or(NonZeroUsize::new(DEFAULT_PROGRAM_CACHE_SIZE).unwrap());
        Self {
            programs: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Evaluate `expression` against `data`, bound as the `data` variable
    ///
    /// Any compile or runtime failure (malformed expression, missing field,
    /// type error) evaluates to `false`.
    pub fn evaluate(&self, expression: &str, data: &Value) -> bool {
        match self.try_evaluate(expression, data) {
            Ok(result) => result,
            Err(reason) => {
                tracing::warn!("Condition '{expression}' evaluated to false: {reason}");
                false
            }
        }
    }

    fn try_evaluate(&self, expression: &str, data: &Value) -> Result<bool, String> {
        let program = self.get_or_compile(expression)?;

        let mut context = Context::default();
        context
            .add_variable("data", data.clone())
            .map_err(|e| format!("failed to bind context data: {e}"))?;

        let value = program
            .execute(&context)
            .map_err(|e| format!("execution failed: {e}"))?;

        Ok(Self::value_to_bool(&value))
    }

    fn get_or_compile(&self, expression: &str) -> Result<Arc<Program>, String> {
        let mut programs = self.programs.lock().unwrap();
        if let Some(program) = programs.get(expression) {
            return Ok(program.clone());
        }

        let program = Arc::new(
            Program::compile(expression).map_err(|e| format!("compilation failed: {e}"))?,
        );
        programs.put(expression.to_string(), program.clone());
        Ok(program)
    }

    /// Coerce a CEL result to the transition decision
    ///
    /// Mirrors JavaScript truthiness for the scalar types condition authors
    /// actually produce; anything else counts as no match.
    fn value_to_bool(value: &CelValue) -> bool {
        match value {
            CelValue::Bool(b) => *b,
            CelValue::Int(i) => *i != 0,
            CelValue::UInt(u) => *u != 0,
            CelValue::Float(f) => *f != 0.0,
            CelValue::String(s) => !s.is_empty(),
            _ => false,
        }
    }
}

impl Default for ConditionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
