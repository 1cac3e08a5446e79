//! Expression evaluation against a variable/property scope.

use crate::ast::{CmpOp, Expr, Leaf};
use crate::error::EvalError;
use crate::value::Value;

/// Identifier prefix that routes lookup to the property bag instead of the
/// variable bag.
pub const PROPERTY_PREFIX: &str = "properties.";

/// Name lookup surface an expression is evaluated against.
///
/// The graph model's node implements this; tests can provide ad-hoc scopes.
pub trait Scope {
    /// Look up a runtime variable.
    fn var(&self, name: &str) -> Option<&Value>;

    /// Look up an immutable property (the `properties.` prefix is already
    /// stripped by the evaluator).
    fn property(&self, name: &str) -> Option<&Value>;
}

fn lookup<'a, S: Scope + ?Sized>(scope: &'a S, name: &str) -> Option<&'a Value> {
    match name.strip_prefix(PROPERTY_PREFIX) {
        Some(prop) => scope.property(prop),
        None => scope.var(name),
    }
}

/// Apply an ordering comparison after coercing both sides to numbers.
fn ordered(lv: &Value, rv: &Value, cmp: fn(f64, f64) -> bool) -> Result<bool, EvalError> {
    let ln = lv.as_number().ok_or(EvalError::NonNumeric {
        type_name: lv.type_name(),
    })?;
    let rn = rv.as_number().ok_or(EvalError::NonNumeric {
        type_name: rv.type_name(),
    })?;
    Ok(cmp(ln, rn))
}

impl Expr {
    /// Evaluate the expression to a boolean. Never writes to the scope.
    ///
    /// An absent name is false in boolean position; the same name used as a
    /// comparison operand is an [`EvalError`]. `&&` and `||` short-circuit,
    /// so the right operand of a decided conjunction is never evaluated and
    /// cannot raise.
    pub fn eval<S: Scope + ?Sized>(&self, scope: &S) -> Result<bool, EvalError> {
        match self {
            Expr::Leaf(Leaf::Lit(value)) => Ok(value.truthy()),
            Expr::Leaf(Leaf::Ident(name)) => {
                Ok(lookup(scope, name).map(Value::truthy).unwrap_or(false))
            }
            Expr::Not(inner) => Ok(!inner.eval(scope)?),
            Expr::And(left, right) => Ok(left.eval(scope)? && right.eval(scope)?),
            Expr::Or(left, right) => Ok(left.eval(scope)? || right.eval(scope)?),
            Expr::Cmp { op, left, right } => {
                let lv = left.operand_value(scope)?;
                let rv = right.operand_value(scope)?;
                match op {
                    CmpOp::Eq => Ok(lv.loose_eq(&rv)),
                    CmpOp::Ne => Ok(!lv.loose_eq(&rv)),
                    CmpOp::Lt => ordered(&lv, &rv, |l, r| l < r),
                    CmpOp::Le => ordered(&lv, &rv, |l, r| l <= r),
                    CmpOp::Gt => ordered(&lv, &rv, |l, r| l > r),
                    CmpOp::Ge => ordered(&lv, &rv, |l, r| l >= r),
                }
            }
        }
    }

    /// The value of this subtree in comparison-operand position: a literal
    /// is itself, an identifier must resolve, and a nested boolean
    /// expression wraps its result.
    fn operand_value<S: Scope + ?Sized>(&self, scope: &S) -> Result<Value, EvalError> {
        match self {
            Expr::Leaf(Leaf::Lit(value)) => Ok(value.clone()),
            Expr::Leaf(Leaf::Ident(name)) => match lookup(scope, name) {
                Some(value) => Ok(value.clone()),
                None => match name.strip_prefix(PROPERTY_PREFIX) {
                    Some(prop) => Err(EvalError::UnknownProperty {
                        name: prop.to_string(),
                    }),
                    None => Err(EvalError::UnknownVar {
                        name: name.clone(),
                    }),
                },
            },
            _ => Ok(Value::Bool(self.eval(scope)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::compile;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct TestScope {
        vars: BTreeMap<String, Value>,
        properties: BTreeMap<String, Value>,
    }

    impl TestScope {
        fn with_var(mut self, name: &str, value: impl Into<Value>) -> Self {
            self.vars.insert(name.to_string(), value.into());
            self
        }

        fn with_property(mut self, name: &str, value: impl Into<Value>) -> Self {
            self.properties.insert(name.to_string(), value.into());
            self
        }
    }

    impl Scope for TestScope {
        fn var(&self, name: &str) -> Option<&Value> {
            self.vars.get(name)
        }

        fn property(&self, name: &str) -> Option<&Value> {
            self.properties.get(name)
        }
    }

    fn eval(src: &str, scope: &TestScope) -> bool {
        compile(src).unwrap().eval(scope).unwrap()
    }

    #[test]
    fn test_literal_truthiness() {
        let scope = TestScope::default();
        assert!(eval("true", &scope));
        assert!(!eval("false", &scope));
        assert!(eval("1", &scope));
        assert!(!eval("0", &scope));
        assert!(eval("\"x\"", &scope));
        assert!(!eval("\"\"", &scope));
    }

    #[test]
    fn test_variable_truthiness_round_trip() {
        // A bound variable in boolean position behaves exactly like the
        // truthiness of its value.
        let values: Vec<Value> = vec![
            Value::Bool(true),
            Value::Bool(false),
            Value::Int(0),
            Value::Int(9),
            Value::Float(0.0),
            Value::Float(-2.5),
            Value::from(""),
            Value::from("y"),
        ];
        for value in values {
            let scope = TestScope::default().with_var("v", value.clone());
            assert_eq!(eval("v", &scope), value.truthy(), "value {value}");
        }
    }

    #[test]
    fn test_absent_variable_is_false_in_boolean_position() {
        let scope = TestScope::default();
        assert!(!eval("missing", &scope));
        assert!(eval("!missing", &scope));
    }

    #[test]
    fn test_absent_variable_fails_in_comparison() {
        let scope = TestScope::default();
        let err = compile("missing > 0").unwrap().eval(&scope).unwrap_err();
        assert_eq!(err, EvalError::UnknownVar { name: "missing".into() });
    }

    #[test]
    fn test_absent_property_fails_in_comparison() {
        let scope = TestScope::default();
        let err = compile("properties.ghost == 1")
            .unwrap()
            .eval(&scope)
            .unwrap_err();
        assert_eq!(err, EvalError::UnknownProperty { name: "ghost".into() });
    }

    #[test]
    fn test_property_lookup() {
        let scope = TestScope::default().with_property("name", "TestNode");
        assert!(eval("properties.name == \"TestNode\"", &scope));
        assert!(!eval("properties.name == \"Other\"", &scope));
    }

    #[test]
    fn test_property_and_var_bags_are_distinct() {
        let scope = TestScope::default()
            .with_var("name", "var-side")
            .with_property("name", "prop-side");
        assert!(eval("name == \"var-side\"", &scope));
        assert!(eval("properties.name == \"prop-side\"", &scope));
    }

    #[test]
    fn test_short_circuit_and() {
        // `false && X` never evaluates X, so the unknown-name error in the
        // comparison is unreachable.
        let scope = TestScope::default();
        assert!(!eval("false && missing > 0", &scope));
    }

    #[test]
    fn test_short_circuit_or() {
        let scope = TestScope::default();
        assert!(eval("true || missing > 0", &scope));
    }

    #[test]
    fn test_numeric_comparisons() {
        let scope = TestScope::default().with_var("count", 1i64);
        assert!(eval("count < 2", &scope));
        assert!(eval("count <= 1", &scope));
        assert!(eval("count > 0", &scope));
        assert!(eval("count >= 1", &scope));
        assert!(!eval("count > 1", &scope));
    }

    #[test]
    fn test_int_float_widening_in_equality() {
        let scope = TestScope::default().with_var("x", 2i64);
        assert!(eval("x == 2.0", &scope));
        assert!(!eval("x != 2.0", &scope));
    }

    #[test]
    fn test_int_float_widening_in_ordering() {
        let scope = TestScope::default().with_var("x", 2i64);
        assert!(eval("x < 2.5", &scope));
        assert!(eval("x >= 1.5", &scope));
    }

    #[test]
    fn test_no_boolean_coercion_in_equality() {
        let scope = TestScope::default().with_var("flag", true);
        assert!(!eval("flag == 1", &scope));
        assert!(eval("flag == true", &scope));
    }

    #[test]
    fn test_ordering_rejects_non_numeric() {
        let scope = TestScope::default().with_var("name", "abc");
        let err = compile("name < 5").unwrap().eval(&scope).unwrap_err();
        assert_eq!(err, EvalError::NonNumeric { type_name: "string" });

        let scope = TestScope::default().with_var("flag", true);
        let err = compile("flag >= 0").unwrap().eval(&scope).unwrap_err();
        assert_eq!(err, EvalError::NonNumeric { type_name: "boolean" });
    }

    #[test]
    fn test_nested_expression_as_comparison_operand() {
        // A parenthesized boolean subtree wraps its result as a bool value.
        let scope = TestScope::default().with_var("a", true);
        assert!(eval("(a || false) == true", &scope));
    }

    #[test]
    fn test_negative_number_regressions() {
        let scope = TestScope::default().with_var("x", 5i64);
        assert!(!eval("-1 > 0", &scope));
        assert!(eval("-5 < 0", &scope));
        assert!(eval("x > -1", &scope));
        assert!(!eval("x == -5", &scope));
        assert!(eval("-10 != -5", &scope));
        assert!(eval("-3.14 < 0", &scope));
        assert!(eval("-0 == 0", &scope));
    }

    #[test]
    fn test_compound_guard() {
        let scope = TestScope::default()
            .with_var("enabled", true)
            .with_var("count", 0i64);
        assert!(eval("enabled && count >= 0", &scope));
        assert!(!eval("!enabled || count >= 2", &scope));
    }

    #[test]
    fn test_guard_against_uninitialized_node() {
        // The absent-is-false asymmetry: `enabled && count > 0` must not
        // raise when `enabled` was never set.
        let scope = TestScope::default();
        assert!(!eval("enabled && count > 0", &scope));
    }

    #[test]
    fn test_eval_is_pure() {
        let scope = TestScope::default().with_var("n", 3i64);
        let expr = compile("n > 1 && n < 5").unwrap();
        assert!(expr.eval(&scope).unwrap());
        assert!(expr.eval(&scope).unwrap());
        assert_eq!(scope.vars.len(), 1);
    }
}
