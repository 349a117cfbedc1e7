//! Precondition contracts for functions.
//!
//! [`pre`] turns a [`Function`] (a body plus a [`SignatureReader`]) and a
//! specification callback into a [`Guarded`] function. Each call:
//!
//! 1. recovers the declared parameter names,
//! 2. creates a fresh [`Messenger`] with the precondition policy,
//! 3. binds every parameter to an [`Assertion`] over the matching argument
//!    ([`Value::Missing`] when the caller supplied fewer arguments),
//! 4. runs the specification against those [`Bindings`],
//! 5. invokes the body only when every recorded check passed.
//!
//! The first failing check returns [`PreconditionError`] through `?`, which
//! skips the rest of the specification and the body.
//!
//! [`PreconditionError`]: covenant_core::PreconditionError

pub mod signature;

use std::ops::Index;

use covenant_core::{ContractError, ReportSnapshot, UsageError, Value};
use indexmap::IndexMap;

use crate::assertion::Assertion;
use crate::messenger::Messenger;

use self::signature::SignatureReader;

/// Parameter bindings handed to a specification.
///
/// Index by parameter name (`p["d"]`) or use [`Bindings::param`] for a
/// fallible lookup. The `enforce*` methods build extra assertions bound to
/// the same messenger.
#[derive(Debug)]
pub struct Bindings<'m> {
    messenger: &'m Messenger,
    params: IndexMap<String, Assertion<'m>>,
}

impl<'m> Bindings<'m> {
    /// Binds `names[i]` to `args[i]`, or to `Missing` past the end of `args`.
    pub fn new(messenger: &'m Messenger, names: &[String], args: &[Value]) -> Self {
        let params = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let value = args.get(i).cloned().unwrap_or(Value::Missing);
                (name.clone(), Assertion::new(messenger, value, name.clone()))
            })
            .collect();
        Bindings { messenger, params }
    }

    pub fn param(&self, name: &str) -> Result<&Assertion<'m>, UsageError> {
        self.params
            .get(name)
            .ok_or_else(|| UsageError::UnknownParameter {
                name: name.to_string(),
            })
    }

    /// Parameter names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn messenger(&self) -> &'m Messenger {
        self.messenger
    }

    /// Ad hoc assertion over `value` with an empty name.
    pub fn enforce(&self, value: impl Into<Value>) -> Assertion<'m> {
        Assertion::unnamed(self.messenger, value)
    }

    /// Ad hoc assertion over `value`, named by `description`.
    pub fn enforce_named(
        &self,
        description: impl Into<String>,
        value: impl Into<Value>,
    ) -> Assertion<'m> {
        Assertion::new(self.messenger, value, description)
    }

    /// Variadic form of `enforce`.
    ///
    /// One argument is the value; two are `(description, value)`, where a
    /// falsy description leaves the name empty. Extra arguments are ignored.
    /// No argument at all is a [`UsageError::MissingValue`].
    pub fn enforce_with(&self, args: &[Value]) -> Result<Assertion<'m>, UsageError> {
        match args {
            [] => Err(UsageError::MissingValue),
            [value] => Ok(self.enforce(value.clone())),
            [description, value, ..] => {
                let name = if description.is_truthy() {
                    description.to_string()
                } else {
                    String::new()
                };
                Ok(self.enforce_named(name, value.clone()))
            }
        }
    }
}

impl<'m> Index<&str> for Bindings<'m> {
    type Output = Assertion<'m>;

    /// Panics on names the function does not declare; see [`Bindings::param`].
    fn index(&self, name: &str) -> &Assertion<'m> {
        match self.params.get(name) {
            Some(assertion) => assertion,
            None => panic!("unknown parameter: '{}'", name),
        }
    }
}

/// A function body paired with the reader of its parameter names.
#[derive(Debug, Clone)]
pub struct Function<S, F> {
    signature: S,
    body: F,
}

/// Pairs `body` with its declared parameters.
pub fn function<S, F, R>(signature: S, body: F) -> Function<S, F>
where
    S: SignatureReader,
    F: Fn(&[Value]) -> R,
{
    Function { signature, body }
}

impl<S: SignatureReader, F> Function<S, F> {
    pub fn signature(&self) -> &S {
        &self.signature
    }

    /// Calls the body without any contract.
    pub fn call<R>(&self, args: &[Value]) -> R
    where
        F: Fn(&[Value]) -> R,
    {
        (self.body)(args)
    }
}

/// A function whose calls are gated by a precondition specification.
#[derive(Debug, Clone)]
pub struct Guarded<S, F, C> {
    function: Function<S, F>,
    specifications: C,
}

/// Guards `function` with `specifications`.
pub fn pre<S, F, C, R>(function: Function<S, F>, specifications: C) -> Guarded<S, F, C>
where
    S: SignatureReader,
    F: Fn(&[Value]) -> R,
    C: Fn(&Bindings<'_>) -> Result<(), ContractError>,
{
    Guarded {
        function,
        specifications,
    }
}

impl<S, F, C> Guarded<S, F, C>
where
    S: SignatureReader,
    C: Fn(&Bindings<'_>) -> Result<(), ContractError>,
{
    /// Checks the preconditions for `args`, then calls the body.
    ///
    /// Returns `Ok(None)` without calling the body when a failure was
    /// recorded but the specification swallowed the error.
    pub fn call<R>(&self, args: &[Value]) -> Result<Option<R>, ContractError>
    where
        F: Fn(&[Value]) -> R,
    {
        let messenger = Messenger::precondition();
        self.run(&messenger, args)
    }

    /// Like [`Guarded::call`], also returning every check recorded on the way.
    pub fn call_traced<R>(
        &self,
        args: &[Value],
    ) -> (Result<Option<R>, ContractError>, Vec<ReportSnapshot>)
    where
        F: Fn(&[Value]) -> R,
    {
        let messenger = Messenger::precondition();
        let outcome = self.run(&messenger, args);
        (outcome, messenger.as_array())
    }

    fn run<R>(&self, messenger: &Messenger, args: &[Value]) -> Result<Option<R>, ContractError>
    where
        F: Fn(&[Value]) -> R,
    {
        let names = self.function.signature.parameter_names()?;
        let bindings = Bindings::new(messenger, &names, args);
        (self.specifications)(&bindings)?;

        if messenger.all_passed() {
            Ok(Some(self.function.call(args)))
        } else {
            tracing::warn!(
                failed = messenger.count_failed(),
                "precondition failure swallowed by specification, call suppressed"
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use covenant_core::{AssertError, SignatureError};

    use super::signature::{Declaration, Params};
    use super::*;
    use crate::assertion::Checks;

    fn num(args: &[Value], i: usize) -> f64 {
        match args.get(i) {
            Some(Value::Int(n)) => *n as f64,
            Some(Value::Float(x)) => *x,
            _ => f64::NAN,
        }
    }

    #[test]
    fn divide_scenario() {
        let divide = pre(
            function(Declaration::new("function divide(n, d){ return n/d; }"), |args: &[Value]| {
                num(args, 0) / num(args, 1)
            }),
            |p| {
                p["d"].not.equals(0)?;
                Ok(())
            },
        );

        assert_eq!(divide.call(&[Value::from(10), Value::from(2)]), Ok(Some(5.0)));

        let err = divide.call(&[Value::from(10), Value::from(0)]).unwrap_err();
        let message = err.as_precondition().map(|e| e.message.clone()).unwrap();
        assert!(message.contains('d'));
        assert!(message.contains("not equals"));
        assert!(message.contains('0'));
        assert_eq!(message, "d: not equals(0, 0)");
    }

    #[test]
    fn failing_specification_never_runs_body() {
        let calls = Cell::new(0);
        let guarded = pre(
            function(["n"], |_: &[Value]| calls.set(calls.get() + 1)),
            |p| {
                p["n"].more_than(0)?;
                Ok(())
            },
        );

        assert!(guarded.call(&[Value::from(-3)]).is_err());
        assert_eq!(calls.get(), 0);
        assert_eq!(guarded.call(&[Value::from(3)]), Ok(Some(())));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn first_failure_short_circuits_later_checks() {
        let guarded = pre(function(["a", "b"], |_: &[Value]| ()), |p| {
            p["a"].exists()?;
            p["b"].exists()?;
            p["b"].truthy()?;
            Ok(())
        });

        let (outcome, reports) = guarded.call_traced(&[Value::from(1)]);
        assert_eq!(
            outcome.unwrap_err().as_precondition().map(|e| e.message.as_str()),
            Some("b: exists(undefined)")
        );
        let ids: Vec<_> = reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["exists", "exists"]);
    }

    #[test]
    fn missing_arguments_bind_missing() {
        let messenger = Messenger::collecting();
        let names = vec!["a".to_string(), "b".to_string()];
        let bindings = Bindings::new(&messenger, &names, &[Value::from(1), Value::from(2), Value::from(3)]);
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(bindings["b"].value(), &Value::from(2));

        let short = Bindings::new(&messenger, &names, &[]);
        assert!(short["a"].value().is_missing());
        assert_eq!(short["a"].name(), "a");
    }

    #[test]
    fn unknown_parameter_lookup_is_usage_error() {
        let messenger = Messenger::collecting();
        let bindings = Bindings::new(&messenger, &["a".to_string()], &[]);
        assert!(matches!(
            bindings.param("z"),
            Err(UsageError::UnknownParameter { name }) if name == "z"
        ));
    }

    #[test]
    #[should_panic(expected = "unknown parameter: 'z'")]
    fn indexing_unknown_parameter_panics() {
        let messenger = Messenger::collecting();
        let bindings = Bindings::new(&messenger, &[], &[]);
        let _ = &bindings["z"];
    }

    #[test]
    fn enforce_variants() {
        let messenger = Messenger::collecting();
        let bindings = Bindings::new(&messenger, &[], &[]);

        bindings.enforce_named("total", -1).more_than(0).unwrap();
        bindings.enforce(5).less_than(10).unwrap();
        bindings
            .enforce_with(&[Value::from("limit"), Value::from(3)])
            .unwrap()
            .truthy()
            .unwrap();
        bindings
            .enforce_with(&[Value::Null, Value::from(3)])
            .unwrap()
            .truthy()
            .unwrap();
        bindings.enforce_with(&[Value::from(7)]).unwrap().exists().unwrap();

        let reports = messenger.reports();
        assert_eq!(reports[0].id, "moreThan");
        assert!(!reports[0].pass);
        assert_eq!(reports[0].value, Value::from(-1));
        assert_eq!(reports[0].against, Some(Value::from(0)));
        assert_eq!(reports[0].name, "total");
        let names: Vec<_> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["total", "", "limit", "", ""]);
        assert_eq!(messenger.count_failed(), 1);
    }

    #[test]
    fn enforce_without_arguments_is_usage_error() {
        let guarded = pre(function(["x"], |_: &[Value]| 1), |p| {
            p.enforce_with(&[])?.truthy()?;
            Ok(())
        });
        let err = guarded.call(&[Value::from(1)]).unwrap_err();
        assert_eq!(err, ContractError::Usage(UsageError::MissingValue));
        assert!(!err.is_violation());
    }

    #[test]
    fn enforce_failure_inside_contract_is_precondition() {
        let guarded = pre(function(Params::new(["items"]), |_: &[Value]| "ok"), |p| {
            p.enforce_named("non-empty", p["items"].value().clone()).truthy()?;
            Ok(())
        });
        let err = guarded.call(&[Value::from("")]).unwrap_err();
        assert!(matches!(
            err,
            ContractError::Assert(AssertError::Precondition(ref e)) if e.message == "non-empty: truthy()"
        ));
    }

    #[test]
    fn swallowed_failure_suppresses_call() {
        let calls = Cell::new(0);
        let guarded = pre(
            function(["n"], |_: &[Value]| calls.set(calls.get() + 1)),
            |p| {
                let _ = p["n"].truthy();
                Ok(())
            },
        );
        assert_eq!(guarded.call(&[Value::from(0)]), Ok(None));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn passing_contract_returns_unguarded_result() {
        let add = function(["a", "b"], |args: &[Value]| num(args, 0) + num(args, 1));
        let expected = add.call(&[Value::from(2), Value::from(2.5)]);
        let guarded = pre(add, |p| {
            p["a"].exists()?;
            p["b"].not.nulled()?;
            Ok(())
        });
        assert_eq!(guarded.call(&[Value::from(2), Value::from(2.5)]), Ok(Some(expected)));
    }

    #[test]
    fn signature_errors_propagate() {
        let guarded = pre(
            function(Declaration::new("function ({a})"), |_: &[Value]| ()),
            |_| Ok(()),
        );
        assert!(matches!(
            guarded.call(&[]),
            Err(ContractError::Signature(SignatureError::UnsupportedParameter { .. }))
        ));
    }
}
