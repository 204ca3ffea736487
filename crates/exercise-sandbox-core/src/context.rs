//! # Execution Context
//!
//! The dynamic calling surface over exactly one submission's resolution
//! scope: create-object and execute-method, nothing else. No listing, no
//! introspection, no bulk operations — each test must name the type and
//! method it expects, keeping the failure surface enumerable.
//!
//! A context is created once per submission per test and never reused across
//! submissions. It is stateless beyond the scope reference: no execution
//! history, no instance registry. Resolution and overload failures are
//! classified here before any submission code runs; faults raised by the
//! submission's own artifacts are caught at the call boundary and translated
//! into [`Failure::SubmissionRuntime`].

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use exercise_sandbox_types::{InstanceHandle, Value};

use crate::failure::{describe_args, Failure};
use crate::overload::{self, ResolutionReason};
use crate::scope::ResolutionScope;

/// Create-object / execute-method surface bound to one submission's scope.
#[derive(Clone)]
pub struct ExecutionContext {
    id: Uuid,
    scope: Arc<ResolutionScope>,
}

impl ExecutionContext {
    pub fn new(scope: Arc<ResolutionScope>) -> Self {
        Self {
            id: Uuid::new_v4(),
            scope,
        }
    }

    /// A new context over the same scope with its own identity. Handles
    /// created through `self` are not valid through the returned context;
    /// each test execution gets one of these.
    pub fn fresh(&self) -> Self {
        Self::new(Arc::clone(&self.scope))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn scope(&self) -> &Arc<ResolutionScope> {
        &self.scope
    }

    /// Reject instance arguments whose handles belong to a different
    /// context. Scoring them by type name alone would let one submission's
    /// object flow into another submission's code whenever the names
    /// collide.
    fn check_arg_handles(&self, args: &[Value]) -> Result<(), Failure> {
        for arg in args {
            if let Value::Instance(handle) = arg {
                if handle.context_id() != self.id {
                    return Err(Failure::harness_internal(format!(
                        "argument instance of '{}' was created by a different execution context",
                        handle.type_name()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Resolve `type_name` in this submission's scope, select a constructor
    /// against `args`, and construct an instance.
    ///
    /// The returned handle is exclusively owned by the caller; the context
    /// keeps no registry of created instances.
    pub fn create_object(&self, type_name: &str, args: &[Value]) -> Result<InstanceHandle, Failure> {
        self.check_arg_handles(args)?;

        let def = self
            .scope
            .resolve(type_name)
            .ok_or_else(|| Failure::TypeResolution {
                type_name: type_name.to_string(),
            })?;

        let ctor = overload::select(def.constructors(), args, |p, a| {
            self.scope.assign_score(p, a)
        })
        .map_err(|reason| Failure::ConstructorResolution {
            type_name: type_name.to_string(),
            reason,
            arg_types: describe_args(args),
        })?;

        debug!(type_name, argc = args.len(), "constructor resolved");

        let location = format!("{type_name} constructor");
        match catch_unwind(AssertUnwindSafe(|| ctor.construct(args))) {
            Ok(Ok(state)) => Ok(InstanceHandle::new(self.id, type_name, state)),
            Ok(Err(fault)) => Err(Failure::submission_fault(location, fault)),
            Err(payload) => Err(Failure::submission_panic(location, payload)),
        }
    }

    /// Invoke `method_name` on `handle`, dispatching virtually on the
    /// instance's runtime type: the nearest type in the inheritance chain
    /// declaring the name owns the candidate overload set, so an override
    /// always shadows the base version.
    ///
    /// A handle created by a different context fails fast as a harness
    /// internal error rather than silently resolving against the wrong
    /// scope.
    pub fn execute_method(
        &self,
        handle: &InstanceHandle,
        method_name: &str,
        args: &[Value],
    ) -> Result<Value, Failure> {
        if handle.context_id() != self.id {
            return Err(Failure::harness_internal(format!(
                "instance of '{}' was created by a different execution context",
                handle.type_name()
            )));
        }
        self.check_arg_handles(args)?;

        let runtime_type = handle.type_name();
        if !self.scope.contains(runtime_type) {
            // The handle and the scope disagree about the submission; this
            // cannot happen through the public surface.
            return Err(Failure::harness_internal(format!(
                "instance type '{runtime_type}' is absent from the owning scope"
            )));
        }

        let candidates = self
            .scope
            .inheritance_chain(runtime_type)
            .into_iter()
            .find_map(|def| def.methods_named(method_name));

        let Some(candidates) = candidates else {
            return Err(Failure::MethodResolution {
                type_name: runtime_type.to_string(),
                method: method_name.to_string(),
                reason: ResolutionReason::NoSuchCandidate,
                arg_types: describe_args(args),
            });
        };

        let method = overload::select(candidates, args, |p, a| self.scope.assign_score(p, a))
            .map_err(|reason| Failure::MethodResolution {
                type_name: runtime_type.to_string(),
                method: method_name.to_string(),
                reason,
                arg_types: describe_args(args),
            })?;

        debug!(
            type_name = runtime_type,
            method = method_name,
            argc = args.len(),
            "method resolved"
        );

        let location = format!("{runtime_type}::{method_name}");
        match catch_unwind(AssertUnwindSafe(|| {
            handle.with_state(|state| method.invoke(state, args))
        })) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(fault)) => Err(Failure::submission_fault(location, fault)),
            Err(payload) => Err(Failure::submission_panic(location, payload)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::SubmissionBuilder;
    use exercise_sandbox_types::{ObjectState, ParamType, SubmissionFault, TypeDef};

    fn counter_type() -> TypeDef {
        TypeDef::new("Counter")
            .constructor(&[], |_| Ok(Box::new(0i64) as ObjectState))
            .constructor(&[ParamType::Int], |args| match args {
                [Value::Int(n)] => Ok(Box::new(i64::from(*n)) as ObjectState),
                _ => Err(SubmissionFault::new("unexpected arguments")),
            })
            .method("increment", &[], |state, _| {
                let n = state
                    .downcast_mut::<i64>()
                    .ok_or_else(|| SubmissionFault::new("corrupt state"))?;
                *n += 1;
                Ok(Value::Long(*n))
            })
            .method("value", &[], |state, _| {
                let n = state
                    .downcast_ref::<i64>()
                    .ok_or_else(|| SubmissionFault::new("corrupt state"))?;
                Ok(Value::Long(*n))
            })
    }

    fn context_for(types: Vec<TypeDef>) -> ExecutionContext {
        let mut builder = SubmissionBuilder::new();
        for def in types {
            builder = builder.register(def);
        }
        ExecutionContext::new(builder.build().expect("build scope"))
    }

    #[test]
    fn test_create_and_execute() {
        let ctx = context_for(vec![counter_type()]);
        let counter = ctx.create_object("Counter", &[]).expect("create");
        assert_eq!(
            ctx.execute_method(&counter, "increment", &[]).expect("call"),
            Value::Long(1)
        );
        assert_eq!(
            ctx.execute_method(&counter, "increment", &[]).expect("call"),
            Value::Long(2)
        );
    }

    #[test]
    fn test_constructor_overload_picks_exact_arity() {
        let ctx = context_for(vec![counter_type()]);
        let counter = ctx
            .create_object("Counter", &[Value::Int(40)])
            .expect("create with seed");
        assert_eq!(
            ctx.execute_method(&counter, "value", &[]).expect("call"),
            Value::Long(40)
        );
    }

    #[test]
    fn test_absent_type_is_type_resolution_error() {
        let ctx = context_for(vec![counter_type()]);
        let err = ctx.create_object("Missing", &[]).err().expect("must fail");
        assert!(matches!(err, Failure::TypeResolution { ref type_name } if type_name == "Missing"));
    }

    #[test]
    fn test_unknown_method_is_no_such_candidate() {
        let ctx = context_for(vec![counter_type()]);
        let counter = ctx.create_object("Counter", &[]).expect("create");
        let err = ctx
            .execute_method(&counter, "decrement", &[])
            .err()
            .expect("must fail");
        assert!(matches!(
            err,
            Failure::MethodResolution {
                reason: ResolutionReason::NoSuchCandidate,
                ..
            }
        ));
    }

    #[test]
    fn test_cross_context_handle_fails_fast() {
        let ctx_a = context_for(vec![counter_type()]);
        let ctx_b = context_for(vec![counter_type()]);
        let counter = ctx_a.create_object("Counter", &[]).expect("create");
        let err = ctx_b
            .execute_method(&counter, "increment", &[])
            .err()
            .expect("must fail");
        assert!(err.is_infrastructure());
    }

    #[test]
    fn test_cross_context_instance_argument_fails_fast() {
        // Same type names in both submissions; a handle from one must still
        // never reach the other's code as an argument.
        let types = || {
            vec![
                TypeDef::new("Pet").constructor(&[], |_| Ok(Box::new(()) as ObjectState)),
                TypeDef::new("Kennel")
                    .constructor(&[], |_| Ok(Box::new(()) as ObjectState))
                    .method("admit", &[ParamType::Instance("Pet".into())], |_, _| {
                        Ok(Value::Str("admitted".into()))
                    }),
            ]
        };
        let ctx_a = context_for(types());
        let ctx_b = context_for(types());

        let foreign_pet = ctx_a.create_object("Pet", &[]).expect("create pet in a");
        let kennel = ctx_b.create_object("Kennel", &[]).expect("create kennel in b");
        let err = ctx_b
            .execute_method(&kennel, "admit", &[Value::Instance(foreign_pet)])
            .err()
            .expect("must fail");
        assert!(err.is_infrastructure());
    }

    #[test]
    fn test_cross_context_constructor_argument_fails_fast() {
        let types = || {
            vec![
                TypeDef::new("Engine").constructor(&[], |_| Ok(Box::new(()) as ObjectState)),
                TypeDef::new("Car").constructor(&[ParamType::Instance("Engine".into())], |_| {
                    Ok(Box::new(()) as ObjectState)
                }),
            ]
        };
        let ctx_a = context_for(types());
        let ctx_b = context_for(types());

        let foreign_engine = ctx_a.create_object("Engine", &[]).expect("create engine");
        let err = ctx_b
            .create_object("Car", &[Value::Instance(foreign_engine)])
            .err()
            .expect("must fail");
        assert!(err.is_infrastructure());

        // A same-context instance argument stays accepted.
        let engine = ctx_b.create_object("Engine", &[]).expect("create engine");
        assert!(ctx_b
            .create_object("Car", &[Value::Instance(engine)])
            .is_ok());
    }

    #[test]
    fn test_fresh_context_invalidates_existing_handles() {
        let ctx = context_for(vec![counter_type()]);
        let counter = ctx.create_object("Counter", &[]).expect("create");
        let fresh = ctx.fresh();
        let err = fresh
            .execute_method(&counter, "increment", &[])
            .err()
            .expect("must fail");
        assert!(err.is_infrastructure());
    }

    #[test]
    fn test_submission_panic_is_wrapped() {
        let exploding = TypeDef::new("Bomb")
            .constructor(&[], |_| Ok(Box::new(()) as ObjectState))
            .method("detonate", &[], |_, _| panic!("division by zero"));
        let ctx = context_for(vec![exploding]);
        let bomb = ctx.create_object("Bomb", &[]).expect("create");
        let err = ctx
            .execute_method(&bomb, "detonate", &[])
            .err()
            .expect("must fail");
        match err {
            Failure::SubmissionRuntime { location, message } => {
                assert_eq!(location, "Bomb::detonate");
                assert!(message.contains("division by zero"));
            }
            other => panic!("expected SubmissionRuntime, got {other:?}"),
        }
    }

    #[test]
    fn test_constructor_fault_is_wrapped() {
        let picky = TypeDef::new("Picky").constructor(&[ParamType::Int], |args| {
            match args {
                [Value::Int(n)] if *n >= 0 => Ok(Box::new(*n) as ObjectState),
                _ => Err(SubmissionFault::new("seed must be non-negative")),
            }
        });
        let ctx = context_for(vec![picky]);
        let err = ctx
            .create_object("Picky", &[Value::Int(-1)])
            .err()
            .expect("must fail");
        assert!(matches!(err, Failure::SubmissionRuntime { .. }));
        assert!(err.to_string().contains("seed must be non-negative"));
    }

    #[test]
    fn test_virtual_dispatch_runs_override() {
        let base = TypeDef::new("Shape")
            .constructor(&[], |_| Ok(Box::new(()) as ObjectState))
            .method("name", &[], |_, _| Ok(Value::Str("shape".into())));
        let circle = TypeDef::new("Circle")
            .with_parent("Shape")
            .constructor(&[], |_| Ok(Box::new(()) as ObjectState))
            .method("name", &[], |_, _| Ok(Value::Str("circle".into())));

        let ctx = context_for(vec![base, circle]);
        let shape = ctx.create_object("Circle", &[]).expect("create");
        assert_eq!(
            ctx.execute_method(&shape, "name", &[]).expect("call"),
            Value::Str("circle".into())
        );
    }

    #[test]
    fn test_inherited_method_resolves_through_parent() {
        let base = TypeDef::new("Shape")
            .constructor(&[], |_| Ok(Box::new(()) as ObjectState))
            .method("sides", &[], |_, _| Ok(Value::Int(0)));
        let circle = TypeDef::new("Circle")
            .with_parent("Shape")
            .constructor(&[], |_| Ok(Box::new(()) as ObjectState));

        let ctx = context_for(vec![base, circle]);
        let shape = ctx.create_object("Circle", &[]).expect("create");
        assert_eq!(
            ctx.execute_method(&shape, "sides", &[]).expect("call"),
            Value::Int(0)
        );
    }

    #[test]
    fn test_instance_argument_upcasts_into_parent_parameter() {
        let base = TypeDef::new("Animal").constructor(&[], |_| Ok(Box::new(()) as ObjectState));
        let dog = TypeDef::new("Dog")
            .with_parent("Animal")
            .constructor(&[], |_| Ok(Box::new(()) as ObjectState));
        let kennel = TypeDef::new("Kennel")
            .constructor(&[], |_| Ok(Box::new(0u32) as ObjectState))
            .method(
                "admit",
                &[ParamType::Instance("Animal".into())],
                |state, _| {
                    let n = state
                        .downcast_mut::<u32>()
                        .ok_or_else(|| SubmissionFault::new("corrupt state"))?;
                    *n += 1;
                    Ok(Value::Int(*n as i32))
                },
            );

        let ctx = context_for(vec![base, dog, kennel]);
        let kennel = ctx.create_object("Kennel", &[]).expect("create kennel");
        let dog = ctx.create_object("Dog", &[]).expect("create dog");
        assert_eq!(
            ctx.execute_method(&kennel, "admit", &[Value::Instance(dog)])
                .expect("admit"),
            Value::Int(1)
        );
    }
}
