//! Submission type definitions and instance handles.
//!
//! A submission arrives as a set of compiled type definitions keyed by simple
//! name. Each [`TypeDef`] carries constructor and method entries: a declared
//! parameter signature plus the callable artifact behind it. The harness only
//! ever reads these tables; it never enumerates or introspects beyond
//! name-and-signature lookup.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::value::{ParamType, Value};

/// Opaque state of one constructed submission object.
pub type ObjectState = Box<dyn Any + Send>;

/// The fault a submission artifact raises during construction or invocation.
///
/// Carries only the submission's own message; the harness attaches no call
/// stack of its own when translating it into a failure category.
#[derive(Debug, Clone)]
pub struct SubmissionFault {
    message: String,
}

impl SubmissionFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SubmissionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SubmissionFault {}

impl From<&str> for SubmissionFault {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for SubmissionFault {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Callable artifact behind a constructor signature.
pub type ConstructorFn =
    Arc<dyn Fn(&[Value]) -> Result<ObjectState, SubmissionFault> + Send + Sync>;

/// Callable artifact behind a method signature.
pub type MethodFn =
    Arc<dyn Fn(&mut ObjectState, &[Value]) -> Result<Value, SubmissionFault> + Send + Sync>;

/// One constructor overload: declared parameter types plus its artifact.
#[derive(Clone)]
pub struct Constructor {
    params: Vec<ParamType>,
    body: ConstructorFn,
}

impl Constructor {
    pub fn new<F>(params: Vec<ParamType>, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<ObjectState, SubmissionFault> + Send + Sync + 'static,
    {
        Self {
            params,
            body: Arc::new(body),
        }
    }

    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// Run the submission's constructor artifact.
    pub fn construct(&self, args: &[Value]) -> Result<ObjectState, SubmissionFault> {
        (self.body)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.label()).collect();
        write!(f, "Constructor({})", params.join(", "))
    }
}

/// One method overload: declared parameter types plus its artifact.
#[derive(Clone)]
pub struct Method {
    params: Vec<ParamType>,
    body: MethodFn,
}

impl Method {
    pub fn new<F>(params: Vec<ParamType>, body: F) -> Self
    where
        F: Fn(&mut ObjectState, &[Value]) -> Result<Value, SubmissionFault> + Send + Sync + 'static,
    {
        Self {
            params,
            body: Arc::new(body),
        }
    }

    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// Run the submission's method artifact against the instance state.
    pub fn invoke(&self, state: &mut ObjectState, args: &[Value]) -> Result<Value, SubmissionFault> {
        (self.body)(state, args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.label()).collect();
        write!(f, "Method({})", params.join(", "))
    }
}

/// One compiled submission type: constructors and methods keyed by simple
/// name, plus an optional parent for single inheritance.
///
/// Built fluently:
///
/// ```ignore
/// let def = TypeDef::new("Counter")
///     .constructor(&[], |_| Ok(Box::new(0i64) as ObjectState))
///     .method("increment", &[], |state, _| {
///         let n = state
///             .downcast_mut::<i64>()
///             .ok_or_else(|| SubmissionFault::new("bad state"))?;
///         *n += 1;
///         Ok(Value::Long(*n))
///     });
/// ```
#[derive(Clone)]
pub struct TypeDef {
    name: String,
    parent: Option<String>,
    constructors: Vec<Constructor>,
    methods: BTreeMap<String, Vec<Method>>,
}

impl TypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            constructors: Vec::new(),
            methods: BTreeMap::new(),
        }
    }

    /// Declare a parent type (by simple name, resolved within the same
    /// submission). Enables virtual dispatch and upcast compatibility.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Add a constructor overload.
    pub fn constructor<F>(mut self, params: &[ParamType], body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<ObjectState, SubmissionFault> + Send + Sync + 'static,
    {
        self.constructors.push(Constructor::new(params.to_vec(), body));
        self
    }

    /// Add a method overload under `name`.
    pub fn method<F>(mut self, name: &str, params: &[ParamType], body: F) -> Self
    where
        F: Fn(&mut ObjectState, &[Value]) -> Result<Value, SubmissionFault> + Send + Sync + 'static,
    {
        self.methods
            .entry(name.to_string())
            .or_default()
            .push(Method::new(params.to_vec(), body));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    /// Overload set declared under `name` on this type only (no parent
    /// lookup — the scope walks the chain for virtual dispatch).
    pub fn methods_named(&self, name: &str) -> Option<&[Method]> {
        self.methods.get(name).map(|v| v.as_slice())
    }
}

impl fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDef")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("constructors", &self.constructors.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// Opaque handle to a constructed submission object.
///
/// Exclusively owned by the calling test; the execution context keeps no
/// registry of handles. The handle is tagged with the identity of the
/// context that created it, so use through a different context fails fast
/// instead of silently resolving against the wrong scope. Cloning shares
/// the underlying instance state.
#[derive(Clone)]
pub struct InstanceHandle {
    context_id: Uuid,
    type_name: String,
    state: Arc<Mutex<ObjectState>>,
}

impl InstanceHandle {
    pub fn new(context_id: Uuid, type_name: impl Into<String>, state: ObjectState) -> Self {
        Self {
            context_id,
            type_name: type_name.into(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Identity of the execution context that constructed this instance.
    pub fn context_id(&self) -> Uuid {
        self.context_id
    }

    /// Simple name of the instance's runtime type. Dispatch is always
    /// virtual against this, never against a declared/cast type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Run `f` with exclusive access to the instance state.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut ObjectState) -> R) -> R {
        let mut guard = self.state.lock();
        f(&mut guard)
    }

    /// Whether two handles refer to the same underlying object.
    pub fn same_object(&self, other: &InstanceHandle) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceHandle")
            .field("context_id", &self.context_id)
            .field("type_name", &self.type_name)
            .finish()
    }
}
