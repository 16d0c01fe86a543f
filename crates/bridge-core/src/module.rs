use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{BridgeError, BridgeResult};
use crate::handler::LegacyHandler;

/// A single exported binding of a legacy module.
#[derive(Clone)]
pub enum Export {
    Function(Arc<dyn LegacyHandler>),
    Object(BTreeMap<String, Export>),
    Value(Value),
}

impl Export {
    fn as_function(&self) -> Option<&Arc<dyn LegacyHandler>> {
        match self {
            Self::Function(handler) => Some(handler),
            _ => None,
        }
    }

    fn field(&self, name: &str) -> Option<&Export> {
        match self {
            Self::Object(fields) => fields.get(name),
            _ => None,
        }
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Function(..)"),
            Self::Object(fields) => f.debug_map().entries(fields.iter()).finish(),
            Self::Value(value) => write!(f, "Value({value})"),
        }
    }
}

/// The export table of a loaded legacy module.
#[derive(Clone, Debug, Default)]
pub struct HandlerModule {
    exports: BTreeMap<String, Export>,
}

impl HandlerModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// `export const handler = ...`
    pub fn with_named_handler(self, handler: Arc<dyn LegacyHandler>) -> Self {
        self.with_export("handler", Export::Function(handler))
    }

    /// `export default { handler }`
    pub fn with_default_handler(self, handler: Arc<dyn LegacyHandler>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("handler".to_string(), Export::Function(handler));
        self.with_export("default", Export::Object(fields))
    }

    /// `export default handler`
    pub fn with_bare_default(self, handler: Arc<dyn LegacyHandler>) -> Self {
        self.with_export("default", Export::Function(handler))
    }

    pub fn with_export(mut self, name: impl Into<String>, export: Export) -> Self {
        self.exports.insert(name.into(), export);
        self
    }

    pub fn export(&self, name: &str) -> Option<&Export> {
        self.exports.get(name)
    }
}

/// Export layouts a legacy handler can be found under, in lookup order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportShape {
    NamedHandler,
    DefaultWrappedHandler,
    BareDefault,
}

impl ExportShape {
    pub const PRIORITY: [ExportShape; 3] = [
        ExportShape::NamedHandler,
        ExportShape::DefaultWrappedHandler,
        ExportShape::BareDefault,
    ];

    fn pick(self, module: &HandlerModule) -> Option<&Arc<dyn LegacyHandler>> {
        match self {
            Self::NamedHandler => module.export("handler")?.as_function(),
            Self::DefaultWrappedHandler => module.export("default")?.field("handler")?.as_function(),
            Self::BareDefault => module.export("default")?.as_function(),
        }
    }
}

#[derive(Clone)]
pub struct ResolvedHandler {
    pub shape: ExportShape,
    pub handler: Arc<dyn LegacyHandler>,
}

/// Finds the callable handler of `module`, trying each [`ExportShape`] in
/// priority order.
pub fn resolve_handler(module: &HandlerModule) -> Option<ResolvedHandler> {
    ExportShape::PRIORITY.into_iter().find_map(|shape| {
        shape.pick(module).map(|handler| ResolvedHandler {
            shape,
            handler: Arc::clone(handler),
        })
    })
}

/// Source of legacy modules, keyed by module path.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn load(&self, module_path: &str) -> BridgeResult<HandlerModule>;
}

struct Preloaded(HandlerModule);

#[async_trait]
impl ModuleLoader for Preloaded {
    async fn load(&self, _module_path: &str) -> BridgeResult<HandlerModule> {
        Ok(self.0.clone())
    }
}

/// Loads the module at `module_path` and resolves its handler.
pub async fn load_handler(
    loader: &dyn ModuleLoader,
    module_path: &str,
) -> BridgeResult<ResolvedHandler> {
    let module = loader.load(module_path).await?;
    let resolved = resolve_handler(&module).ok_or_else(|| BridgeError::ModuleResolution {
        module_path: module_path.to_string(),
    })?;
    tracing::trace!(module_path, shape = ?resolved.shape, "resolved legacy handler");
    Ok(resolved)
}

/// A function route: the module path it was generated from plus its loader.
#[derive(Clone)]
pub struct ModuleRoute {
    pub module_path: String,
    loader: Arc<dyn ModuleLoader>,
}

impl ModuleRoute {
    pub async fn resolve(&self) -> BridgeResult<ResolvedHandler> {
        load_handler(self.loader.as_ref(), &self.module_path).await
    }
}

/// Route name to module table served by the host.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    routes: HashMap<String, ModuleRoute>,
}

impl ModuleRegistry {
    pub fn register(
        &mut self,
        name: impl Into<String>,
        module_path: impl Into<String>,
        module: HandlerModule,
    ) {
        self.register_loader(name, module_path, Arc::new(Preloaded(module)));
    }

    pub fn register_loader(
        &mut self,
        name: impl Into<String>,
        module_path: impl Into<String>,
        loader: Arc<dyn ModuleLoader>,
    ) {
        self.routes.insert(
            name.into(),
            ModuleRoute {
                module_path: module_path.into(),
                loader,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<ModuleRoute> {
        self.routes.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.routes.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
