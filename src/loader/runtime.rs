//! WASM Component Runtime: compiles and calls the utilities component.
//!
//! Uses wasmtime's component model. The component exports
//! `estimate-reading-time`, `sanitize-html` and `hash-password` per
//! `wit/utilities.wit`. It is compiled once (expensive) and instantiated
//! per call (cheap) in a fresh Store, so no state survives between calls.

use wasmtime::component::{Component, Instance, Linker, ResourceTable, Val};
use wasmtime::{Engine, Store};
use wasmtime_wasi::{WasiCtx, WasiCtxBuilder, WasiCtxView, WasiView};

use super::error::LoaderError;

pub const EXPORT_READING_TIME: &str = "estimate-reading-time";
pub const EXPORT_SANITIZE: &str = "sanitize-html";
pub const EXPORT_HASH: &str = "hash-password";

/// Exports the component must provide to be usable.
pub const REQUIRED_EXPORTS: [&str; 3] = [EXPORT_READING_TIME, EXPORT_SANITIZE, EXPORT_HASH];

/// Store data. Implements WasiView with an empty context (no grants).
pub(crate) struct ModuleState {
    ctx: WasiCtx,
    table: ResourceTable,
}

impl WasiView for ModuleState {
    fn ctx(&mut self) -> WasiCtxView<'_> {
        WasiCtxView {
            ctx: &mut self.ctx,
            table: &mut self.table,
        }
    }
}

impl ModuleState {
    fn minimal() -> Self {
        Self {
            ctx: WasiCtxBuilder::new().build(),
            table: ResourceTable::new(),
        }
    }
}

/// The WASM runtime engine.
pub struct WasmRuntime {
    engine: Engine,
}

impl WasmRuntime {
    /// Create a new runtime with the component model enabled.
    pub fn new() -> Result<Self, LoaderError> {
        let mut config = wasmtime::Config::new();
        config.wasm_component_model(true);
        let engine =
            Engine::new(&config).map_err(|e| LoaderError::EngineCreation(e.to_string()))?;
        Ok(Self { engine })
    }

    /// Compile a component and check that it instantiates with every
    /// required export present.
    pub fn load_module(&self, bytes: &[u8]) -> Result<UtilityModule, LoaderError> {
        let component = Component::new(&self.engine, bytes)
            .map_err(|e| LoaderError::Compilation(e.to_string()))?;

        let module = UtilityModule {
            engine: self.engine.clone(),
            component,
        };
        module.verify_exports()?;
        Ok(module)
    }
}

/// A compiled utilities component.
pub struct UtilityModule {
    engine: Engine,
    component: Component,
}

impl std::fmt::Debug for UtilityModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UtilityModule").finish_non_exhaustive()
    }
}

impl UtilityModule {
    pub fn estimate_reading_time(&self, content: &str) -> Result<u32, LoaderError> {
        match self.call(EXPORT_READING_TIME, content)? {
            Val::U32(minutes) => Ok(minutes),
            other => Err(LoaderError::Execution(format!(
                "{EXPORT_READING_TIME}: expected u32, got {:?}",
                other
            ))),
        }
    }

    pub fn sanitize_html(&self, markup: &str) -> Result<String, LoaderError> {
        self.call_for_string(EXPORT_SANITIZE, markup)
    }

    /// Blocking; async callers go through `spawn_blocking`.
    pub fn hash_password(&self, password: &str) -> Result<String, LoaderError> {
        self.call_for_string(EXPORT_HASH, password)
    }

    /// Instantiate in a fresh Store with WASI linked.
    fn instantiate(&self) -> Result<(Store<ModuleState>, Instance), LoaderError> {
        let mut store = Store::new(&self.engine, ModuleState::minimal());
        let mut linker = Linker::new(&self.engine);
        wasmtime_wasi::p2::add_to_linker_sync(&mut linker)
            .map_err(|e| LoaderError::Instantiation(format!("WASI link failed: {e}")))?;

        let instance = linker
            .instantiate(&mut store, &self.component)
            .map_err(|e| LoaderError::Instantiation(e.to_string()))?;
        Ok((store, instance))
    }

    fn verify_exports(&self) -> Result<(), LoaderError> {
        let (mut store, instance) = self.instantiate()?;
        for name in REQUIRED_EXPORTS {
            if instance.get_func(&mut store, name).is_none() {
                return Err(LoaderError::MissingExport(name.to_string()));
            }
        }
        Ok(())
    }

    fn call(&self, export: &str, arg: &str) -> Result<Val, LoaderError> {
        let (mut store, instance) = self.instantiate()?;
        let func = instance
            .get_func(&mut store, export)
            .ok_or_else(|| LoaderError::MissingExport(export.to_string()))?;

        let args = [Val::String(arg.into())];
        let mut results = [Val::Bool(false)]; // single result
        func.call(&mut store, &args, &mut results)
            .map_err(|e| LoaderError::Execution(format!("{export} call failed: {e}")))?;

        let [result] = results;
        Ok(result)
    }

    fn call_for_string(&self, export: &str, arg: &str) -> Result<String, LoaderError> {
        match self.call(export, arg)? {
            Val::String(s) => Ok(s.to_string()),
            other => Err(LoaderError::Execution(format!(
                "{export}: expected string, got {:?}",
                other
            ))),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const STUB_WAT: &str = include_str!("../../tests/fixtures/stub_utils.wat");
    const HASH_PLACEHOLDER: &str =
        "HASH_PLACEHOLDER_HASH_PLACEHOLDER_HASH_PLACEHOLDER_HASH_PLACEHOL";

    /// The stub component with a fixed 64-byte digest answer.
    pub(crate) fn stub_component(digest: &str) -> Vec<u8> {
        assert_eq!(digest.len(), 64, "digest must stay 64 bytes");
        STUB_WAT.replace(HASH_PLACEHOLDER, digest).into_bytes()
    }

    #[test]
    fn engine_creation() {
        assert!(WasmRuntime::new().is_ok());
    }

    #[test]
    fn load_invalid_bytes_fails() {
        let runtime = WasmRuntime::new().unwrap();
        match runtime.load_module(b"garbage bytes not wasm").unwrap_err() {
            LoaderError::Compilation(_) => {}
            other => panic!("expected Compilation error, got: {other}"),
        }
    }

    #[test]
    fn load_empty_bytes_fails() {
        let runtime = WasmRuntime::new().unwrap();
        assert!(runtime.load_module(b"").is_err());
    }

    #[test]
    fn core_module_is_not_a_component() {
        let runtime = WasmRuntime::new().unwrap();
        assert!(runtime.load_module(b"(module)").is_err());
    }

    #[test]
    fn component_without_exports_rejected() {
        let runtime = WasmRuntime::new().unwrap();
        match runtime.load_module(b"(component)").unwrap_err() {
            LoaderError::MissingExport(name) => assert_eq!(name, EXPORT_READING_TIME),
            other => panic!("expected MissingExport, got: {other}"),
        }
    }

    #[test]
    fn stub_component_loads() {
        let runtime = WasmRuntime::new().unwrap();
        let result = runtime.load_module(&stub_component(&"a".repeat(64)));
        assert!(result.is_ok(), "load failed: {:?}", result.err());
    }

    #[test]
    fn calls_reach_the_component() {
        let runtime = WasmRuntime::new().unwrap();
        let module = runtime.load_module(&stub_component(&"b".repeat(64))).unwrap();

        assert_eq!(module.estimate_reading_time("two words").unwrap(), 42);
        assert_eq!(module.sanitize_html("<p>echo</p>").unwrap(), "<p>echo</p>");
        assert_eq!(module.hash_password("x").unwrap(), "b".repeat(64));
    }

    #[test]
    fn repeated_calls_use_fresh_instances() {
        let runtime = WasmRuntime::new().unwrap();
        let module = runtime.load_module(&stub_component(&"c".repeat(64))).unwrap();
        for msg in ["alpha", "beta", "gamma"] {
            assert_eq!(module.sanitize_html(msg).unwrap(), msg);
        }
    }
}
