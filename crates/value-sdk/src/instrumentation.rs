//! Static registry for third-party library instrumentation.
//!
//! Instrumentors are registered explicitly at startup; there is no dynamic
//! lookup. Unsupported names and instrumentor failures are logged and
//! skipped — instrumentation problems never break the host workflow.

use std::collections::HashMap;
use std::sync::Arc;

use value_core::Result;

/// Adapter that can enable tracing for one third-party library.
pub trait Instrumentor: Send + Sync {
    /// Library name the adapter is registered under.
    fn name(&self) -> &str;

    /// Enable instrumentation. Idempotence is the adapter's business.
    fn instrument(&self) -> Result<()>;

    /// Disable instrumentation.
    fn uninstrument(&self) -> Result<()>;

    fn is_instrumented(&self) -> bool;
}

/// Registry of known instrumentors, keyed by library name.
#[derive(Default)]
pub struct InstrumentationRegistry {
    instrumentors: HashMap<String, Arc<dyn Instrumentor>>,
}

impl InstrumentationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, instrumentor: Arc<dyn Instrumentor>) {
        self.instrumentors
            .insert(instrumentor.name().to_string(), instrumentor);
    }

    pub fn get(&self, library: &str) -> Option<&Arc<dyn Instrumentor>> {
        self.instrumentors.get(library)
    }

    pub fn supported(&self) -> Vec<&str> {
        self.instrumentors.keys().map(String::as_str).collect()
    }

    /// Enable instrumentation for the named libraries, or for every
    /// registered one when `libraries` is `None`. Unknown names and failed
    /// instrumentors are warned about and skipped.
    pub fn instrument(&self, libraries: Option<&[&str]>) {
        match libraries {
            Some(libraries) => {
                for library in libraries {
                    match self.instrumentors.get(*library) {
                        Some(instrumentor) => enable(instrumentor.as_ref()),
                        None => tracing::warn!(
                            library,
                            supported = ?self.supported(),
                            "instrumentation is not supported for this library"
                        ),
                    }
                }
            }
            None => {
                for instrumentor in self.instrumentors.values() {
                    enable(instrumentor.as_ref());
                }
            }
        }
    }
}

fn enable(instrumentor: &dyn Instrumentor) {
    if let Err(error) = instrumentor.instrument() {
        tracing::warn!(
            library = instrumentor.name(),
            %error,
            "failed to instrument library"
        );
    }
}

/// Enable auto-instrumentation for supported libraries.
///
/// With `None`, every registered library is instrumented.
pub fn auto_instrument(registry: &InstrumentationRegistry, libraries: Option<&[&str]>) {
    registry.instrument(libraries);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use value_core::ValueSdkError;

    struct FakeInstrumentor {
        name: &'static str,
        enabled: AtomicBool,
        fail: bool,
    }

    impl FakeInstrumentor {
        fn new(name: &'static str, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                enabled: AtomicBool::new(false),
                fail,
            })
        }
    }

    impl Instrumentor for FakeInstrumentor {
        fn name(&self) -> &str {
            self.name
        }

        fn instrument(&self) -> Result<()> {
            if self.fail {
                return Err(ValueSdkError::Configuration(
                    "instrumentor unavailable".to_string(),
                ));
            }
            self.enabled.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn uninstrument(&self) -> Result<()> {
            self.enabled.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn is_instrumented(&self) -> bool {
            self.enabled.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn instruments_registered_libraries() {
        let fake = FakeInstrumentor::new("fake-llm", false);
        let mut registry = InstrumentationRegistry::new();
        registry.register(fake.clone());

        auto_instrument(&registry, Some(&["fake-llm"]));
        assert!(fake.is_instrumented());

        fake.uninstrument().expect("uninstrument");
        auto_instrument(&registry, None);
        assert!(fake.is_instrumented());
    }

    #[test]
    fn unknown_and_failing_libraries_do_not_error() {
        let failing = FakeInstrumentor::new("flaky", true);
        let mut registry = InstrumentationRegistry::new();
        registry.register(failing.clone());

        // Neither an unknown name nor a failing instrumentor propagates.
        auto_instrument(&registry, Some(&["not-registered", "flaky"]));
        assert!(!failing.is_instrumented());
    }
}
