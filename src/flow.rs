//! Dual-path execution engine
//!
//! [`ShadowFlow`] always runs the current flow inline and returns its result
//! untouched. For a sampled subset of calls it additionally runs the new flow
//! on a separate execution context, diffs the two results and logs the
//! differences. Nothing that happens on the shadow path (new-flow failures,
//! diff failures, redaction failures, rejected submissions) ever reaches the
//! business caller.
//!
//! Two forms with one contract:
//! - blocking, supplier-based: [`ShadowFlow::compare`] /
//!   [`ShadowFlow::compare_collections`]
//! - non-blocking, future-based: [`ShadowFlow::compare_async`] /
//!   [`ShadowFlow::compare_collections_async`]

use crate::diff::{Comparator, DiffReport};
use crate::encryption::EncryptionService;
use crate::executor::ShadowExecutor;
use crate::sampling::should_call_new_flow;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{info, warn, Instrument, Level, Span};

/// Comparison engine for migrating from a current flow to a new flow
///
/// Immutable after construction (see
/// [`ShadowFlowBuilder`](crate::ShadowFlowBuilder)); freely shareable across
/// concurrent calls. The type parameter is the model both flows produce.
pub struct ShadowFlow<T> {
    percentage: u8,
    executor: Arc<dyn ShadowExecutor>,
    runtime: Option<Handle>,
    encryption: Option<Arc<dyn EncryptionService>>,
    comparator: Arc<dyn Comparator<T>>,
    instance_name: String,
    log_prefix: String,
}

impl<T> Clone for ShadowFlow<T> {
    fn clone(&self) -> Self {
        Self {
            percentage: self.percentage,
            executor: Arc::clone(&self.executor),
            runtime: self.runtime.clone(),
            encryption: self.encryption.clone(),
            comparator: Arc::clone(&self.comparator),
            instance_name: self.instance_name.clone(),
            log_prefix: self.log_prefix.clone(),
        }
    }
}

impl<T> std::fmt::Debug for ShadowFlow<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadowFlow")
            .field("percentage", &self.percentage)
            .field("instance_name", &self.instance_name)
            .finish_non_exhaustive()
    }
}

impl<T> ShadowFlow<T> {
    pub(crate) fn new(
        percentage: u8,
        executor: Arc<dyn ShadowExecutor>,
        runtime: Option<Handle>,
        encryption: Option<Arc<dyn EncryptionService>>,
        comparator: Arc<dyn Comparator<T>>,
        instance_name: String,
    ) -> Self {
        let log_prefix = format!("[instance={instance_name}]");
        Self {
            percentage,
            executor,
            runtime,
            encryption,
            comparator,
            instance_name,
            log_prefix,
        }
    }

    /// Name of this shadow flow instance, `"default"` if not configured
    #[inline]
    #[must_use]
    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// Configured sampling percentage
    #[inline]
    #[must_use]
    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    /// Draw the per-call sampling decision and log it
    fn sample_and_log(&self) -> bool {
        let call_new_flow = should_call_new_flow(self.percentage);
        self.log_calling_new_flow(call_new_flow);
        call_new_flow
    }

    fn log_calling_new_flow(&self, call_new_flow: bool) {
        info!("{} Calling new flow: {}", self.log_prefix, call_new_flow);
    }

    fn reporter(&self) -> DiffReporter {
        DiffReporter {
            encryption: self.encryption.clone(),
            log_prefix: self.log_prefix.clone(),
        }
    }

    /// Submit a diff computation to the shadow execution context
    ///
    /// The caller-side span is captured here and entered only for the
    /// duration of the task, so a reused worker never carries stale request
    /// context into unrelated tasks. Submission failures are logged, never
    /// propagated.
    fn submit_shadow<F>(&self, diff_supplier: F)
    where
        F: FnOnce() -> Result<DiffReport, String> + Send + 'static,
    {
        let reporter = self.reporter();
        let span = Span::current();

        let submitted = self.executor.execute(Box::new(move || {
            let _guard = span.enter();
            reporter.report(diff_supplier());
        }));

        if let Err(err) = submitted {
            warn!("{} Failed to run the shadow flow: {err}", self.log_prefix);
        }
    }

    /// Spawn the shadow future detached on the configured runtime
    ///
    /// Falls back to the ambient tokio runtime; if there is none, the shadow
    /// evaluation is dropped with a warning. The primary path is unaffected
    /// either way.
    fn spawn_shadow<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = match &self.runtime {
            Some(handle) => handle.clone(),
            None => match Handle::try_current() {
                Ok(handle) => handle,
                Err(err) => {
                    warn!("{} Failed to run the shadow flow: {err}", self.log_prefix);
                    return;
                }
            },
        };
        handle.spawn(future);
    }
}

impl<T> ShadowFlow<T>
where
    T: Clone + Send + 'static,
{
    /// Run both flows, return the current flow's result
    ///
    /// The current flow runs synchronously on the calling thread; its result
    /// (or error) is always what the caller gets. Based on the sampling
    /// percentage the new flow additionally runs on the shadow execution
    /// context, where the results are compared and differences logged. The
    /// call never waits on the shadow task.
    pub fn compare<E, CF, NF>(&self, current_flow: CF, new_flow: NF) -> Result<T, E>
    where
        CF: FnOnce() -> Result<T, E>,
        NF: FnOnce() -> Result<T, E> + Send + 'static,
        E: Display + Send + 'static,
    {
        let current = current_flow()?;

        if self.sample_and_log() {
            let current_for_shadow = current.clone();
            let comparator = Arc::clone(&self.comparator);
            self.submit_shadow(move || {
                let new_value = new_flow().map_err(|err| err.to_string())?;
                comparator
                    .compare(&current_for_shadow, &new_value)
                    .map_err(|err| err.to_string())
            });
        }

        Ok(current)
    }

    /// Collection-typed counterpart of [`compare`](Self::compare)
    ///
    /// Use this when both flows produce a collection: the comparator needs
    /// the element type to diff collection contents correctly.
    pub fn compare_collections<E, CF, NF>(
        &self,
        current_flow: CF,
        new_flow: NF,
    ) -> Result<Vec<T>, E>
    where
        CF: FnOnce() -> Result<Vec<T>, E>,
        NF: FnOnce() -> Result<Vec<T>, E> + Send + 'static,
        E: Display + Send + 'static,
    {
        let current = current_flow()?;

        if self.sample_and_log() {
            let current_for_shadow = current.clone();
            let comparator = Arc::clone(&self.comparator);
            self.submit_shadow(move || {
                let new_value = new_flow().map_err(|err| err.to_string())?;
                comparator
                    .compare_collections(&current_for_shadow, &new_value)
                    .map_err(|err| err.to_string())
            });
        }

        Ok(current)
    }

    /// Non-blocking form of [`compare`](Self::compare)
    ///
    /// Awaits `current_flow` exactly once; its value or error is the caller's
    /// value or error, untouched. If this call is sampled, `new_flow` runs as
    /// a detached task on the configured (or ambient) tokio runtime,
    /// instrumented with the span active at this call site so shadow log
    /// output stays traceable to the originating request. Dropping the
    /// returned future's caller does not cancel the shadow task, and a slow
    /// shadow task never delays the primary path.
    pub async fn compare_async<E, CF, NF>(&self, current_flow: CF, new_flow: NF) -> Result<T, E>
    where
        CF: Future<Output = Result<T, E>>,
        NF: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        // Drawn before the await so the decision is fixed at assembly time;
        // logged and acted on only once the current value arrives. On a
        // current-flow error the shadow path never ran, so nothing is logged.
        let call_new_flow = should_call_new_flow(self.percentage);
        let current = current_flow.await?;
        self.log_calling_new_flow(call_new_flow);

        if call_new_flow {
            let current_for_shadow = current.clone();
            let comparator = Arc::clone(&self.comparator);
            let reporter = self.reporter();
            self.spawn_shadow(
                async move {
                    match new_flow.await {
                        Ok(new_value) => {
                            reporter.report(comparator.compare(&current_for_shadow, &new_value));
                        }
                        Err(err) => warn!(
                            "{} Failed to run the shadow flow: {err}",
                            reporter.log_prefix
                        ),
                    }
                }
                .instrument(Span::current()),
            );
        }

        Ok(current)
    }

    /// Collection-typed counterpart of [`compare_async`](Self::compare_async)
    pub async fn compare_collections_async<E, CF, NF>(
        &self,
        current_flow: CF,
        new_flow: NF,
    ) -> Result<Vec<T>, E>
    where
        CF: Future<Output = Result<Vec<T>, E>>,
        NF: Future<Output = Result<Vec<T>, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let call_new_flow = should_call_new_flow(self.percentage);
        let current = current_flow.await?;
        self.log_calling_new_flow(call_new_flow);

        if call_new_flow {
            let current_for_shadow = current.clone();
            let comparator = Arc::clone(&self.comparator);
            let reporter = self.reporter();
            self.spawn_shadow(
                async move {
                    match new_flow.await {
                        Ok(new_value) => {
                            reporter.report(
                                comparator
                                    .compare_collections(&current_for_shadow, &new_value),
                            );
                        }
                        Err(err) => warn!(
                            "{} Failed to run the shadow flow: {err}",
                            reporter.log_prefix
                        ),
                    }
                }
                .instrument(Span::current()),
            );
        }

        Ok(current)
    }
}

/// Emits the per-call diff log lines
///
/// Lives on the shadow execution context; holds everything the reporting step
/// needs so the [`ShadowFlow`] itself never crosses threads.
struct DiffReporter {
    encryption: Option<Arc<dyn EncryptionService>>,
    log_prefix: String,
}

impl DiffReporter {
    fn report<E: Display>(&self, outcome: Result<DiffReport, E>) {
        match outcome {
            Ok(report) => self.log_differences(&report),
            Err(err) => warn!("{} Failed to run the shadow flow: {err}", self.log_prefix),
        }
    }

    fn log_differences(&self, report: &DiffReport) {
        if !report.has_changes() {
            return;
        }
        let properties = report.attribute_summary();

        // The enabled check keeps the pretty-printing and encryption work off
        // the happy path when nobody is listening at INFO.
        if tracing::enabled!(Level::INFO) {
            match &self.encryption {
                Some(service) => match service.encrypt(&report.pretty_changes()) {
                    Ok(encrypted) => info!(
                        "{} The following differences were found: {}. Encrypted values: {}",
                        self.log_prefix, properties, encrypted
                    ),
                    Err(err) => {
                        warn!("{} Failed to run the shadow flow: {err}", self.log_prefix);
                    }
                },
                None => info!(
                    "{} The following differences were found: {}",
                    self.log_prefix, properties
                ),
            }
        }
    }
}
