//! # Error Policy
//!
//! Failed reconciliations are retried after a fixed interval. There is no
//! per-resource backoff: the next attempt simply runs the same converge pass.

use crate::config::ControllerConfig;
use crate::controller::reconciler::{Reconciler, ReconcilerError};
use crate::crd::ClientResource;
use crate::observability::metrics;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::Arc;
use tracing::error;

pub fn handle_reconciliation_error(
    obj: Arc<ClientResource>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let name = obj.name_any();
    let namespace = obj.namespace().unwrap_or_default();

    let error_span = tracing::error_span!(
        "controller.watch.reconciliation_error",
        resource.name = %name,
        resource.namespace = %namespace,
        error = %error
    );
    let _error_guard = error_span.enter();

    error!("Reconciliation error for {}/{}: {}", namespace, name, error);
    metrics::increment_reconciliation_errors();

    requeue_after_error(&ctx.config)
}

pub fn requeue_after_error(config: &ControllerConfig) -> Action {
    Action::requeue(config.reconciliation_error_requeue_duration())
}
