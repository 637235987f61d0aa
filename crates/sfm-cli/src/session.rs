//! Connected session for commands that talk to the server
//!
//! Owns the tokio runtime and an engine wired to an HTTP client. Ctrl-C
//! cancels the engine's call context, so the in-flight call is dropped and
//! the command fails with an interruption instead of hanging.

use std::future::Future;

use sfm_client::DevOpsClient;
use sfm_core::{CallContext, ReconciliationEngine};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cli::ConnectionArgs;
use crate::error::Result;

pub struct Session {
    runtime: Runtime,
    engine: ReconciliationEngine,
}

impl Session {
    /// Validate connection settings and build the engine.
    ///
    /// Missing settings are reported before any runtime or connection exists.
    pub fn connect(connection: &ConnectionArgs) -> Result<Self> {
        let client = DevOpsClient::new(&connection.client_options())?;
        debug!(url = %client.base_url(), "Connected session");

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        let token = CancellationToken::new();
        let on_interrupt = token.clone();
        runtime.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling in-flight call");
                on_interrupt.cancel();
            }
        });

        let engine = ReconciliationEngine::new(Box::new(client.clone()), Box::new(client))
            .with_context(CallContext::with_token(token));

        Ok(Self { runtime, engine })
    }

    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
