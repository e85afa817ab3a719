mod app;
mod shutdown;

use std::sync::Arc;

use clap::Args;
use telestash_core::SharedSecret;
use telestash_ingest::{IngestAppState, IngestService};
use telestash_query::{QueryAppState, QueryService, DEFAULT_BATCH_SIZE};
use tokio::net::TcpListener;
use tracing::{debug, info};

pub use app::build_router;
use shutdown::shutdown_signal;

#[derive(Args)]
pub struct ServeCommand {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1:7071", env = "TELESTASH_ADDRESS")]
    pub address: String,

    /// Connection string of the primary storage target (also used by queries)
    #[arg(long, env = "TELESTASH_PRIMARY_STORAGE", hide_env_values = true)]
    pub primary_storage: String,

    /// Container (bucket) name in the primary storage target
    #[arg(long, env = "TELESTASH_PRIMARY_CONTAINER")]
    pub primary_container: String,

    /// Connection string of the secondary storage target
    #[arg(long, env = "TELESTASH_SECONDARY_STORAGE", hide_env_values = true)]
    pub secondary_storage: String,

    /// Container (bucket) name in the secondary storage target
    #[arg(long, env = "TELESTASH_SECONDARY_CONTAINER")]
    pub secondary_container: String,

    /// Shared secret expected in X-Auth-Token on ingest requests
    #[arg(long, env = "TELESTASH_INGEST_SECRET", hide_env_values = true)]
    pub ingest_secret: String,

    /// Shared secret expected in X-Auth-Token on query requests
    #[arg(long, env = "TELESTASH_QUERY_SECRET", hide_env_values = true)]
    pub query_secret: String,

    /// Number of blobs fetched concurrently per query batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, env = "TELESTASH_QUERY_BATCH_SIZE")]
    pub query_batch_size: usize,
}

impl ServeCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run())
    }

    async fn run(self) -> anyhow::Result<()> {
        debug!("Connecting to storage targets...");
        let primary =
            telestash_storage::connect(&self.primary_storage, &self.primary_container).await?;
        let secondary =
            telestash_storage::connect(&self.secondary_storage, &self.secondary_container).await?;

        info!(
            "Mirroring ingest into containers {} and {}",
            primary.container(),
            secondary.container()
        );

        let ingest_state = Arc::new(IngestAppState {
            ingest_service: Arc::new(IngestService::new(primary.clone(), secondary)),
            secret: SharedSecret::new(self.ingest_secret),
        });
        let query_state = Arc::new(QueryAppState {
            query_service: Arc::new(
                QueryService::new(primary).with_batch_size(self.query_batch_size),
            ),
            secret: SharedSecret::new(self.query_secret),
        });

        let app = build_router(ingest_state, query_state);

        let listener = TcpListener::bind(&self.address).await?;
        info!("Telestash listening on {}", self.address);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Telestash server exited");
        Ok(())
    }
}
