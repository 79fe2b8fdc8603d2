//! Schema migrations of the [`Postgres`] database.

use async_trait::async_trait;
use refinery_core::{
    traits::r#async::{AsyncQuery, AsyncTransaction},
    AsyncMigrate, Migration,
};
use tracerr::Traced;
use tracing as log;

use crate::infra::{database, postgres};

use super::Postgres;

refinery::embed_migrations!("../migrations");

impl Postgres {
    /// Applies all the pending schema migrations, returning the number of
    /// the applied ones.
    ///
    /// # Errors
    ///
    /// If any migration fails to apply. Migrations applied before it stay
    /// applied.
    pub async fn migrate(&mut self) -> Result<usize, Traced<database::Error>> {
        let report = migrations::runner()
            .run_async(self)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;

        let applied = report.applied_migrations();
        for m in applied {
            log::info!("applied `{m}` database migration");
        }
        Ok(applied.len())
    }
}

#[async_trait]
impl AsyncTransaction for Postgres {
    type Error = Traced<database::Error>;

    async fn execute(
        &mut self,
        queries: &[&str],
    ) -> Result<usize, Self::Error> {
        let mut conn = self.0.connection().await.map_err(tracerr::wrap!())?;
        AsyncTransaction::execute(&mut **conn, queries)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

#[async_trait]
impl AsyncQuery<Vec<Migration>> for Postgres {
    async fn query(
        &mut self,
        query: &str,
    ) -> Result<Vec<Migration>, <Self as AsyncTransaction>::Error> {
        let mut conn = self.0.connection().await.map_err(tracerr::wrap!())?;
        AsyncQuery::query(&mut **conn, query)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl AsyncMigrate for Postgres {}
