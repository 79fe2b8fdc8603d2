//! [`Parking`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{parking, Parking},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Parking>, parking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Parking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Parking>, parking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, hourly_price \
            FROM parkings \
            WHERE id = $1::INT8 \
            LIMIT 1";
        Ok(self
            .query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .next()
            .map(|row| Parking {
                id: row.get("id"),
                hourly_price: row.get("hourly_price"),
            }))
    }
}
