//! Availability [`Record`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Select},
    Date,
};
use tracerr::Traced;

use crate::{
    domain::{
        availability::{self, Record, RecurrenceTag},
        parking,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Vec<Record>, parking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Record>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Record>, parking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let parking_id = by.into_inner();

        const SQL: &str = "\
            SELECT id, parking_id, start_datetime, end_datetime, \
                   is_available, hourly_price, recurrence_rule \
            FROM availabilities \
            WHERE parking_id = $1::INT8 \
            ORDER BY start_datetime, id";
        Ok(self
            .query(SQL, &[&parking_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Record {
                id: Some(row.get("id")),
                parking_id: row.get("parking_id"),
                starts_at: row.get("start_datetime"),
                ends_at: row.get("end_datetime"),
                is_available: row.get("is_available"),
                hourly_price: row.get("hourly_price"),
                recurrence: row
                    .get::<_, Option<String>>("recurrence_rule")
                    .and_then(RecurrenceTag::new),
            })
            .collect())
    }
}

impl<C> Database<Delete<By<Record, (parking::Id, availability::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    /// Indicator whether the [`Record`] existed.
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Record, (parking::Id, availability::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (parking_id, id) = by.into_inner();

        const SQL: &str = "\
            DELETE FROM availabilities \
            WHERE id = $1::INT8 \
              AND parking_id = $2::INT8";
        self.exec(SQL, &[&id, &parking_id])
            .await
            .map(|deleted| deleted > 0)
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Delete<By<Vec<Record>, (parking::Id, Date)>>> for Postgres<C>
where
    C: Connection,
{
    /// Number of deleted [`Record`]s.
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Record>, (parking::Id, Date)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (parking_id, date) = by.into_inner();

        const SQL: &str = "\
            DELETE FROM availabilities \
            WHERE parking_id = $1::INT8 \
              AND start_datetime >= $2::DATE \
              AND start_datetime < $2::DATE + 1";
        self.exec(SQL, &[&parking_id, &date])
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<Record>> for Postgres<C>
where
    C: Connection,
{
    type Ok = availability::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(record): Insert<Record>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            INSERT INTO availabilities (\
                parking_id, start_datetime, end_datetime, \
                is_available, hourly_price, recurrence_rule\
            ) VALUES (\
                $1::INT8, $2::TIMESTAMP, $3::TIMESTAMP, \
                $4::BOOL, $5::NUMERIC, $6::TEXT\
            ) \
            RETURNING id";
        let recurrence = record.recurrence.as_ref().map(AsRef::<str>::as_ref);
        let rows = self
            .query(SQL, &[
                &record.parking_id,
                &record.starts_at,
                &record.ends_at,
                &record.is_available,
                &record.hourly_price,
                &recurrence,
            ])
            .await
            .map_err(tracerr::wrap!())?;
        Ok(rows
            .first()
            .map(|row| row.get("id"))
            .expect("`INSERT ... RETURNING` always returns a row"))
    }
}
