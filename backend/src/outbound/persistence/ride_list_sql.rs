//! Raw SQL for the ride listing query.
//!
//! The listing joins both participants and may annotate every row with its
//! haversine distance from a reference point, evaluated by PostgreSQL so the
//! ordering and pagination happen inside the database. Diesel's DSL cannot
//! express the computed column alongside two aliased joins, so the statement
//! is assembled here with numbered placeholders and bound through
//! [`diesel::sql_query`].

use chrono::{DateTime, Utc};
use diesel::QueryableByName;
use diesel::pg::Pg;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_query;
use diesel::sql_types::{BigInt, Bool, Double, Nullable, Text, Timestamptz};

use crate::domain::{EARTH_RADIUS_KM, Ride, RideListRow, RideOrdering, RideQuery};

use super::models::{InvalidRow, RideRow, UserRow};

const RIDE_COLUMNS: &str = "r.id, r.status, r.rider_id, r.driver_id, \
     r.pickup_latitude, r.pickup_longitude, r.dropoff_latitude, r.dropoff_longitude, \
     r.pickup_time, r.created_at, r.last_modified_at";

const JOINS: &str = "FROM rides r \
     INNER JOIN users ru ON ru.id = r.rider_id \
     INNER JOIN users du ON du.id = r.driver_id";

/// Raised when rows are requested in distance order without a reference point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("distance ordering requires a distance annotation")]
pub(super) struct UnannotatedDistanceOrdering;

/// A typed bind parameter.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum SqlBind {
    Text(String),
    Double(f64),
    BigInt(i64),
}

/// SQL text plus its bind parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct RideListSql {
    sql: String,
    binds: Vec<SqlBind>,
}

#[derive(Default)]
struct Binds(Vec<SqlBind>);

impl Binds {
    /// Register a parameter and return its placeholder.
    fn push(&mut self, bind: SqlBind) -> String {
        self.0.push(bind);
        format!("${}", self.0.len())
    }
}

fn user_columns(alias: &str, prefix: &str) -> String {
    [
        "username",
        "email",
        "first_name",
        "last_name",
        "phone_number",
        "role",
        "is_active",
        "created_at",
        "last_modified_at",
    ]
    .iter()
    .map(|column| format!("{alias}.{column} AS {prefix}_{column}"))
    .collect::<Vec<_>>()
    .join(", ")
}

/// Great-circle distance in kilometres between the pickup and `($lat, $lon)`.
fn haversine_sql(lat: &str, lon: &str) -> String {
    format!(
        "2 * {EARTH_RADIUS_KM:.1} * ASIN(LEAST(1.0, SQRT(\
         POWER(SIN(RADIANS({lat} - r.pickup_latitude) / 2), 2) \
         + COS(RADIANS(r.pickup_latitude)) * COS(RADIANS({lat})) \
         * POWER(SIN(RADIANS({lon} - r.pickup_longitude) / 2), 2))))"
    )
}

fn where_clause(query: &RideQuery, binds: &mut Binds) -> String {
    let mut conditions = Vec::new();
    if let Some(status) = query.status() {
        let placeholder = binds.push(SqlBind::Text(status.as_str().to_owned()));
        conditions.push(format!("r.status = {placeholder}"));
    }
    if let Some(email) = query.rider_email() {
        let placeholder = binds.push(SqlBind::Text(email.to_owned()));
        conditions.push(format!("LOWER(ru.email) = LOWER({placeholder})"));
    }
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

impl RideListSql {
    /// Statement selecting one page of joined rows.
    pub(super) fn rows(
        query: &RideQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Self, UnannotatedDistanceOrdering> {
        if !query.is_ordering_satisfiable() {
            return Err(UnannotatedDistanceOrdering);
        }

        let mut binds = Binds::default();
        let distance = match query.distance_from() {
            Some(reference) => {
                let lat = binds.push(SqlBind::Double(reference.latitude));
                let lon = binds.push(SqlBind::Double(reference.longitude));
                haversine_sql(&lat, &lon)
            }
            None => "NULL::double precision".to_owned(),
        };
        let filters = where_clause(query, &mut binds);
        let order = match query.ordering() {
            RideOrdering::PickupTime => "r.pickup_time ASC, r.id ASC",
            RideOrdering::Distance => "distance ASC, r.id ASC",
        };
        let limit = binds.push(SqlBind::BigInt(limit));
        let offset = binds.push(SqlBind::BigInt(offset));

        let sql = format!(
            "SELECT {RIDE_COLUMNS}, {rider}, {driver}, {distance} AS distance \
             {JOINS}{filters} ORDER BY {order} LIMIT {limit} OFFSET {offset}",
            rider = user_columns("ru", "rider"),
            driver = user_columns("du", "driver"),
        );
        Ok(Self {
            sql,
            binds: binds.0,
        })
    }

    /// Statement counting the rows matching the query's filters.
    pub(super) fn count(query: &RideQuery) -> Self {
        let mut binds = Binds::default();
        let filters = where_clause(query, &mut binds);
        Self {
            sql: format!("SELECT COUNT(*) AS count {JOINS}{filters}"),
            binds: binds.0,
        }
    }

    /// Attach the parameters to a boxed Diesel query.
    pub(super) fn into_query(self) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
        let Self { sql, binds } = self;
        binds
            .into_iter()
            .fold(sql_query(sql).into_boxed::<Pg>(), |query, bind| match bind {
                SqlBind::Text(value) => query.bind::<Text, _>(value),
                SqlBind::Double(value) => query.bind::<Double, _>(value),
                SqlBind::BigInt(value) => query.bind::<BigInt, _>(value),
            })
    }

    #[cfg(test)]
    fn sql(&self) -> &str {
        &self.sql
    }
}

/// Result of [`RideListSql::count`].
#[derive(Debug, QueryableByName)]
pub(super) struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}

/// Flat row produced by [`RideListSql::rows`].
#[derive(Debug, QueryableByName)]
pub(super) struct RideListSqlRow {
    #[diesel(sql_type = BigInt)]
    id: i64,
    #[diesel(sql_type = Text)]
    status: String,
    #[diesel(sql_type = BigInt)]
    rider_id: i64,
    #[diesel(sql_type = BigInt)]
    driver_id: i64,
    #[diesel(sql_type = Double)]
    pickup_latitude: f64,
    #[diesel(sql_type = Double)]
    pickup_longitude: f64,
    #[diesel(sql_type = Double)]
    dropoff_latitude: f64,
    #[diesel(sql_type = Double)]
    dropoff_longitude: f64,
    #[diesel(sql_type = Timestamptz)]
    pickup_time: DateTime<Utc>,
    #[diesel(sql_type = Timestamptz)]
    created_at: DateTime<Utc>,
    #[diesel(sql_type = Timestamptz)]
    last_modified_at: DateTime<Utc>,
    #[diesel(sql_type = Text)]
    rider_username: String,
    #[diesel(sql_type = Text)]
    rider_email: String,
    #[diesel(sql_type = Text)]
    rider_first_name: String,
    #[diesel(sql_type = Text)]
    rider_last_name: String,
    #[diesel(sql_type = Text)]
    rider_phone_number: String,
    #[diesel(sql_type = Text)]
    rider_role: String,
    #[diesel(sql_type = Bool)]
    rider_is_active: bool,
    #[diesel(sql_type = Timestamptz)]
    rider_created_at: DateTime<Utc>,
    #[diesel(sql_type = Timestamptz)]
    rider_last_modified_at: DateTime<Utc>,
    #[diesel(sql_type = Text)]
    driver_username: String,
    #[diesel(sql_type = Text)]
    driver_email: String,
    #[diesel(sql_type = Text)]
    driver_first_name: String,
    #[diesel(sql_type = Text)]
    driver_last_name: String,
    #[diesel(sql_type = Text)]
    driver_phone_number: String,
    #[diesel(sql_type = Text)]
    driver_role: String,
    #[diesel(sql_type = Bool)]
    driver_is_active: bool,
    #[diesel(sql_type = Timestamptz)]
    driver_created_at: DateTime<Utc>,
    #[diesel(sql_type = Timestamptz)]
    driver_last_modified_at: DateTime<Utc>,
    #[diesel(sql_type = Nullable<Double>)]
    distance: Option<f64>,
}

impl TryFrom<RideListSqlRow> for RideListRow {
    type Error = InvalidRow;

    fn try_from(row: RideListSqlRow) -> Result<Self, Self::Error> {
        let rider = UserRow {
            id: row.rider_id,
            username: row.rider_username,
            email: row.rider_email,
            first_name: row.rider_first_name,
            last_name: row.rider_last_name,
            phone_number: row.rider_phone_number,
            role: row.rider_role,
            is_active: row.rider_is_active,
            password_hash: String::new(),
            created_at: row.rider_created_at,
            last_modified_at: row.rider_last_modified_at,
        }
        .into_user()?;
        let driver = UserRow {
            id: row.driver_id,
            username: row.driver_username,
            email: row.driver_email,
            first_name: row.driver_first_name,
            last_name: row.driver_last_name,
            phone_number: row.driver_phone_number,
            role: row.driver_role,
            is_active: row.driver_is_active,
            password_hash: String::new(),
            created_at: row.driver_created_at,
            last_modified_at: row.driver_last_modified_at,
        }
        .into_user()?;
        let ride = Ride::try_from(RideRow {
            id: row.id,
            status: row.status,
            rider_id: row.rider_id,
            driver_id: row.driver_id,
            pickup_latitude: row.pickup_latitude,
            pickup_longitude: row.pickup_longitude,
            dropoff_latitude: row.dropoff_latitude,
            dropoff_longitude: row.dropoff_longitude,
            pickup_time: row.pickup_time,
            created_at: row.created_at,
            last_modified_at: row.last_modified_at,
        })?;
        Ok(Self {
            ride,
            rider,
            driver,
            distance_km: row.distance,
        })
    }
}
