//! PostgreSQL-backed catalog.
//!
//! Tables:
//! - `owners`: one row per owner, identified for lookups by `(name, surname, patronymic)`.
//! - `cars`: one row per car.
//! - `cars_owners`: links a car to its owner.
//!
//! Every operation that touches more than one statement runs inside a single
//! transaction, so a failure part-way leaves the store untouched.

use crate::domain::{Car, CarId, Owner, OwnerId, SearchRequest, StoredCar};
use crate::storage::{CarStore, StorageError};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgQueryResult, PgRow};
use sqlx::{PgConnection, PgPool, Row};

/// First key of the advisory lock taken while resolving an owner identity.
const OWNER_IDENTITY_LOCK_SPACE: i32 = 4_240_002;

const SEARCH_CARS_SQL: &str = r#"
    SELECT DISTINCT c.car_id, o.owner_id, c.reg_num, c.mark, c.model, c.year,
                    o.name, o.surname, o.patronymic
    FROM cars c
    JOIN cars_owners co ON c.car_id = co.car_id
    JOIN owners o ON co.owner_id = o.owner_id
    WHERE c.reg_num LIKE $1 ESCAPE '\'
       OR c.mark LIKE $1 ESCAPE '\'
       OR c.model LIKE $1 ESCAPE '\'
       OR o.name LIKE $1 ESCAPE '\'
       OR o.surname LIKE $1 ESCAPE '\'
       OR o.patronymic LIKE $1 ESCAPE '\'
    ORDER BY c.car_id, o.owner_id
    LIMIT $2 OFFSET $3
"#;

/// Catalog storage over a Postgres connection pool.
#[derive(Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Connects to `database_url` and makes sure the schema exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let storage = Self::with_pool(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the catalog tables if they are missing.
    pub async fn init_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS owners (
                owner_id SERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                surname TEXT NOT NULL,
                patronymic TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        // Lookup index for find-or-create. Not UNIQUE: `save_owner` may insert twins.
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS owners_identity_idx
             ON owners (name, surname, patronymic)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS cars (
                car_id SERIAL PRIMARY KEY,
                reg_num VARCHAR(255) NOT NULL,
                mark TEXT NOT NULL,
                model TEXT NOT NULL,
                year INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS cars_owners (
                car_id INTEGER NOT NULL REFERENCES cars (car_id) ON DELETE CASCADE,
                owner_id INTEGER NOT NULL REFERENCES owners (owner_id) ON DELETE CASCADE,
                PRIMARY KEY (car_id, owner_id)
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Single-row updates report `NotFound` when the key matched nothing.
fn expect_one_row(
    op: &'static str,
    result: Result<PgQueryResult, sqlx::Error>,
) -> Result<(), StorageError> {
    let result = result.map_err(|e| StorageError::from_sqlx(op, e))?;
    if result.rows_affected() == 0 {
        return Err(StorageError::NotFound { op });
    }
    Ok(())
}

/// Looks the owner up by identity and inserts it when no row matches.
///
/// Serialised per identity with a transaction-scoped advisory lock, so two
/// concurrent callers with the same tuple end up with the same id. Must run
/// inside a transaction.
async fn find_or_create_owner(conn: &mut PgConnection, owner: &Owner) -> Result<OwnerId, sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1, hashtext($2 || chr(31) || $3 || chr(31) || $4))")
        .bind(OWNER_IDENTITY_LOCK_SPACE)
        .bind(&owner.name)
        .bind(&owner.surname)
        .bind(&owner.patronymic)
        .execute(&mut *conn)
        .await?;

    let existing: Option<OwnerId> = sqlx::query_scalar(
        "SELECT owner_id FROM owners
         WHERE name = $1 AND surname = $2 AND patronymic = $3
         ORDER BY owner_id
         LIMIT 1",
    )
    .bind(&owner.name)
    .bind(&owner.surname)
    .bind(&owner.patronymic)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    insert_owner(conn, owner).await
}

async fn insert_owner(conn: &mut PgConnection, owner: &Owner) -> Result<OwnerId, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO owners (name, surname, patronymic) VALUES ($1, $2, $3) RETURNING owner_id",
    )
    .bind(&owner.name)
    .bind(&owner.surname)
    .bind(&owner.patronymic)
    .fetch_one(conn)
    .await
}

/// Turns a free-text query into a `LIKE` pattern matching it as a literal substring.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn stored_car_from_row(row: &PgRow) -> Result<StoredCar, sqlx::Error> {
    Ok(StoredCar {
        car_id: row.try_get("car_id")?,
        owner_id: row.try_get("owner_id")?,
        car: Car {
            reg_num: row.try_get("reg_num")?,
            mark: row.try_get("mark")?,
            model: row.try_get("model")?,
            year: row.try_get("year")?,
            owner: Owner {
                name: row.try_get("name")?,
                surname: row.try_get("surname")?,
                patronymic: row.try_get("patronymic")?,
            },
        },
    })
}

#[async_trait]
impl CarStore for PostgresStorage {
    async fn ping(&self) -> Result<(), StorageError> {
        const OP: &str = "storage.postgres.ping";

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::from_sqlx(OP, e))?;
        Ok(())
    }

    async fn save_owner(&self, owner: &Owner) -> Result<OwnerId, StorageError> {
        const OP: &str = "storage.postgres.save_owner";

        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StorageError::from_sqlx(OP, e))?;
        insert_owner(&mut conn, owner)
            .await
            .map_err(|e| StorageError::from_sqlx(OP, e))
    }

    async fn get_owner_id(&self, owner: &Owner) -> Result<OwnerId, StorageError> {
        const OP: &str = "storage.postgres.get_owner_id";
        let db_err = |e| StorageError::from_sqlx(OP, e);

        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let id = find_or_create_owner(&mut tx, owner).await.map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(id)
    }

    async fn save_car(&self, car: &Car) -> Result<CarId, StorageError> {
        const OP: &str = "storage.postgres.save_car";
        let db_err = |e| StorageError::from_sqlx(OP, e);

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let car_id: CarId = sqlx::query_scalar(
            "INSERT INTO cars (reg_num, mark, model, year) VALUES ($1, $2, $3, $4) RETURNING car_id",
        )
        .bind(&car.reg_num)
        .bind(&car.mark)
        .bind(&car.model)
        .bind(car.year)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        let owner_id = find_or_create_owner(&mut tx, &car.owner)
            .await
            .map_err(db_err)?;

        sqlx::query("INSERT INTO cars_owners (car_id, owner_id) VALUES ($1, $2)")
            .bind(car_id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(car_id)
    }

    async fn search_cars(&self, request: &SearchRequest) -> Result<Vec<StoredCar>, StorageError> {
        const OP: &str = "storage.postgres.search_cars";
        let db_err = |e| StorageError::from_sqlx(OP, e);

        let rows = sqlx::query(SEARCH_CARS_SQL)
            .bind(like_pattern(&request.query))
            .bind(request.page_size)
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter()
            .map(stored_car_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)
    }

    async fn delete_car(&self, car_id: CarId) -> Result<(), StorageError> {
        const OP: &str = "storage.postgres.delete_car";
        let db_err = |e| StorageError::from_sqlx(OP, e);

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM cars_owners WHERE car_id = $1")
            .bind(car_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let deleted = sqlx::query("DELETE FROM cars WHERE car_id = $1")
            .bind(car_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        if deleted.rows_affected() == 0 {
            return Err(StorageError::NotFound { op: OP });
        }

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn delete_owner(&self, owner_id: OwnerId) -> Result<(), StorageError> {
        const OP: &str = "storage.postgres.delete_owner";
        let db_err = |e| StorageError::from_sqlx(OP, e);

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM cars_owners WHERE owner_id = $1")
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let deleted = sqlx::query("DELETE FROM owners WHERE owner_id = $1")
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        if deleted.rows_affected() == 0 {
            return Err(StorageError::NotFound { op: OP });
        }

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn update_reg_num(&self, car_id: CarId, reg_num: &str) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE cars SET reg_num = $1 WHERE car_id = $2")
            .bind(reg_num)
            .bind(car_id)
            .execute(&self.pool)
            .await;
        expect_one_row("storage.postgres.update_reg_num", result)
    }

    async fn update_mark(&self, car_id: CarId, mark: &str) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE cars SET mark = $1 WHERE car_id = $2")
            .bind(mark)
            .bind(car_id)
            .execute(&self.pool)
            .await;
        expect_one_row("storage.postgres.update_mark", result)
    }

    async fn update_model(&self, car_id: CarId, model: &str) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE cars SET model = $1 WHERE car_id = $2")
            .bind(model)
            .bind(car_id)
            .execute(&self.pool)
            .await;
        expect_one_row("storage.postgres.update_model", result)
    }

    async fn update_year(&self, car_id: CarId, year: i32) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE cars SET year = $1 WHERE car_id = $2")
            .bind(year)
            .bind(car_id)
            .execute(&self.pool)
            .await;
        expect_one_row("storage.postgres.update_year", result)
    }

    async fn update_owner(&self, car_id: CarId, owner: &Owner) -> Result<(), StorageError> {
        const OP: &str = "storage.postgres.update_owner";
        let db_err = |e| StorageError::from_sqlx(OP, e);

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let car_exists: Option<CarId> =
            sqlx::query_scalar("SELECT car_id FROM cars WHERE car_id = $1 FOR UPDATE")
                .bind(car_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;
        if car_exists.is_none() {
            return Err(StorageError::NotFound { op: OP });
        }

        let owner_id = find_or_create_owner(&mut tx, owner).await.map_err(db_err)?;

        sqlx::query("DELETE FROM cars_owners WHERE car_id = $1")
            .bind(car_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query("INSERT INTO cars_owners (car_id, owner_id) VALUES ($1, $2)")
            .bind(car_id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn update_owner_name(&self, owner_id: OwnerId, name: &str) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE owners SET name = $1 WHERE owner_id = $2")
            .bind(name)
            .bind(owner_id)
            .execute(&self.pool)
            .await;
        expect_one_row("storage.postgres.update_owner_name", result)
    }

    async fn update_owner_surname(
        &self,
        owner_id: OwnerId,
        surname: &str,
    ) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE owners SET surname = $1 WHERE owner_id = $2")
            .bind(surname)
            .bind(owner_id)
            .execute(&self.pool)
            .await;
        expect_one_row("storage.postgres.update_owner_surname", result)
    }

    async fn update_owner_patronymic(
        &self,
        owner_id: OwnerId,
        patronymic: &str,
    ) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE owners SET patronymic = $1 WHERE owner_id = $2")
            .bind(patronymic)
            .bind(owner_id)
            .execute(&self.pool)
            .await;
        expect_one_row("storage.postgres.update_owner_patronymic", result)
    }
}
