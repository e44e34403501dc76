use super::DbPool;
use crate::errors::StorageError;
use diesel::SqliteConnection;
use log::error;
use std::any::Any;
use stockfolio_core::errors::{DatabaseError, Error, Result};
use tokio::sync::{mpsc, oneshot};

// A job runs against the writer's connection and returns a core Result.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type ErasedJob = Job<Box<dyn Any + Send + 'static>>;
type ErasedReply = oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>;

/// Handle for sending jobs to the writer actor.
///
/// Every cache and portfolio mutation goes through this handle, so writes
/// are serialized on one connection and each job commits in its own
/// immediate transaction before the caller is answered.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(ErasedJob, ErasedReply)>,
}

fn writer_stopped() -> Error {
    Error::Database(DatabaseError::Internal(
        "Database writer is not running".to_string(),
    ))
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection.
    ///
    /// # Arguments
    /// * `job`: A closure that takes a mutable reference to `SqliteConnection`
    ///   and performs database operations.
    ///
    /// # Returns
    /// A `Result<T>` containing the outcome of the job. The job's own error
    /// is returned unchanged; if the actor has stopped, a database error.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| writer_stopped())?;

        let boxed = ret_rx.await.map_err(|_| writer_stopped())??;
        boxed.downcast::<T>().map(|v| *v).map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Unexpected result type from database writer".to_string(),
            ))
        })
    }
}

/// Spawns a background Tokio task that acts as a single writer to the database.
/// This actor owns one database connection from the pool and processes write jobs serially.
///
/// If no connection can be acquired, every submitted job is answered with a
/// connection error instead.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(ErasedJob, ErasedReply)>(1024);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!("Database writer could not acquire a connection: {}", e);
                let message = e.to_string();
                while let Some((_job, reply_tx)) = rx.recv().await {
                    let _ = reply_tx.send(Err(Error::Database(DatabaseError::ConnectionFailed(
                        message.clone(),
                    ))));
                }
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(|e: StorageError| e.into());

            // The requester may have gone away; nothing to do then.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::setup_db;
    use diesel::{QueryDsl, RunQueryDsl};
    use stockfolio_core::errors::ValidationError;

    #[tokio::test]
    async fn test_exec_returns_job_value() {
        let (_pool, writer, _dir) = setup_db();
        let value = writer
            .exec(|conn| {
                diesel::sql_query("SELECT 1")
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(42usize)
            })
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_job_error_is_returned_unchanged() {
        let (_pool, writer, _dir) = setup_db();
        let err = writer
            .exec(|_conn| -> Result<()> {
                Err(ValidationError::InvalidInput("nope".to_string()).into())
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_job_rolls_back() {
        let (pool, writer, _dir) = setup_db();
        let result = writer
            .exec(|conn| -> Result<()> {
                diesel::sql_query(
                    "INSERT INTO search_cache (query, results, last_updated) VALUES ('q', '[]', '2024-01-01T00:00:00.000000Z')",
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Err(Error::Unexpected("abort".to_string()))
            })
            .await;
        assert!(result.is_err());

        let mut conn = crate::db::get_connection(&pool).unwrap();
        let rows: i64 = crate::schema::search_cache::table
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(rows, 0);
    }
}
