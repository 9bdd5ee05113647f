//! SQLite-backed conversation history.
//!
//! rusqlite connections are blocking and not `Sync`, so one dedicated thread
//! owns the connection and async callers hand it closures over a channel.

use std::{
    path::PathBuf,
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

mod conversations;
mod migrations;

use migrations::run_migrations;

type DbJob = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Run(DbJob),
    Shutdown,
}

struct Worker {
    sender: mpsc::Sender<DbCommand>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        let handle = match self.thread.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(handle) = handle {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("conversation store thread already gone: {err}");
            }
            if handle.join().is_err() {
                error!("conversation store thread panicked");
            }
        }
    }
}

#[derive(Clone)]
pub struct Database {
    worker: Arc<Worker>,
}

impl Database {
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();
        let thread_path = path.clone();

        let thread = thread::Builder::new()
            .name("recipe-companion-db".into())
            .spawn(move || {
                let mut conn = match Connection::open(&thread_path) {
                    Ok(conn) => conn,
                    Err(err) => {
                        let _ = ready_tx
                            .send(Err(anyhow::Error::new(err).context("failed to open SQLite database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("failed to enable WAL mode: {err}");
                }

                let migrated = run_migrations(&mut conn);
                let failed = migrated.is_err();
                if ready_tx.send(migrated).is_err() || failed {
                    return;
                }

                for command in command_rx {
                    match command {
                        DbCommand::Run(job) => job(&mut conn),
                        DbCommand::Shutdown => break,
                    }
                }

                info!("conversation store thread stopped");
            })
            .context("failed to spawn conversation store thread")?;

        ready_rx
            .recv()
            .context("conversation store thread exited during startup")??;

        info!("conversation store opened at {}", path.display());

        Ok(Self {
            worker: Arc::new(Worker {
                sender: command_tx,
                thread: Mutex::new(Some(thread)),
            }),
        })
    }

    /// Run `job` on the database thread and await its result.
    pub async fn execute<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Run(Box::new(move |conn| {
            // The caller may have given up (dropped future); nothing to do then.
            let _ = reply_tx.send(job(conn));
        }));

        self.worker
            .sender
            .send(command)
            .map_err(|err| anyhow!("conversation store is shut down: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("conversation store thread terminated unexpectedly"))?
    }
}
