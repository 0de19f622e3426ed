use async_stream::try_stream;
use std::{
    collections::HashMap,
    future::Future,
    sync::{
        Arc, LazyLock, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use stow::{
    Command, Connection, Driver, Error, Executor, QueryResult, Result, RowLabeled, RowsAffected,
    Transaction, Value, stream::Stream,
};

/// Answers a command with the results the database would produce.
pub type Responder = Arc<dyn Fn(&Command) -> Result<Vec<QueryResult>> + Send + Sync>;

/// Commands received by one or more mock connections.
#[derive(Default, Clone)]
pub struct CommandLog(Arc<Mutex<Vec<Command>>>);

impl CommandLog {
    fn push(&self, command: Command) {
        self.0.lock().expect("Command log is poisoned").push(command);
    }

    pub fn all(&self) -> Vec<Command> {
        self.0.lock().expect("Command log is poisoned").clone()
    }

    /// Everything but the catalog queries.
    pub fn statements(&self) -> Vec<Command> {
        self.all().into_iter().filter(|c| !is_catalog(c)).collect()
    }

    pub fn last(&self) -> Option<Command> {
        self.statements().pop()
    }

    pub fn clear(&self) {
        self.0.lock().expect("Command log is poisoned").clear();
    }
}

/// True for the schema introspection queries of every dialect.
pub fn is_catalog(command: &Command) -> bool {
    let text = command.text.to_ascii_lowercase();
    text.contains("information_schema") || text.contains("table_info") || text.contains("sqlite_master")
}

/// A scripted connection: it records every command and answers through its responder.
#[derive(Clone)]
pub struct MockConnection<D: Driver> {
    driver: D,
    log: CommandLog,
    responder: Responder,
}

impl<D: Driver + Default> MockConnection<D> {
    pub fn new(
        responder: impl Fn(&Command) -> Result<Vec<QueryResult>> + Send + Sync + 'static,
    ) -> Self {
        Self::with_log(Arc::new(responder), CommandLog::default())
    }

    /// Answers every command with no rows.
    pub fn silent() -> Self {
        Self::new(|_| Ok(Vec::new()))
    }

    fn with_log(responder: Responder, log: CommandLog) -> Self {
        Self {
            driver: D::default(),
            log,
            responder,
        }
    }

    pub fn log(&self) -> &CommandLog {
        &self.log
    }
}

impl<D: Driver> Executor for MockConnection<D> {
    type Driver = D;

    fn driver(&self) -> &D {
        &self.driver
    }

    fn run(&mut self, command: Command) -> impl Stream<Item = Result<QueryResult>> + Send {
        let log = self.log.clone();
        let responder = self.responder.clone();
        try_stream! {
            let results = responder(&command)?;
            log.push(command);
            for result in results {
                yield result;
            }
        }
    }
}

/// Endpoint of a registered url, shared by all the connections opened on it.
#[derive(Clone)]
pub struct MockEndpoint {
    responder: Responder,
    pub log: CommandLog,
    opened: Arc<AtomicUsize>,
}

impl MockEndpoint {
    /// Number of connections opened so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::Relaxed)
    }
}

static ENDPOINTS: LazyLock<Mutex<HashMap<String, MockEndpoint>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Makes `url` connectable through [`Connection::connect`].
pub fn register(
    url: impl Into<String>,
    responder: impl Fn(&Command) -> Result<Vec<QueryResult>> + Send + Sync + 'static,
) -> MockEndpoint {
    let endpoint = MockEndpoint {
        responder: Arc::new(responder),
        log: CommandLog::default(),
        opened: Default::default(),
    };
    ENDPOINTS
        .lock()
        .expect("Endpoints are poisoned")
        .insert(url.into(), endpoint.clone());
    endpoint
}

impl<D: Driver + Default> Connection for MockConnection<D> {
    type Transaction<'c>
        = MockTransaction<'c, D>
    where
        Self: 'c;

    fn connect(url: &str) -> impl Future<Output = Result<Self>> + Send {
        let endpoint = ENDPOINTS
            .lock()
            .expect("Endpoints are poisoned")
            .get(url)
            .cloned();
        let url = url.to_string();
        async move {
            let Some(endpoint) = endpoint else {
                let error = Error::msg(format!("Nothing is listening on `{url}`"));
                log::error!("{error}");
                return Err(error);
            };
            endpoint.opened.fetch_add(1, Ordering::Relaxed);
            Ok(Self::with_log(endpoint.responder, endpoint.log))
        }
    }

    fn begin(&mut self) -> impl Future<Output = Result<MockTransaction<'_, D>>> + Send {
        async move {
            self.log.push("BEGIN".into());
            Ok(MockTransaction { connection: self })
        }
    }
}

pub struct MockTransaction<'c, D: Driver> {
    connection: &'c mut MockConnection<D>,
}

impl<'c, D: Driver> Executor for MockTransaction<'c, D> {
    type Driver = D;

    fn driver(&self) -> &D {
        self.connection.driver()
    }

    fn run(&mut self, command: Command) -> impl Stream<Item = Result<QueryResult>> + Send {
        self.connection.run(command)
    }
}

impl<'c, D: Driver> Transaction<'c> for MockTransaction<'c, D> {
    fn commit(self) -> impl Future<Output = Result<()>> + Send {
        self.connection.log.push("COMMIT".into());
        async { Ok(()) }
    }

    fn rollback(self) -> impl Future<Output = Result<()>> + Send {
        self.connection.log.push("ROLLBACK".into());
        async { Ok(()) }
    }
}

pub fn row(labels: &[&str], values: impl IntoIterator<Item = Value>) -> QueryResult {
    RowLabeled::new(
        labels.iter().map(ToString::to_string).collect(),
        values.into_iter().collect(),
    )
    .into()
}

pub fn affected(rows_affected: u64) -> QueryResult {
    RowsAffected { rows_affected }.into()
}

/// A single `Result` column.
pub fn scalar(value: impl Into<Value>) -> QueryResult {
    row(&["Result"], [value.into()])
}
