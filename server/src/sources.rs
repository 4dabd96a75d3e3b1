use std::future::Future;
use std::io::ErrorKind;
use std::path::PathBuf;

use atlas_engine::{BoundarySource, FetchError, HttpBoundarySource, HttpTableSource, TableSource};

use crate::config::{DISTRICT_TABLE_FILE, STATE_TABLE_FILE};

/// Stat tables read straight from the data directory.
pub struct DirTableSource {
    data_dir: PathBuf,
}

impl DirTableSource {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }
}

impl TableSource for DirTableSource {
    fn district_table(&self) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send {
        read_file(self.data_dir.join(DISTRICT_TABLE_FILE))
    }

    fn state_table(&self) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send {
        read_file(self.data_dir.join(STATE_TABLE_FILE))
    }
}

/// Boundary documents read from the data directory. Catalog paths keep their
/// leading slash on the wire, so it is stripped before joining.
pub struct DirBoundarySource {
    data_dir: PathBuf,
}

impl DirBoundarySource {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }
}

impl BoundarySource for DirBoundarySource {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, FetchError>> + Send {
        let full = self.data_dir.join(path.trim_start_matches('/'));
        async move {
            match tokio::fs::read_to_string(&full).await {
                Ok(text) => Ok(text),
                Err(err) if err.kind() == ErrorKind::NotFound => Err(FetchError::Status(404)),
                Err(err) => Err(FetchError::Transport(err.to_string())),
            }
        }
    }
}

async fn read_file(path: PathBuf) -> Result<Vec<u8>, FetchError> {
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(FetchError::Status(404)),
        Err(err) => Err(FetchError::Transport(err.to_string())),
    }
}

/// Table source selected at startup: local files or an upstream base URL.
pub enum ServerTableSource {
    Dir(DirTableSource),
    Upstream(HttpTableSource),
}

impl TableSource for ServerTableSource {
    fn district_table(&self) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send {
        async move {
            match self {
                ServerTableSource::Dir(source) => source.district_table().await,
                ServerTableSource::Upstream(source) => source.district_table().await,
            }
        }
    }

    fn state_table(&self) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send {
        async move {
            match self {
                ServerTableSource::Dir(source) => source.state_table().await,
                ServerTableSource::Upstream(source) => source.state_table().await,
            }
        }
    }
}

pub enum ServerBoundarySource {
    Dir(DirBoundarySource),
    Upstream(HttpBoundarySource),
}

impl BoundarySource for ServerBoundarySource {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, FetchError>> + Send {
        async move {
            match self {
                ServerBoundarySource::Dir(source) => source.fetch(path).await,
                ServerBoundarySource::Upstream(source) => source.fetch(path).await,
            }
        }
    }
}
