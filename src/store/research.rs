use std::path::PathBuf;

use crate::research::model::ResearchSession;
use crate::store::persist;

/// The audience research session. Never merged into the book.
#[derive(Debug)]
pub struct ResearchStore {
    path: Option<PathBuf>,
    session: ResearchSession,
}

impl ResearchStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            session: ResearchSession::default(),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let session = persist::read_json(&path)?.unwrap_or_default();
        Ok(Self {
            path: Some(path),
            session,
        })
    }

    pub fn session(&self) -> &ResearchSession {
        &self.session
    }

    /// Applies `update` and persists the result.
    pub fn update<T>(&mut self, update: impl FnOnce(&mut ResearchSession) -> T) -> anyhow::Result<T> {
        let out = update(&mut self.session);
        self.persist()?;
        Ok(out)
    }

    fn persist(&self) -> anyhow::Result<()> {
        match &self.path {
            Some(path) => persist::write_json_atomic(path, &self.session),
            None => Ok(()),
        }
    }
}
