use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read CP2K output: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
