#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("graph: node {0} already exists")]
    NodeExists(usize),
    #[error("graph: node {0} does not exist")]
    NodeDoesNotExist(usize),
    #[error("graph: node id {0} out of range")]
    NodeIdOutOfRange(usize),
    #[error("graph: edge {0} does not exist")]
    EdgeDoesNotExist(usize),
    #[error("graph: edge {0} already exists")]
    EdgeExists(usize),
    #[error("graph: target not found")]
    TargetNotFound,
}

pub type Result<T> = std::result::Result<T, Error>;
