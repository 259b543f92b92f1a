use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreeError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Container is not part of the tree.")]
    NotFound,
    #[error("The root container cannot be detached or removed.")]
    RootMutation,
    #[error("Cannot attach a container to its own subtree.")]
    CycleAttach,
}
