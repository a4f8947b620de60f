pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("document JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("node tree has no `root` node")]
    MissingRoot,

    #[error("node `{parent}` lists missing child `{child}`")]
    MissingChild { parent: String, child: String },

    #[error("node `{child}` is listed as a child of more than one parent")]
    MultipleParents { child: String },

    #[error("the root node is listed as a child of `{parent}`")]
    RootHasParent { parent: String },

    #[error("node tree contains a cycle through `{node}`")]
    Cycle { node: String },

    #[error("node stored under key `{key}` has id `{id}`")]
    IdMismatch { key: String, id: String },

    #[error("node id already in use: {id}")]
    DuplicateNode { id: String },

    #[error("unknown node: {id}")]
    UnknownNode { id: String },

    #[error("the root node of a module cannot be removed")]
    CannotRemoveRoot,
}
