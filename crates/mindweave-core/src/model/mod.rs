mod document;
mod tree;

pub use document::{
    Document, Positions, STORAGE_KEY_PREFIX, module_id_from_path, storage_key,
};
pub use tree::{NodeRecord, NodeTree, QuizQuestion, ROOT_ID};
