// Storage Layer
//
// Physical layout of tensors: per-mode dense or sparse formats, the index
// arrays that realize them, flat value arrays, and a packer that builds
// all of it from unordered coordinate insertions.

pub mod array;
pub mod format;
pub mod index;
pub mod pack;
pub mod tensor_storage;

pub use array::IndexArray;
pub use format::{Format, ModeType};
pub use index::{Index, ModeIndex};
pub use pack::{DuplicatePolicy, PackDescriptor, TensorBuilder};
pub use tensor_storage::Storage;
