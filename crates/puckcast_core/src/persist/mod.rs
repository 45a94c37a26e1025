// Model persistence
// MessagePack + LZ4 with checksums, atomic writes, explicit state mapping

pub mod error;
pub mod format;
pub mod store;

pub use error::PersistError;
pub use format::{decode_record, encode_record, ModelSnapshot, RestoredModel, MODEL_VERSION};
pub use store::{load_model, save_model};
