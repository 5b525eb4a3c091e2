//! CSV helpers shared by the engine and upload intake:
//! numeric inference on raw field values and header/row previews.

pub mod infer;
pub mod preview;

pub use infer::infer_numeric;
pub use preview::{preview, CsvPreview, PreviewError, DEFAULT_PREVIEW_ROWS};
