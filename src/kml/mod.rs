mod writer;

pub use writer::{document, write_document, KmlOptions};
