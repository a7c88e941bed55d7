pub mod document_proptest;
#[cfg(feature = "server")]
pub mod version_proptest;
