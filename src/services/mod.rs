// Bookmark transcoder services
// Services provide the parse/convert/serialize pipeline, file exchange with the store, and settings.

pub mod bookmark_exchange;
pub mod html_parser;
pub mod html_serializer;
pub mod settings_engine;
pub mod sibling_scan;
pub mod tree_converter;
