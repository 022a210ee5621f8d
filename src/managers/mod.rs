// Bookmark transcoder state managers
// Managers own persistent state: the SQLite-backed bookmark record store.

pub mod bookmark_store;
