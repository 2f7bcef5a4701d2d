pub mod stash_api;

pub use stash_api::StashApiSource;
