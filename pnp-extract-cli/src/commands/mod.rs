pub(crate) mod cache;
pub(crate) mod packs;
pub(crate) mod plan;
