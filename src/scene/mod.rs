pub(crate) mod attributes;
pub(crate) mod kinds;
pub(crate) mod loader;
pub(crate) mod object;
pub(crate) mod registry;
