pub(crate) mod latent_store;

pub(crate) mod logging;
