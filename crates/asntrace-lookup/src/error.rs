use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("failed to initialize DNS resolver")]
    Init(#[source] std::io::Error),
    #[error(transparent)]
    Resolve(#[from] hickory_resolver::error::ResolveError),
    #[error("no {family} address found for {host}")]
    NoAddress { host: String, family: &'static str },
}
