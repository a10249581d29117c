pub(crate) mod fakes;
mod retrieval;
