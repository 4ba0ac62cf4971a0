#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Provider responded with status {status}: {body}")]
    InvalidStatusCode { status: u16, body: String },

    #[error("Azure OpenAI requires an endpoint")]
    MissingEndpoint,

    #[error("Azure OpenAI requires an API version")]
    MissingApiVersion,
}
