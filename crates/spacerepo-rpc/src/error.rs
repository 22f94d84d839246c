use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum RpcError {
    #[error(transparent)]
    #[diagnostic(
        code(spacerepo_rpc::network),
        help("Check that the server is reachable and the URL is correct")
    )]
    Network(#[from] Box<ureq::Error>),

    #[error("HTTP {status}: {url}")]
    #[diagnostic(code(spacerepo_rpc::http_error))]
    HttpError { status: u16, url: String },

    #[error("Malformed XML: {0}")]
    #[diagnostic(code(spacerepo_rpc::xml))]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid XML-RPC response: {0}")]
    #[diagnostic(
        code(spacerepo_rpc::invalid_response),
        help("The server answered with something that is not an XML-RPC document")
    )]
    InvalidResponse(String),

    #[error("Server fault {code}: {message}")]
    #[diagnostic(code(spacerepo_rpc::fault))]
    Fault { code: i64, message: String },

    #[error("Expected {expected} but found {found}")]
    #[diagnostic(code(spacerepo_rpc::type_mismatch))]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Missing struct member '{0}'")]
    #[diagnostic(code(spacerepo_rpc::missing_member))]
    MissingMember(String),
}

pub type Result<T> = std::result::Result<T, RpcError>;

impl From<ureq::Error> for RpcError {
    fn from(e: ureq::Error) -> Self {
        Self::Network(Box::new(e))
    }
}
