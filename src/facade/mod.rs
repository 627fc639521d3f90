pub mod plugin;

pub use plugin::{LoadedState, NoNonsense, RequestOutcome, XMLRPC_REJECT_STATUS};
