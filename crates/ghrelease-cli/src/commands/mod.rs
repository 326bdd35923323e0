pub mod publish;
pub mod request;
pub mod validate;
