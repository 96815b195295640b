use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("configuration is unusable")]
    Config,
    #[display("could not start the mirroring service")]
    Startup,
    #[display("mirroring service failed")]
    Service,
    #[display("one or more inboxes could not be read")]
    Health,
}
