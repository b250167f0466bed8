use crate::Connection;

pub trait Driver {
    type Connection: Connection<Driver = Self>;

    /// Name of the driver, also the scheme of its connection URLs.
    const NAME: &'static str;
    /// Native error code meaning the server went away, if the backend has one.
    const CONNECTION_LOST_CODE: Option<i32> = None;
}
