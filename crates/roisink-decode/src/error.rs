use thiserror::Error;

#[derive(Debug, Error)]
pub enum LicenseError {
    #[error("license key {0:?} failed format validation")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("decoder pool not started: {0}")]
    NotInstalled(#[from] LicenseError),

    #[error("jpeg payload could not be decoded: {0}")]
    InvalidJpeg(String),

    #[error("decoder backend reported a non-OK status: {0}")]
    Backend(String),
}
