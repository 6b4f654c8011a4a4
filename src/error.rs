use thiserror::Error;

use std::io::Error as IOError;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct LprError(LprErrorKind);

#[derive(Debug, Error)]
pub enum LprErrorKind {
    /// the caller handed in something the filters can't work on,
    /// e.g. a color raster or an even kernel size
    #[error("precondition violated: {0}")]
    Precondition(String),
    #[error("I/O error: {0}")]
    IOError(#[from] IOError),
    #[error("image error: {0}")]
    ImageError(#[from] image::ImageError),
    #[error("config error: {0}")]
    ConfigError(#[from] serde_json::Error),
}

impl LprError {

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self(LprErrorKind::Precondition(msg.into()))
    }

    pub fn kind(&self) -> &LprErrorKind {
        &self.0
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self.0, LprErrorKind::Precondition(_))
    }
}

impl<T> From<T> for LprError
where T: Into<LprErrorKind>
{
    fn from(e: T) -> Self {
        Self(e.into())
    }
}


#[cfg(test)]
mod test {

    use super::{ LprError, LprErrorKind };

    #[test]
    fn precondition_is_distinguished_from_upstream() {
        let err = LprError::precondition("even kernel size 4");
        assert!(err.is_precondition());
        assert_eq!(err.to_string(), "precondition violated: even kernel size 4");

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "car.jpg");
        let err: LprError = io.into();
        assert!(!err.is_precondition());
        assert!(matches!(err.kind(), LprErrorKind::IOError(_)));
    }
}
