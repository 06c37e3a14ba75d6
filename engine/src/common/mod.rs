pub mod atomic;
pub mod errors;
pub mod limits;

pub use atomic::write_atomic;
pub use errors::{
    ApplyError, CatalogError, DecodeError, ErrorKind, InstallError, PathSafetyError, ThemeError,
    ThemeResult,
};
pub use limits::{
    DEFAULT_MAX_PACKAGE_SIZE, MANIFEST_FILE_NAME, MAX_ENTRY_PATH_LEN, MAX_MANIFEST_SIZE,
    MAX_THEME_NAME_LEN, PACKAGE_EXTENSION, PACKAGE_MAGIC,
};
