//! Writing converted output to the caller's `output_file`.

use std::io;
use std::path::Path;

use tracing::debug;

use crate::error::ConvertError;

/// Write `bytes` to `path`, creating missing parent directories and
/// overwriting any existing file. `path` must be absolute.
pub async fn persist(path: &Path, bytes: &[u8]) -> Result<(), ConvertError> {
    let fail = |source: io::Error| ConvertError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    if !path.is_absolute() {
        return Err(fail(io::Error::new(
            io::ErrorKind::InvalidInput,
            "output_file must be an absolute path",
        )));
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(fail)?;
    }

    tokio::fs::write(path, bytes).await.map_err(fail)?;

    debug!(output_file = %path.display(), bytes = bytes.len(), "Saved converted output");
    Ok(())
}
