// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Process configuration from `.env` files.

use {
    log::{info, warn},
    std::path::Path,
};

/// Environment variable holding the PKCS#12 password for the demo pipeline.
///
/// The HTTP service never consults this; callers supply the password per
/// request.
pub const P12_PASSWORD_VAR: &str = "P12_PASSWORD";

/// Load `KEY=VALUE` pairs from `.env` in the working directory.
///
/// A missing file is not an error.
pub fn load_dotenv() {
    load_env_file(Path::new(".env"))
}

/// Load `KEY=VALUE` pairs from an env file into the process environment.
///
/// Blank lines and lines starting with `#` are skipped; lines without `=`
/// are ignored; CRLF line endings are tolerated. Loaded values overwrite
/// variables already present in the environment.
pub fn load_env_file(path: &Path) {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => {
            warn!(
                "{} not found; using the process environment as-is",
                path.display()
            );
            return;
        }
    };

    for line in contents.lines() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            std::env::set_var(key, value);
        }
    }

    info!("configuration loaded from {}", path.display());
}
