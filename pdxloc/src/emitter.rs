//! Serializes missing entries into a delta file under the target-language
//! header.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::Error;

/// Emitted files carry a UTF-8 BOM; the game toolchain rejects files
/// without one.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Renders the delta content: the language header, then one two-space
/// indented `key: "value"` line per entry, in the order given.
///
/// Values pass through untouched; embedded quotes must already be escaped
/// upstream.
pub fn render_delta(target_code: &str, entries: &[(String, String)]) -> String {
    let mut content = String::new();
    content.push_str(target_code);
    content.push_str(":\n");

    for (key, value) in entries {
        content.push_str(&format!("  {key}: \"{value}\"\n"));
    }

    content
}

/// Writes `content` as BOM-prefixed UTF-8, creating parent directories as
/// needed.
pub fn write_with_bom(path: &Path, content: &str) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::File::create(path)?;
    file.write_all(UTF8_BOM)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
