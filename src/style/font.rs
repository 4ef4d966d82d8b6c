//! Custom font blob validation.
//!
//! The registry accepts TTF/OTF/WOFF/WOFF2 blobs. SFNT containers are
//! actually parsed with ttf-parser; WOFF containers are recognized by
//! magic number and passed through opaque, since the host's text stack
//! decompresses them itself.

/// Check that a blob is a usable font file. Returns the rejection reason
/// on failure; never panics on hostile input (ttf-parser is fallible by
/// construction).
pub fn validate_font_blob(data: &[u8]) -> Result<(), String> {
    if data.len() < 4 {
        return Err("blob too small to be a font".to_string());
    }

    match &data[0..4] {
        b"wOFF" | b"wOF2" => Ok(()),
        _ => match ttf_parser::Face::parse(data, 0) {
            Ok(face) => {
                if face.number_of_glyphs() == 0 {
                    Err("font contains no glyphs".to_string())
                } else {
                    Ok(())
                }
            }
            Err(e) => Err(format!("not a parseable TTF/OTF face: {}", e)),
        },
    }
}
