//! Décodage du texte selon `..TEGNSETT`

use std::borrow::Cow;

use encoding_rs::Encoding;
use memchr::memmem;

/// Décode le contenu brut d'un fichier SOSI
///
/// L'UTF-8 valide est utilisé tel quel. Sinon l'encodage est déduit de
/// l'attribut `..TEGNSETT` de l'en-tête.
pub fn decode(data: &[u8]) -> Cow<'_, str> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);

    if let Ok(text) = simdutf8::basic::from_utf8(data) {
        return Cow::Borrowed(text);
    }

    let encoding = match declared_charset(data) {
        Some(label) => charset_to_encoding(label).unwrap_or_else(|| {
            tracing::warn!(
                charset = label,
                "Unsupported TEGNSETT, decoding as ISO-8859-10: tags with Norwegian letters (NØ, ORIGO-NØ) will not be recognised"
            );
            encoding_rs::ISO_8859_10
        }),
        None => encoding_rs::ISO_8859_10,
    };

    tracing::debug!(encoding = encoding.name(), "Decoding non UTF-8 SOSI content");
    let (decoded, _, _) = encoding.decode(data);
    decoded
}

/// Valeur brute de `..TEGNSETT`, si présente
fn declared_charset(data: &[u8]) -> Option<&str> {
    let pos = memmem::find(data, b"..TEGNSETT")?;
    let start = pos + b"..TEGNSETT".len();
    let end = data[start..]
        .iter()
        .position(|&b| b == b'\r' || b == b'\n' || b == b'!')
        .map(|p| start + p)
        .unwrap_or(data.len());

    std::str::from_utf8(&data[start..end])
        .ok()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Mappe les codes TEGNSETT vers les encodages
///
/// `None` pour les jeux de caractères sans équivalent (`DOSN8`, `ND7`, ...).
fn charset_to_encoding(charset: &str) -> Option<&'static Encoding> {
    match charset.trim_matches('"').to_uppercase().as_str() {
        "UTF-8" | "UTF8" => Some(encoding_rs::UTF_8),
        "ISO8859-1" | "ISO-8859-1" | "ANSI" => Some(encoding_rs::WINDOWS_1252),
        "ISO8859-10" | "ISO-8859-10" => Some(encoding_rs::ISO_8859_10),
        _ => None,
    }
}
