use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Render each UTF-8 byte as eight binary digits, space separated
pub fn to_binary(text: &str) -> String {
    text.bytes()
        .map(|b| format!("{:08b}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode space-separated binary octets back into text
pub fn from_binary(binary: &str) -> Result<String, String> {
    let bytes = binary
        .split_whitespace()
        .map(|token| {
            u8::from_str_radix(token, 2).map_err(|_| format!("'{}' is not a binary byte", token))
        })
        .collect::<Result<Vec<u8>, String>>()?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn to_base64(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

pub fn from_base64(encoded: &str) -> Result<String, String> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| format!("not valid Base64 ({})", e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn url_encode(text: &str) -> String {
    urlencoding::encode(text).into_owned()
}

pub fn url_decode(encoded: &str) -> Result<String, String> {
    urlencoding::decode(encoded)
        .map(|s| s.into_owned())
        .map_err(|_| "decoded bytes are not valid UTF-8".to_string())
}
