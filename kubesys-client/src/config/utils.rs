use std::{fs, path::Path};

use base64::Engine;

use crate::error::ConfigError;

/// Decode base64 encoded PEM material, ensuring a trailing newline
pub fn decode_base64_pem(data: &str) -> Result<Vec<u8>, ConfigError> {
    let mut blob = base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(ConfigError::Base64Decode)?;
    // pem parsers want a newline between concatenated blocks
    if blob.last().is_some_and(|end| *end != b'\n') {
        blob.push(b'\n');
    }
    Ok(blob)
}

pub fn read_file<P: AsRef<Path>>(file: P) -> Result<Vec<u8>, ConfigError> {
    fs::read(&file).map_err(|source| ConfigError::ReadFile {
        path: file.as_ref().into(),
        source,
    })
}

pub fn read_file_to_string<P: AsRef<Path>>(file: P) -> Result<String, ConfigError> {
    fs::read_to_string(&file).map_err(|source| ConfigError::ReadFile {
        path: file.as_ref().into(),
        source,
    })
}

/// DER bodies of every `CERTIFICATE` block in a PEM bundle
pub fn certs(data: &[u8]) -> Result<Vec<Vec<u8>>, ConfigError> {
    Ok(pem::parse_many(data)
        .map_err(ConfigError::ParseCertificates)?
        .into_iter()
        .filter_map(|p| {
            if p.tag() == "CERTIFICATE" {
                Some(p.into_contents())
            } else {
                None
            }
        })
        .collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoded_pem_ends_with_newline() {
        let encoded = base64::engine::general_purpose::STANDARD.encode("-----BEGIN X-----");
        let blob = decode_base64_pem(&encoded).unwrap();
        assert_eq!(blob.last(), Some(&b'\n'));
        assert!(matches!(decode_base64_pem("!!"), Err(ConfigError::Base64Decode(_))));
    }

    #[test]
    fn only_certificate_blocks_are_kept() {
        let bundle = format!(
            "{}{}",
            pem::encode(&pem::Pem::new("CERTIFICATE", vec![1, 2, 3])),
            pem::encode(&pem::Pem::new("PRIVATE KEY", vec![4, 5]))
        );
        assert_eq!(certs(bundle.as_bytes()).unwrap(), vec![vec![1, 2, 3]]);
    }
}
