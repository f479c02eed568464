//! Credential masking for log output

/// Mask a credential so it can be written to logs
///
/// Email addresses keep their first character and domain
/// (`jane@example.com` -> `j***@example.com`); anything else keeps its last
/// four characters (`+61412345678` -> `***5678`).
pub fn mask_credential(credential: &str) -> String {
    if let Some((local, domain)) = credential.split_once('@') {
        return match local.chars().next() {
            Some(first) => format!("{}***@{}", first, domain),
            None => format!("***@{}", domain),
        };
    }

    let chars: Vec<char> = credential.chars().collect();
    if chars.len() > 4 {
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("***{}", tail)
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_credential("user@example.com"), "u***@example.com");
        assert_eq!(mask_credential("@example.com"), "***@example.com");
    }

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_credential("+61412345678"), "***5678");
        assert_eq!(mask_credential("1234"), "****");
        assert_eq!(mask_credential(""), "****");
    }
}
