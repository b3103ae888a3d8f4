use regex::Regex;

use crate::extraction::model::ModelError;

/// Rewrites applied, in order, to turn an obfuscated address back into a plain one.
const EMAIL_REWRITES: &[(&str, &str)] = &[
    (r"(?i)\s*\[\s*at\s*\]\s*", "@"),
    (r"(?i)\s*\[\s*dot\s*\]\s*", "."),
    (r"(?i)\s+at\s+", "@"),
    (r"(?i)\s+dot\s+", "."),
    (r"\s*@\s*", "@"),
    (r"\s*\.\s*", "."),
];

pub struct ContactCleaner {
    email_rewrites: Vec<(Regex, &'static str)>,
}

impl ContactCleaner {
    pub fn new() -> Result<Self, ModelError> {
        let email_rewrites = EMAIL_REWRITES
            .iter()
            .map(|(pattern, replacement)| {
                Regex::new(pattern)
                    .map(|re| (re, *replacement))
                    .map_err(|e| ModelError::Matcher {
                        name: "email rewrite",
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { email_rewrites })
    }

    /// "jane [at] example [dot] com" → "jane@example.com"
    pub fn clean_email(&self, raw: &str) -> String {
        let mut email = raw.trim().to_string();
        for (re, replacement) in &self.email_rewrites {
            email = re.replace_all(&email, *replacement).into_owned();
        }
        email.to_lowercase()
    }

    pub fn clean_phone(&self, raw: &str) -> String {
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_email_is_lowercased() {
        let cleaner = ContactCleaner::new().unwrap();
        assert_eq!(cleaner.clean_email("Jane.Doe@Example.com"), "jane.doe@example.com");
    }

    #[test]
    fn test_bracket_obfuscation() {
        let cleaner = ContactCleaner::new().unwrap();
        assert_eq!(
            cleaner.clean_email("jane [at] example [dot] com"),
            "jane@example.com"
        );
    }

    #[test]
    fn test_spelled_out_obfuscation() {
        let cleaner = ContactCleaner::new().unwrap();
        assert_eq!(cleaner.clean_email("jane at example dot org"), "jane@example.org");
    }

    #[test]
    fn test_spaced_email() {
        let cleaner = ContactCleaner::new().unwrap();
        assert_eq!(cleaner.clean_email("jane @ example . io"), "jane@example.io");
    }

    #[test]
    fn test_phone_whitespace_is_squeezed() {
        let cleaner = ContactCleaner::new().unwrap();
        assert_eq!(cleaner.clean_phone(" +1  555 123 4567 "), "+1 555 123 4567");
    }
}
