/// Transforms request URLs before they are used.
pub trait UrlRewriter: Send + Sync {
    /// Returns the URL to use instead of `original_url`, or `None` when the
    /// URL must not be requested at all.
    fn rewrite_url(&self, original_url: &str) -> Option<String>;
}

impl<F> UrlRewriter for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn rewrite_url(&self, original_url: &str) -> Option<String> {
        self(original_url)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl UrlRewriter for Passthrough {
    fn rewrite_url(&self, original_url: &str) -> Option<String> {
        Some(original_url.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rule {
    Replace { from: String, to: String },
    Block(String),
}

/// Ordered prefix rules. The first rule whose prefix matches decides; URLs
/// that match nothing pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct RewriteRules {
    rules: Vec<Rule>,
}

impl RewriteRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_prefix(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rules.push(Rule::Replace {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn block_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.rules.push(Rule::Block(prefix.into()));
        self
    }

    /// Adds a replacement written as `FROM=TO`.
    pub fn parse_replacement(self, rule: &str) -> Result<Self, String> {
        match rule.split_once('=') {
            Some((from, to)) if !from.is_empty() => Ok(self.replace_prefix(from, to)),
            _ => Err(format!("Invalid rewrite rule '{}', expected FROM=TO", rule)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl UrlRewriter for RewriteRules {
    fn rewrite_url(&self, original_url: &str) -> Option<String> {
        for rule in &self.rules {
            match rule {
                Rule::Replace { from, to } => {
                    if let Some(rest) = original_url.strip_prefix(from.as_str()) {
                        return Some(format!("{}{}", to, rest));
                    }
                }
                Rule::Block(prefix) => {
                    if original_url.starts_with(prefix.as_str()) {
                        return None;
                    }
                }
            }
        }
        Some(original_url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_keeps_url() {
        assert_eq!(
            Passthrough.rewrite_url("http://localhost/a"),
            Some("http://localhost/a".to_string())
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = RewriteRules::new()
            .block_prefix("http://ads.")
            .replace_prefix("http://", "https://")
            .block_prefix("http://internal.");

        assert_eq!(rules.rewrite_url("http://ads.example.com/x"), None);
        assert_eq!(
            rules.rewrite_url("http://internal.example.com/x"),
            Some("https://internal.example.com/x".to_string())
        );
        assert_eq!(
            rules.rewrite_url("ftp://example.com"),
            Some("ftp://example.com".to_string())
        );
    }

    #[test]
    fn parse_replacement() {
        let rules = RewriteRules::new()
            .parse_replacement("http://old=http://new")
            .unwrap();
        assert_eq!(
            rules.rewrite_url("http://old/path"),
            Some("http://new/path".to_string())
        );

        let err = RewriteRules::new().parse_replacement("nothing").unwrap_err();
        assert_eq!(err, "Invalid rewrite rule 'nothing', expected FROM=TO");
        assert!(RewriteRules::new().parse_replacement("=x").is_err());
    }

    #[test]
    fn closures_are_rewriters() {
        let rewriter = |url: &str| url.strip_suffix("/blocked").map(|_| url.to_uppercase());
        assert_eq!(rewriter.rewrite_url("a"), None);
        assert_eq!(rewriter.rewrite_url("a/blocked"), Some("A/BLOCKED".to_string()));
    }
}
