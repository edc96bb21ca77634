/// Runtime environment, selected with the `ENV` variable.
///
/// Production refuses to fall back to public defaults for endpoints that must be
/// chosen deliberately (the RPC url); development fills them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}
