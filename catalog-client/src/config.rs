/// Functions root used by the Netlify deployment.
pub const NETLIFY_FUNCTIONS_ROOT: &str = "/.netlify/functions";

/// Functions root used when the functions are mounted behind a plain `/api` proxy.
pub const API_FUNCTIONS_ROOT: &str = "/api";

/// Where the serverless functions live.
///
/// An empty `origin` means "same origin": endpoint URLs come out relative,
/// e.g. `/.netlify/functions/authors-get`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub origin: String,
    pub functions_root: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            origin: String::new(),
            functions_root: NETLIFY_FUNCTIONS_ROOT.to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Self::default()
        }
    }

    pub fn with_functions_root(mut self, functions_root: impl Into<String>) -> Self {
        self.functions_root = functions_root.into();
        self
    }

    /// Plain concatenation of origin, functions root and `path`. The path is
    /// not checked.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}{}", self.origin, self.functions_root, path)
    }
}
