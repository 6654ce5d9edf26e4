pub const WORLD_BASE_URL: &str = "https://world.openfoodfacts.org";

/// Country code used to pick the regional mirror and its filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    code: String,
}

impl Region {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.trim().to_lowercase(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_world(&self) -> bool {
        self.code.is_empty() || self.code == "world"
    }

    /// Tag in the `countries` taxonomy.
    pub fn country_tag(&self) -> &str {
        match self.code.as_str() {
            "es" => "spain",
            "mx" => "mexico",
            "ar" => "argentina",
            "co" => "colombia",
            "cl" => "chile",
            "pe" => "peru",
            "us" => "united-states",
            "gb" | "uk" => "united-kingdom",
            "fr" => "france",
            "it" => "italy",
            "de" => "germany",
            "pt" => "portugal",
            "br" => "brazil",
            other => other,
        }
    }

    pub fn language(&self) -> &'static str {
        match self.code.as_str() {
            "es" | "mx" | "ar" | "co" | "cl" | "pe" => "es",
            "fr" => "fr",
            "it" => "it",
            "de" => "de",
            "pt" | "br" => "pt",
            _ => "en",
        }
    }

    /// Override, else the regional mirror, else the world site.
    pub fn primary_base(&self, override_url: Option<&str>) -> String {
        match override_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if self.is_world() => WORLD_BASE_URL.to_string(),
            None => format!("https://{}.openfoodfacts.org", self.code),
        }
    }

    /// Primary base followed by the global fallback when they differ.
    pub fn candidate_bases(&self, override_url: Option<&str>, fallback: &str) -> Vec<String> {
        let primary = self.primary_base(override_url);
        let fallback = fallback.trim_end_matches('/');
        let mut bases = vec![primary.clone()];
        if primary != fallback {
            bases.push(fallback.to_string());
        }
        bases
    }
}
