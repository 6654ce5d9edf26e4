use reqwest::Url;
use tracing::{info, instrument, warn};

use super::dto::{BarcodeProduct, SearchResponse};
use super::mapping::{map_barcode, map_search};
use super::region::Region;
use crate::{
    config::OpenFoodConfig, error::ApiError, fallback::first_success, http_client::HttpClient,
    models::number,
};

const SEARCH_FIELDS: &str = "code,product_name,brands,brand_owner,image_front_small_url,image_front_url,image_url,nutriments,serving_size";

/// Text and barcode lookups against the open product database, primary mirror first.
pub struct ProductGateway<'a> {
    http: &'a HttpClient,
    region: Region,
    strict_country: bool,
    bases: Vec<String>,
}

impl<'a> ProductGateway<'a> {
    pub fn new(http: &'a HttpClient, cfg: &OpenFoodConfig) -> Self {
        let region = Region::new(&cfg.region);
        let bases = region.candidate_bases(cfg.base_url.as_deref(), &cfg.fallback_url);
        Self {
            http,
            region,
            strict_country: cfg.strict_country,
            bases,
        }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn primary_base(&self) -> &str {
        &self.bases[0]
    }

    #[instrument(skip(self))]
    pub async fn search_by_text(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<SearchResponse, ApiError> {
        first_success(&self.bases, |base| {
            let base = base.clone();
            async move { self.search_at(&base, query, page, page_size).await }
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn search_by_barcode(&self, barcode: &str) -> Result<BarcodeProduct, ApiError> {
        first_success(&self.bases, |base| {
            let base = base.clone();
            async move { self.barcode_at(&base, barcode).await }
        })
        .await
    }

    fn search_params(&self, query: &str, page: u32, page_size: u32) -> Vec<(&'static str, String)> {
        let lang = self.region.language();
        let mut params = vec![
            ("search_terms", query.to_string()),
            ("search_simple", "1".to_string()),
            ("action", "process".to_string()),
            ("json", "1".to_string()),
            ("page", page.to_string()),
            ("page_size", page_size.to_string()),
            ("fields", format!("{SEARCH_FIELDS},product_name_{lang}")),
        ];
        if !self.region.is_world() {
            params.push(("lc", lang.to_string()));
            params.push(("cc", self.region.code().to_string()));
            if self.strict_country {
                params.push(("tagtype_0", "countries".to_string()));
                params.push(("tag_contains_0", "contains".to_string()));
                params.push(("tag_0", self.region.country_tag().to_string()));
            }
        }
        params
    }

    async fn search_at(
        &self,
        base: &str,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<SearchResponse, ApiError> {
        let url = format!("{base}/cgi/search.pl");
        let params = self.search_params(query, page, page_size);
        let res = self
            .http
            .get(&url, &params, None)
            .await
            .map_err(|e| ApiError::Upstream(format!("{base}: {e}")))?;

        if !res.is_success() {
            return Err(ApiError::Upstream(format!(
                "{base} search returned {}",
                res.status
            )));
        }
        let body = res
            .json
            .ok_or_else(|| ApiError::Upstream(format!("{base} search returned non-JSON body")))?;

        let out = map_search(&body, page, page_size, self.region.language());
        info!(base, items = out.items.len(), count = out.count, "product search");
        Ok(out)
    }

    async fn barcode_at(&self, base: &str, barcode: &str) -> Result<BarcodeProduct, ApiError> {
        let url = barcode_url(base, barcode)?;
        let fields = format!("{SEARCH_FIELDS},product_name_{}", self.region.language());
        let res = self
            .http
            .get(url.as_str(), &[("fields", fields.as_str())], None)
            .await
            .map_err(|e| ApiError::Upstream(format!("{base}: {e}")))?;

        // absence is reported through `status`, sometimes alongside a 404
        if let Some(status) = res.json.as_ref().and_then(|b| number(b.get("status"))) {
            if status != 1.0 {
                warn!(base, barcode, "product not found");
                return Err(ApiError::NotFound("Product not found".into()));
            }
        }
        if !res.is_success() {
            return Err(ApiError::Upstream(format!(
                "{base} barcode lookup returned {}",
                res.status
            )));
        }
        let product = res
            .json
            .as_ref()
            .and_then(|b| b.get("product"))
            .filter(|p| p.is_object())
            .ok_or_else(|| ApiError::Upstream(format!("{base} barcode lookup returned no product")))?;

        Ok(map_barcode(barcode, product, self.region.language()))
    }
}

/// `{base}/api/v0/product/<barcode>.json` with the barcode kept as a single
/// percent-encoded path segment.
fn barcode_url(base: &str, barcode: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(&format!("{base}/api/v0/product"))
        .map_err(|e| ApiError::Upstream(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::Upstream(format!("{base}: not a base URL")))?
        .push(&format!("{barcode}.json"));
    Ok(url)
}
