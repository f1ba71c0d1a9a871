use serde_json::json;
use shelf_scrape::config::{Config, SheetConfig};
use shelf_scrape::sink::ServiceAccountKey;

const KEY_JSON: &str = include_str!("../fixtures/test_service_account.json");

/// Default config pointed at a mock storefront, without politeness delay
pub fn storefront_config(base_url: &str, start_path: &str, max_pages: u32) -> Config {
    let mut config = Config::default();
    config.scrape.base_url = base_url.to_string();
    config.scrape.start_url = format!("{}{}", base_url, start_path);
    config.scrape.max_pages = max_pages;
    config.scrape.page_delay_ms = 0;
    config.scrape.request_timeout_secs = 5;
    config
}

/// Sheet config whose API bases point at a mock server
pub fn sheet_config(base_url: &str) -> SheetConfig {
    SheetConfig {
        sheets_api_base: format!("{}/v4", base_url),
        drive_api_base: format!("{}/drive/v3", base_url),
        ..SheetConfig::default()
    }
}

/// The fixture key with its token endpoint moved to the mock server
pub fn service_account_key(base_url: &str) -> ServiceAccountKey {
    let mut value: serde_json::Value = serde_json::from_str(KEY_JSON).expect("fixture key is JSON");
    value["token_uri"] = json!(format!("{}/token", base_url));
    ServiceAccountKey::from_json(&value.to_string()).expect("fixture key parses")
}

/// A listing page with `names` as product cards and an optional numbered link
pub fn listing_page(names: &[&str], next: Option<(u32, &str)>) -> String {
    let mut body = String::from("<html><head><title>Eggs</title></head><body><div class=\"grid\">");
    for (i, name) in names.iter().enumerate() {
        body.push_str(&format!(
            r#"<div class="product-item-container">
                 <a class="product-name" href="/product/{slug}-{i}">{name}</a>
                 <span class="product-price">৳&nbsp;{price}</span>
                 <span class="product-amount">12&nbsp;pcs</span>
               </div>"#,
            slug = name.to_lowercase().replace(' ', "-"),
            i = i,
            name = name,
            price = 100 + i * 10,
        ));
    }
    body.push_str("</div><nav>");
    if let Some((number, href)) = next {
        body.push_str(&format!(
            r#"<a class="page-link" href="{}">{}</a>"#,
            href, number
        ));
    }
    body.push_str("</nav></body></html>");
    body
}
