use serde_json::{json, Value};

use crate::{
    http::{Request, Response},
    routing::Params,
    store::{SettingStoreService, ENABLE_DYNAMIC_SEO},
    validation::Validator,
    Result,
};

pub struct SettingController {
    store: SettingStoreService,
}

impl SettingController {
    pub fn new(store: SettingStoreService) -> Self {
        Self { store }
    }

    pub fn get_seo_toggle(&self, _: &Request, _: &Params) -> Result<Response> {
        let enabled = self.store.get_or(ENABLE_DYNAMIC_SEO, "1")? == "1";
        Response::json(&json!({ "enabled": enabled }))
    }

    pub fn update_seo_toggle(&self, request: &Request, _: &Params) -> Result<Response> {
        let data = Validator::validate(request.json()?, &[("enabled", "required|boolean")])?;
        let enabled = data.get("enabled").and_then(Value::as_bool).unwrap_or_default();
        self.store
            .set(ENABLE_DYNAMIC_SEO, if enabled { "1" } else { "0" }.to_string())?;
        Response::json(&json!({ "success": true, "enabled": enabled }))
    }
}
