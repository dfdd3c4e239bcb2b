use serde_json::Value;

use crate::{
    http::{Request, Response},
    routing::Params,
    store::{SeoChanges, SeoStoreService},
    validation::Validator,
    Result,
};

fn text(payload: &Value, field: &str) -> Option<String> {
    payload.get(field).and_then(Value::as_str).map(str::to_string)
}

pub struct SeoController {
    store: SeoStoreService,
}

impl SeoController {
    pub fn new(store: SeoStoreService) -> Self {
        Self { store }
    }

    pub fn index(&self, _: &Request, _: &Params) -> Result<Response> {
        Response::json(&self.store.all()?)
    }

    /// Creates or replaces the entry for the posted `path`.
    pub fn upsert(&self, request: &Request, _: &Params) -> Result<Response> {
        let payload = request.json()?;
        let data = Validator::validate(payload, &[("path", "required|string|path|max:255")])?;
        let path = data
            .get("path")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();
        let entry = self.store.upsert(SeoChanges {
            path,
            title: text(payload, "title"),
            description: text(payload, "description"),
            keywords: text(payload, "keywords"),
            og_image: text(payload, "og_image"),
        })?;
        Response::json(&entry)
    }
}
