use std::fmt::Display;

use http::StatusCode;
use serde_json::{json, Value};

use crate::{
    http::{Request, Response},
    routing::Params,
    store::{TodoChanges, TodoStoreService},
    validation::Validator,
    Error, HttpError, Result,
};

const TITLE_RULES: &str = "required|string|max:255";

fn not_found<I: Display>(id: I) -> Error {
    HttpError::not_found(format!("Task #{id} not found.")).into()
}

/// The `{id}` parameter; anything that is not a task id is reported as a missing task.
fn todo_id(params: &Params) -> Result<u64> {
    let raw = params.get("id").unwrap_or_default();
    raw.parse().map_err(|_| not_found(raw))
}

fn title(data: &serde_json::Map<String, Value>) -> String {
    data.get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string()
}

pub struct TodoController {
    store: TodoStoreService,
}

impl TodoController {
    pub fn new(store: TodoStoreService) -> Self {
        Self { store }
    }

    pub fn index(&self, _: &Request, _: &Params) -> Result<Response> {
        Response::json(&self.store.all()?)
    }

    pub fn store(&self, request: &Request, _: &Params) -> Result<Response> {
        let data = Validator::validate(request.json()?, &[("title", TITLE_RULES)])?;
        let todo = self.store.create(title(&data))?;
        Ok(Response::json(&todo)?.with_status(StatusCode::CREATED))
    }

    pub fn show(&self, _: &Request, params: &Params) -> Result<Response> {
        let id = todo_id(params)?;
        match self.store.find(id)? {
            Some(todo) => Response::json(&todo),
            None => Err(not_found(id)),
        }
    }

    pub fn update(&self, request: &Request, params: &Params) -> Result<Response> {
        let id = todo_id(params)?;
        if self.store.find(id)?.is_none() {
            return Err(not_found(id));
        }
        let payload = request.json()?;
        let mut changes = TodoChanges::default();
        if payload.get("title").is_some() {
            let data = Validator::validate(payload, &[("title", TITLE_RULES)])?;
            changes.title = Some(title(&data));
        }
        if payload.get("completed").is_some() {
            let data = Validator::validate(payload, &[("completed", "boolean")])?;
            changes.completed = data.get("completed").and_then(Value::as_bool);
        }
        match self.store.update(id, changes)? {
            Some(todo) => Response::json(&todo),
            None => Err(not_found(id)),
        }
    }

    pub fn destroy(&self, _: &Request, params: &Params) -> Result<Response> {
        let id = todo_id(params)?;
        if !self.store.delete(id)? {
            return Err(not_found(id));
        }
        Response::json(&json!({ "success": true, "id": id }))
    }
}
