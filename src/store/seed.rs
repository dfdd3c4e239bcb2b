use std::collections::HashSet;

use essentials::info;

use super::{SeoChanges, Stores, TodoChanges, ENABLE_DYNAMIC_SEO};
use crate::Result;

const TODOS: [(&str, bool); 6] = [
    ("🚀 Initialize TaskFlow project", true),
    ("🐘 Setup Eloquent ORM with SQLite", true),
    ("⚛️ Build high-performance React frontend", false),
    ("🎨 Apply premium mesh-gradient styling", false),
    ("🌓 Implement robust theme toggle", true),
    ("📜 Update documentation & README", false),
];

/// `(path, title, description, keywords)`
const SEO: [(&str, &str, &str, &str); 2] = [
    (
        "/",
        "TaskFlow - Modern PHP & React Template",
        "A high-performance boilerplate for unified PHP and React development.",
        "php, react, template, eloquent, vite, tailwind",
    ),
    (
        "/about",
        "About TaskFlow",
        "Learn more about the TaskFlow unified architecture.",
        "about, taskflow, project",
    ),
];

/// Records created by one [seed] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Seeded {
    pub todos: usize,
    pub settings: usize,
    pub seo: usize,
}

/// Fills the stores with sample data. Todos are matched by title and SEO
/// entries by path, so records that already exist are left untouched.
pub fn seed(stores: &Stores) -> Result<Seeded> {
    let mut seeded = Seeded::default();

    let titles: HashSet<String> = stores.todos.all()?.into_iter().map(|todo| todo.title).collect();
    for (title, completed) in TODOS {
        if titles.contains(title) {
            continue;
        }
        let todo = stores.todos.create(title.to_string())?;
        if completed {
            stores.todos.update(
                todo.id,
                TodoChanges {
                    completed: Some(true),
                    ..TodoChanges::default()
                },
            )?;
        }
        seeded.todos += 1;
    }

    if stores.settings.get(ENABLE_DYNAMIC_SEO)?.is_none() {
        stores.settings.set(ENABLE_DYNAMIC_SEO, "1".to_string())?;
        seeded.settings += 1;
    }

    for (path, title, description, keywords) in SEO {
        if stores.seo.find_by_path(path)?.is_some() {
            continue;
        }
        stores.seo.upsert(SeoChanges {
            path: path.to_string(),
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            keywords: Some(keywords.to_string()),
            og_image: None,
        })?;
        seeded.seo += 1;
    }

    info!(
        todos = seeded.todos,
        settings = seeded.settings,
        seo = seeded.seo,
        "Seeded sample data"
    );
    Ok(seeded)
}
